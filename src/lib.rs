//! # forcefield-rs: force field transform and frame pipeline
//!
//! Computes the force field transform of grayscale images: every interior
//! pixel receives the magnitude of the inverse-square weighted pull of its
//! neighbors, which highlights edges and contours. The transform runs on
//! single still images or continuously on frames pulled from a source at a
//! configurable tick interval.
//!
//! ## Architecture
//!
//! - **Transform**: pure grid-to-grid engine, rows split across rayon
//! - **Raster**: raw multi-channel frames, intensity grids, still-image loading
//! - **Source**: frame source trait with synthetic and replay implementations
//! - **Pipeline**: tick/FPS state machine, runner thread, crossbeam bridge
//! - **Config**: TOML configuration with validated parameter limits
//!
//! ## Configuration
//!
//! The configuration file is stored in the platform-appropriate config
//! directory under `dev.forcefield.forcefield-rs`:
//!
//! - **Linux**: `~/.config/dev.forcefield.forcefield-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.forcefield.forcefield-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.forcefield.forcefield-rs\config.toml`
//!
//! ## Example
//!
//! ```ignore
//! use forcefield_rs::{
//!     config::AppConfig,
//!     pipeline::{spawn_pipeline, FramePipeline, NullSink, SystemClock},
//!     source::{SyntheticPattern, SyntheticSource},
//! };
//!
//! let config = AppConfig::load_or_default();
//! let source = SyntheticSource::from_capture(&config.capture, SyntheticPattern::default());
//! let pipeline = FramePipeline::new(source, NullSink, config.pipeline, config.limits)?;
//!
//! let handle = spawn_pipeline(pipeline, SystemClock::new())?;
//! handle.bridge.start();
//! // ... read PipelineMessage::Fps from handle.bridge
//! let pipeline = handle.join()?;
//! println!("{} frames", pipeline.stats().frames_processed);
//! ```

pub mod config;
pub mod error;
pub mod logging;
pub mod pipeline;
pub mod raster;
pub mod source;
pub mod transform;
pub mod types;

// Re-export commonly used types
pub use config::{AppConfig, ParameterLimits, PipelineConfig};
pub use error::{ForceFieldError, Result};
pub use pipeline::{FramePipeline, PipelineBridge, PipelineCommand, PipelineMessage};
pub use raster::{IntensityGrid, PixelLayout, RawFrame};
pub use source::{FrameSource, ReplaySource, SyntheticSource};
pub use transform::{force_field_transform, ForceFieldTransform, NeighborPolicy};
pub use types::{FpsSample, PipelineState, PipelineStats};
