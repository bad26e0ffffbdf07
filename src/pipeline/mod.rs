//! Real-time frame pipeline.
//!
//! Frames flow from a [`FrameSource`](crate::source::FrameSource) through
//! mirroring, luminance reduction and the transform engine to a
//! [`DisplaySink`]. A [`FramePipeline`] holds the state machine; a
//! [`PipelineRunner`] drives it on a dedicated thread and talks to its
//! controller over crossbeam channels.
//!
//! # Architecture
//!
//! ```text
//!            PipelineCommand                 acquire
//! [Bridge] ─────────────────► [Runner] ──► [FramePipeline] ◄── [FrameSource]
//!    ▲                           │               │
//!    └──── PipelineMessage ──────┘               └──► [DisplaySink]
//! ```
//!
//! # Design
//!
//! - **Explicit time**: the pipeline never reads a clock itself; callers pass
//!   `now`, so wall-clock and virtual-time runs share one code path.
//! - **Coalesced ticks**: a slow frame delays the next tick instead of
//!   queueing a burst.
//! - **Single in-flight transform**: only the runner thread calls the engine;
//!   parallelism lives inside one transform call.

pub mod bridge;
pub mod counter;
pub mod error;
pub mod executor;
pub mod frame_pipeline;
pub mod schedule;
pub mod sink;

pub use bridge::{PipelineBridge, PipelineCommand, PipelineMessage};
pub use counter::FrameCounter;
pub use error::{PipelineError, PipelineResult};
pub use executor::{spawn_pipeline, PipelineHandle, PipelineRunner};
pub use frame_pipeline::{FramePipeline, PollReport, TickOutcome};
pub use schedule::{Clock, ManualClock, SystemClock, TickSchedule};
pub use sink::{ChannelSink, DisplaySink, NullSink};
