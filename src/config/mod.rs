//! Configuration module for forcefield-rs
//!
//! This module handles application configuration including:
//! - Pipeline parameters (radius, tick interval, mirroring)
//! - Parameter limits enforced at the configuration boundary
//! - Capture settings handed to the frame source
//! - Logging filter and optional log directory
//!
//! # Config Location
//!
//! The configuration file is stored in the platform-appropriate location:
//! - **Linux**: `~/.config/dev.forcefield.forcefield-rs/config.toml`
//! - **macOS**: `~/Library/Application Support/dev.forcefield.forcefield-rs/config.toml`
//! - **Windows**: `%APPDATA%\dev.forcefield.forcefield-rs\config.toml`
//!
//! # Example
//!
//! ```ignore
//! use forcefield_rs::config::AppConfig;
//!
//! let mut config = AppConfig::load_or_default();
//! config.pipeline.radius = 3;
//! config.save(AppConfig::default_path().unwrap())?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{ForceFieldError, Result};
use crate::raster::PixelLayout;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for config directories
pub const APP_ID: &str = "dev.forcefield.forcefield-rs";

/// Config filename
pub const CONFIG_FILE: &str = "config.toml";

/// Default tracing filter when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info,forcefield_rs=debug";

// ==================== Config Directory ====================

/// Get the application config directory path
pub fn config_dir() -> Option<PathBuf> {
    dirs_next::config_dir().map(|p| p.join(APP_ID))
}

// ==================== Capture ====================

/// Settings handed to the frame source when a capture session starts
///
/// Dimensions and rate are requests; a device may deliver something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Index of the capture device to open
    pub device_index: u32,
    pub frame_width: usize,
    pub frame_height: usize,
    /// Desired frames per second, best effort
    pub ideal_fps: u32,
    /// Channel layout the source delivers
    pub layout: PixelLayout,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            device_index: 0,
            frame_width: 320,
            frame_height: 240,
            ideal_fps: 30,
            layout: PixelLayout::Bgr8,
        }
    }
}

impl CaptureConfig {
    pub fn frame_size(&self) -> (usize, usize) {
        (self.frame_width, self.frame_height)
    }
}

// ==================== Logging ====================

/// Logging configuration consumed by [`crate::logging::init`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,

    /// Directory for daily rolling log files; stdout only when unset
    pub log_dir: Option<PathBuf>,

    /// File name prefix for rolling log files
    pub file_prefix: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: DEFAULT_LOG_FILTER.to_string(),
            log_dir: None,
            file_prefix: "forcefield.log".to_string(),
        }
    }
}

// ==================== App Config ====================

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub limits: ParameterLimits,
    pub capture: CaptureConfig,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Default location of the config file, if the platform has a config directory
    pub fn default_path() -> Option<PathBuf> {
        config_dir().map(|p| p.join(CONFIG_FILE))
    }

    /// Load and validate a config file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            ForceFieldError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: Self = toml::from_str(&content).map_err(|e| {
            ForceFieldError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        tracing::debug!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Load from the default location, returning defaults if the file is
    /// missing or invalid
    pub fn load_or_default() -> Self {
        let Some(path) = Self::default_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save as TOML, creating parent directories as needed
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                ForceFieldError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| {
            ForceFieldError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self)
            .map_err(|e| ForceFieldError::Serialization(format!("Failed to serialize config: {}", e)))
    }

    /// Reject limits or pipeline values a pipeline would refuse
    pub fn validate(&self) -> Result<()> {
        self.limits
            .validate()
            .map_err(|e| ForceFieldError::Config(format!("[limits] {}", e)))?;
        self.pipeline
            .validate(&self.limits)
            .map_err(|e| ForceFieldError::Config(format!("[pipeline] {}", e)))?;
        if self.capture.frame_width == 0 || self.capture.frame_height == 0 {
            return Err(ForceFieldError::Config(format!(
                "[capture] frame size {}x{} must be non-zero",
                self.capture.frame_width, self.capture.frame_height
            )));
        }
        Ok(())
    }
}

// ==================== Tests ====================
