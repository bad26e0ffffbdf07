//! Pipeline settings that can be changed while frames are flowing
//!
//! These are the values the parameter surface edits at runtime. Every change
//! goes through [`PipelineConfig::validate`] against the active
//! [`ParameterLimits`] before the pipeline applies it, so a rejected edit
//! leaves the previous configuration in effect.
//!
//! # Main Types
//!
//! - [`PipelineConfig`] - window radius, tick interval, mirroring and engine options
//! - [`ParameterLimits`] - allowed ranges for radius and tick interval
//! - [`ParameterError`] - why a configuration was rejected

use crate::transform::NeighborPolicy;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Smallest radius that still has neighbors to sum over
pub const MIN_RADIUS: usize = 1;

/// Smallest tick interval or FPS period in milliseconds
pub const MIN_PERIOD_MS: u64 = 1;

/// Default window radius
pub const DEFAULT_RADIUS: usize = 1;

/// Default tick interval in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 30;

/// Default FPS sampling period in milliseconds
pub const DEFAULT_FPS_PERIOD_MS: u64 = 1000;

/// Reasons a configuration is rejected at the configuration boundary
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParameterError {
    #[error("window radius {value} is outside {min}..={max}")]
    Radius { value: usize, min: usize, max: usize },

    #[error("tick interval {value} ms is outside {min}..={max} ms")]
    Interval { value: u64, min: u64, max: u64 },

    #[error("FPS period must be at least {min} ms, got {value} ms")]
    FpsPeriod { value: u64, min: u64 },

    #[error("invalid parameter limits: {0}")]
    Limits(String),
}

/// Pipeline configuration
///
/// Cheap to copy; the pipeline keeps one value and replaces it wholesale on
/// every accepted update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Half-width of the square window examined per output pixel
    pub radius: usize,

    /// Interval between frame ticks in milliseconds
    pub tick_interval_ms: u64,

    /// Mirror frames left-to-right before reduction
    pub invert_horizontal: bool,

    /// Mirror frames top-to-bottom before reduction
    pub invert_vertical: bool,

    /// Which window neighbors contribute to the force sum
    pub neighbor_policy: NeighborPolicy,

    /// Split the pixel loop of one transform across the rayon pool
    pub parallel: bool,

    /// Period of the FPS sampler in milliseconds
    pub fps_period_ms: u64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            invert_horizontal: false,
            invert_vertical: false,
            neighbor_policy: NeighborPolicy::default(),
            parallel: true,
            fps_period_ms: DEFAULT_FPS_PERIOD_MS,
        }
    }
}

impl PipelineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn fps_period(&self) -> Duration {
        Duration::from_millis(self.fps_period_ms)
    }

    /// Check every field against `limits`.
    pub fn validate(&self, limits: &ParameterLimits) -> Result<(), ParameterError> {
        limits.check_radius(self.radius)?;
        limits.check_interval(self.tick_interval_ms)?;
        if self.fps_period_ms < MIN_PERIOD_MS {
            return Err(ParameterError::FpsPeriod {
                value: self.fps_period_ms,
                min: MIN_PERIOD_MS,
            });
        }
        Ok(())
    }

    pub fn with_radius(mut self, radius: usize) -> Self {
        self.radius = radius;
        self
    }

    pub fn with_tick_interval_ms(mut self, interval_ms: u64) -> Self {
        self.tick_interval_ms = interval_ms;
        self
    }

    pub fn with_invert(mut self, horizontal: bool, vertical: bool) -> Self {
        self.invert_horizontal = horizontal;
        self.invert_vertical = vertical;
        self
    }
}

/// Allowed ranges for the runtime-editable parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterLimits {
    pub radius_min: usize,
    pub radius_max: usize,
    pub interval_min_ms: u64,
    pub interval_max_ms: u64,
}

impl Default for ParameterLimits {
    fn default() -> Self {
        Self {
            radius_min: 1,
            radius_max: 20,
            interval_min_ms: 10,
            interval_max_ms: 300,
        }
    }
}

impl ParameterLimits {
    /// Limits that only enforce the hard minimums.
    pub fn permissive() -> Self {
        Self {
            radius_min: MIN_RADIUS,
            radius_max: usize::MAX,
            interval_min_ms: MIN_PERIOD_MS,
            interval_max_ms: u64::MAX,
        }
    }

    /// The limits themselves must describe non-empty ranges above the hard minimums.
    pub fn validate(&self) -> Result<(), ParameterError> {
        if self.radius_min < MIN_RADIUS || self.radius_min > self.radius_max {
            return Err(ParameterError::Limits(format!(
                "radius range {}..={} must be non-empty and start at {} or more",
                self.radius_min, self.radius_max, MIN_RADIUS
            )));
        }
        if self.interval_min_ms < MIN_PERIOD_MS || self.interval_min_ms > self.interval_max_ms {
            return Err(ParameterError::Limits(format!(
                "interval range {}..={} ms must be non-empty and start at {} ms or more",
                self.interval_min_ms, self.interval_max_ms, MIN_PERIOD_MS
            )));
        }
        Ok(())
    }

    pub fn check_radius(&self, value: usize) -> Result<(), ParameterError> {
        let min = self.radius_min.max(MIN_RADIUS);
        if value < min || value > self.radius_max {
            return Err(ParameterError::Radius {
                value,
                min,
                max: self.radius_max,
            });
        }
        Ok(())
    }

    pub fn check_interval(&self, value: u64) -> Result<(), ParameterError> {
        let min = self.interval_min_ms.max(MIN_PERIOD_MS);
        if value < min || value > self.interval_max_ms {
            return Err(ParameterError::Interval {
                value,
                min,
                max: self.interval_max_ms,
            });
        }
        Ok(())
    }
}
