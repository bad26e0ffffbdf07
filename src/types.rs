//! Shared value types for the frame pipeline.
//!
//! - [`PipelineState`] - Running / Stopped
//! - [`FpsSample`] - one readout of the processed-frame counter
//! - [`LatencyWindow`] - rolling latency statistics
//! - [`PipelineStats`] - cumulative pipeline statistics
//! - [`GridSummary`] - min / max / mean of an intensity grid

use chrono::{DateTime, Local};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::Duration;

/// Size of the rolling window for recent latencies
const RECENT_WINDOW_SIZE: usize = 100;

/// Run state of a frame pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum PipelineState {
    /// No ticks are processed
    #[default]
    Stopped,
    /// Frames are acquired and transformed on every tick
    Running,
}

impl std::fmt::Display for PipelineState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PipelineState::Stopped => write!(f, "Stopped"),
            PipelineState::Running => write!(f, "Running"),
        }
    }
}

/// One sample of the processed-frame counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FpsSample {
    /// Frames processed since the previous sample
    pub frames: u64,
    /// Nominal sampling period
    pub period: Duration,
}

impl FpsSample {
    /// Frames per second, normalised by the sampling period.
    pub fn fps(&self) -> f64 {
        let secs = self.period.as_secs_f64();
        if secs <= 0.0 {
            0.0
        } else {
            self.frames as f64 / secs
        }
    }
}

impl std::fmt::Display for FpsSample {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.1} fps", self.fps())
    }
}

/// Rolling latency statistics in microseconds.
///
/// Keeps totals since the last reset plus a window of the most recent
/// samples for jitter and standard deviation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LatencyWindow {
    /// Number of recorded samples
    pub count: u64,
    /// Sum of all recorded samples
    pub total_us: u64,
    /// Most recent sample
    pub last_us: u64,
    /// Minimum observed sample
    pub min_us: u64,
    /// Maximum observed sample
    pub max_us: u64,
    /// Most recent samples, oldest first
    pub recent: VecDeque<u64>,
}

impl Default for LatencyWindow {
    fn default() -> Self {
        Self {
            count: 0,
            total_us: 0,
            last_us: 0,
            min_us: u64::MAX,
            max_us: 0,
            recent: VecDeque::with_capacity(RECENT_WINDOW_SIZE),
        }
    }
}

impl LatencyWindow {
    /// Record one measured duration
    pub fn record(&mut self, elapsed: Duration) {
        let us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.count += 1;
        self.total_us = self.total_us.saturating_add(us);
        self.last_us = us;
        self.min_us = self.min_us.min(us);
        self.max_us = self.max_us.max(us);

        self.recent.push_back(us);
        if self.recent.len() > RECENT_WINDOW_SIZE {
            self.recent.pop_front();
        }
    }

    /// Average over all recorded samples
    pub fn avg_us(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.total_us as f64 / self.count as f64
        }
    }

    /// max - min over the recent window
    pub fn jitter_us(&self) -> u64 {
        self.recent_max_us().saturating_sub(self.recent_min_us())
    }

    /// Sample standard deviation over the recent window
    pub fn stddev_us(&self) -> f64 {
        if self.recent.len() < 2 {
            return 0.0;
        }
        let n = self.recent.len() as f64;
        let mean = self.recent.iter().sum::<u64>() as f64 / n;
        let variance = self
            .recent
            .iter()
            .map(|&t| (t as f64 - mean).powi(2))
            .sum::<f64>()
            / (n - 1.0);
        variance.sqrt()
    }

    pub fn recent_min_us(&self) -> u64 {
        self.recent.iter().min().copied().unwrap_or(0)
    }

    pub fn recent_max_us(&self) -> u64 {
        self.recent.iter().max().copied().unwrap_or(0)
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Cumulative statistics of a frame pipeline
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PipelineStats {
    /// Frames transformed and published since the pipeline was created
    pub frames_processed: u64,
    /// Ticks skipped because acquisition failed transiently
    pub ticks_skipped: u64,
    /// Terminal source errors that stopped the pipeline
    pub terminal_errors: u64,
    /// Still images processed through the one-shot path
    pub still_images: u64,
    /// Most recent FPS reading
    pub last_fps: f64,
    /// Time spent acquiring frames
    pub acquisition: LatencyWindow,
    /// Time spent in the transform engine
    pub transform: LatencyWindow,
    /// Wall-clock time of the most recent start
    pub started_at: Option<DateTime<Local>>,
}

impl PipelineStats {
    /// Share of ticks that produced a frame, as a percentage
    pub fn success_rate(&self) -> f64 {
        let total = self.frames_processed + self.ticks_skipped;
        if total == 0 {
            100.0
        } else {
            (self.frames_processed as f64 / total as f64) * 100.0
        }
    }
}

/// Min / max / mean of an intensity grid
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridSummary {
    pub width: usize,
    pub height: usize,
    pub min: u8,
    pub max: u8,
    pub mean: f64,
    /// Number of non-zero samples
    pub nonzero: usize,
}
