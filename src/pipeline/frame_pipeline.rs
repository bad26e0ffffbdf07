//! The frame pipeline state machine.
//!
//! A [`FramePipeline`] is driven by explicit time: every call that depends on
//! the schedule takes `now`, the time since an arbitrary origin. The same code
//! therefore runs on a wall clock inside [`super::PipelineRunner`] and on
//! virtual time in tests.
//!
//! Per tick, while running:
//! 1. Acquire a frame (transient failures skip the tick)
//! 2. Mirror it according to the invert flags
//! 3. Reduce to an intensity grid
//! 4. Run the transform engine
//! 5. Publish to the sink
//! 6. Count the frame

use super::counter::FrameCounter;
use super::error::{PipelineError, PipelineResult};
use super::schedule::TickSchedule;
use super::sink::DisplaySink;
use crate::config::{ParameterLimits, PipelineConfig};
use crate::raster::{IntensityGrid, RawFrame};
use crate::source::{AcquisitionError, FrameSource};
use crate::transform::ForceFieldTransform;
use crate::types::{FpsSample, PipelineState, PipelineStats};
use std::time::{Duration, Instant};

/// Result of one frame tick
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickOutcome {
    /// The pipeline is stopped
    Idle,
    /// Acquisition failed transiently; nothing was published
    Skipped(AcquisitionError),
    /// A frame was transformed and published
    Processed,
    /// The source reported a terminal error and the pipeline stopped
    Terminated(AcquisitionError),
}

/// What one call to [`FramePipeline::poll`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    pub tick: Option<TickOutcome>,
    pub fps: Option<FpsSample>,
}

/// Frame pipeline owning a source, a sink and the transform engine.
pub struct FramePipeline<S, K> {
    source: S,
    sink: K,
    config: PipelineConfig,
    limits: ParameterLimits,
    engine: ForceFieldTransform,
    state: PipelineState,
    counter: FrameCounter,
    tick_schedule: TickSchedule,
    fps_schedule: TickSchedule,
    stats: PipelineStats,
}

impl<S: FrameSource, K: DisplaySink> FramePipeline<S, K> {
    /// Create a stopped pipeline. `config` must satisfy `limits`.
    pub fn new(
        source: S,
        sink: K,
        config: PipelineConfig,
        limits: ParameterLimits,
    ) -> PipelineResult<Self> {
        limits.validate()?;
        config.validate(&limits)?;
        Ok(Self::build(source, sink, config, limits))
    }

    /// Pipeline with the default configuration and limits
    pub fn with_defaults(source: S, sink: K) -> Self {
        Self::build(
            source,
            sink,
            PipelineConfig::default(),
            ParameterLimits::default(),
        )
    }

    fn build(source: S, sink: K, config: PipelineConfig, limits: ParameterLimits) -> Self {
        Self {
            source,
            sink,
            config,
            limits,
            engine: ForceFieldTransform::from_config(&config),
            state: PipelineState::Stopped,
            counter: FrameCounter::new(),
            tick_schedule: TickSchedule::new(config.tick_interval()),
            fps_schedule: TickSchedule::new(config.fps_period()),
            stats: PipelineStats::default(),
        }
    }

    // ── Lifecycle ──

    /// Start the source and begin ticking one interval after `now`.
    ///
    /// Does nothing if already running. A source that fails to start leaves
    /// the pipeline stopped.
    pub fn start(&mut self, now: Duration) -> PipelineResult<()> {
        if self.state == PipelineState::Running {
            return Ok(());
        }
        if let Err(e) = self.source.start() {
            tracing::error!("Failed to start {}: {}", self.source.describe(), e);
            return Err(PipelineError::SourceInit(e));
        }
        self.state = PipelineState::Running;
        self.tick_schedule.arm(now);
        self.ensure_fps_armed(now);
        self.stats.started_at = Some(chrono::Local::now());
        tracing::info!(
            "Pipeline started: {} (radius {}, every {} ms)",
            self.source.describe(),
            self.config.radius,
            self.config.tick_interval_ms
        );
        Ok(())
    }

    /// Stop ticking and stop the source. Idempotent.
    pub fn stop(&mut self) {
        if self.state == PipelineState::Stopped {
            return;
        }
        self.tick_schedule.disarm();
        self.source.stop();
        self.state = PipelineState::Stopped;
        tracing::info!(
            "Pipeline stopped after {} frame(s)",
            self.stats.frames_processed
        );
    }

    // ── Frame path ──

    /// Run one frame tick now, regardless of the schedule.
    pub fn tick(&mut self) -> TickOutcome {
        if self.state != PipelineState::Running {
            return TickOutcome::Idle;
        }

        let acquire_start = Instant::now();
        let mut frame = match self.source.acquire() {
            Ok(frame) => frame,
            Err(e) if e.is_terminal() => {
                tracing::error!("Frame source terminated: {}", e);
                self.stats.terminal_errors += 1;
                self.stop();
                return TickOutcome::Terminated(e);
            }
            Err(e) => {
                tracing::warn!("Skipping tick: {}", e);
                self.stats.ticks_skipped += 1;
                return TickOutcome::Skipped(e);
            }
        };
        self.stats.acquisition.record(acquire_start.elapsed());

        if self.config.invert_horizontal {
            frame.flip_horizontal();
        }
        if self.config.invert_vertical {
            frame.flip_vertical();
        }

        let output = self.transform(&frame.to_intensity());
        self.sink.publish(output);
        self.counter.increment();
        self.stats.frames_processed += 1;
        tracing::trace!("Processed frame {}", self.stats.frames_processed);
        TickOutcome::Processed
    }

    /// Reduce, transform and publish a caller-supplied image.
    ///
    /// Independent of the run state, the schedule and the frame counter.
    /// Mirroring is not applied.
    pub fn process_still(&mut self, frame: &RawFrame) -> IntensityGrid {
        let output = self.transform(&frame.to_intensity());
        self.sink.publish(output.clone());
        self.stats.still_images += 1;
        tracing::debug!(
            "Processed still image {}x{}",
            output.width(),
            output.height()
        );
        output
    }

    fn transform(&mut self, gray: &IntensityGrid) -> IntensityGrid {
        let started = Instant::now();
        let output = self.engine.apply(gray);
        self.stats.transform.record(started.elapsed());
        output
    }

    // ── Throughput ──

    /// Read and reset the processed-frame counter.
    pub fn sample_fps(&mut self) -> FpsSample {
        let sample = FpsSample {
            frames: self.counter.take(),
            period: self.config.fps_period(),
        };
        self.stats.last_fps = sample.fps();
        tracing::debug!("FPS: {}", sample);
        sample
    }

    fn ensure_fps_armed(&mut self, now: Duration) {
        if !self.fps_schedule.is_armed() {
            self.fps_schedule.arm(now);
        }
    }

    // ── Scheduling ──

    /// Run whatever is due at `now`: at most one frame tick, then at most one
    /// FPS sample. The FPS schedule is armed on first use and keeps running
    /// while stopped.
    pub fn poll(&mut self, now: Duration) -> PollReport {
        self.ensure_fps_armed(now);
        let mut report = PollReport::default();
        if self.state == PipelineState::Running && self.tick_schedule.poll(now) {
            report.tick = Some(self.tick());
        }
        if self.fps_schedule.poll(now) {
            report.fps = Some(self.sample_fps());
        }
        report
    }

    /// Earliest pending deadline of either schedule
    pub fn next_deadline(&self) -> Option<Duration> {
        match (self.tick_schedule.next_due(), self.fps_schedule.next_due()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    // ── Configuration ──

    /// Validate and apply a new configuration.
    ///
    /// Takes effect from the next tick. A changed tick interval restarts the
    /// tick schedule at `now`; a rejected configuration leaves the previous
    /// one in effect.
    pub fn update_config(&mut self, config: PipelineConfig, now: Duration) -> PipelineResult<()> {
        self.reconfigure(config, Some(now))
    }

    pub fn set_radius(&mut self, radius: usize) -> PipelineResult<()> {
        self.reconfigure(self.config.with_radius(radius), None)
    }

    pub fn set_tick_interval(&mut self, interval_ms: u64, now: Duration) -> PipelineResult<()> {
        self.reconfigure(self.config.with_tick_interval_ms(interval_ms), Some(now))
    }

    pub fn set_invert(&mut self, horizontal: bool, vertical: bool) -> PipelineResult<()> {
        self.reconfigure(self.config.with_invert(horizontal, vertical), None)
    }

    fn reconfigure(&mut self, config: PipelineConfig, now: Option<Duration>) -> PipelineResult<()> {
        if let Err(e) = config.validate(&self.limits) {
            tracing::warn!("Rejected configuration: {}", e);
            return Err(e.into());
        }
        let previous = std::mem::replace(&mut self.config, config);

        if previous.radius != config.radius
            || previous.neighbor_policy != config.neighbor_policy
            || previous.parallel != config.parallel
        {
            self.engine = ForceFieldTransform::from_config(&config);
        }

        if previous.tick_interval_ms != config.tick_interval_ms {
            self.tick_schedule.set_period(config.tick_interval());
            if let (PipelineState::Running, Some(now)) = (self.state, now) {
                self.tick_schedule.arm(now);
            }
        }

        if previous.fps_period_ms != config.fps_period_ms {
            self.fps_schedule.set_period(config.fps_period());
            if let Some(now) = now {
                self.fps_schedule.arm(now);
            }
        }

        tracing::debug!("Applied configuration: {:?}", config);
        Ok(())
    }

    // ── Accessors ──

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == PipelineState::Running
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn limits(&self) -> &ParameterLimits {
        &self.limits
    }

    pub fn stats(&self) -> &PipelineStats {
        &self.stats
    }

    /// Frames processed since the last FPS sample
    pub fn pending_frames(&self) -> u64 {
        self.counter.value()
    }

    pub fn engine(&self) -> &ForceFieldTransform {
        &self.engine
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn sink(&self) -> &K {
        &self.sink
    }

    pub fn sink_mut(&mut self) -> &mut K {
        &mut self.sink
    }

    pub fn into_parts(self) -> (S, K) {
        (self.source, self.sink)
    }
}
