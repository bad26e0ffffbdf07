//! Pipeline runner: the dedicated thread that drives a [`FramePipeline`].
//!
//! Each loop iteration:
//! 1. Poll the pipeline at the current clock time (frame tick, FPS sample).
//! 2. Forward what happened to the controller.
//! 3. Wait for a command until the next deadline, handling any that arrive.
//!
//! The runner is the only caller of the pipeline, so at most one transform
//! is in flight. A stop command takes effect before the next tick; a
//! transform already running always completes first.

use super::bridge::{PipelineBridge, PipelineCommand, PipelineMessage};
use super::error::{PipelineError, PipelineResult};
use super::frame_pipeline::{FramePipeline, PollReport, TickOutcome};
use super::schedule::Clock;
use super::sink::DisplaySink;
use crate::source::FrameSource;
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;
use std::time::Duration;

/// Longest wait between loop iterations when nothing is scheduled
const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Runs a [`FramePipeline`] against a clock and a command channel.
pub struct PipelineRunner<S, K, C> {
    pipeline: FramePipeline<S, K>,
    clock: C,
    cmd_rx: Receiver<PipelineCommand>,
    msg_tx: Sender<PipelineMessage>,
    running: Arc<AtomicBool>,
    dropped_messages: u64,
}

impl<S, K, C> PipelineRunner<S, K, C>
where
    S: FrameSource,
    K: DisplaySink,
    C: Clock,
{
    pub fn new(
        pipeline: FramePipeline<S, K>,
        clock: C,
        cmd_rx: Receiver<PipelineCommand>,
        msg_tx: Sender<PipelineMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self {
            pipeline,
            clock,
            cmd_rx,
            msg_tx,
            running,
            dropped_messages: 0,
        }
    }

    pub fn pipeline(&self) -> &FramePipeline<S, K> {
        &self.pipeline
    }

    // ── Main run loop ──

    /// Run until `running` is cleared, Shutdown is received, or every
    /// controller handle is dropped. Returns the pipeline, stopped.
    pub fn run(mut self) -> FramePipeline<S, K> {
        tracing::info!("Pipeline thread started");

        'outer: while self.running.load(Ordering::Relaxed) {
            let report = self.pipeline.poll(self.clock.now());
            self.forward(report);

            let timeout = self
                .pipeline
                .next_deadline()
                .map(|due| due.saturating_sub(self.clock.now()))
                .unwrap_or(IDLE_WAIT)
                .min(IDLE_WAIT);

            match self.cmd_rx.recv_timeout(timeout) {
                Ok(cmd) => {
                    if !self.handle_command(cmd) {
                        break;
                    }
                    while let Ok(cmd) = self.cmd_rx.try_recv() {
                        if !self.handle_command(cmd) {
                            break 'outer;
                        }
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Command channel closed");
                    break;
                }
            }
        }

        if self.pipeline.is_running() {
            self.pipeline.stop();
            self.emit(PipelineMessage::StateChanged(self.pipeline.state()));
        }
        self.emit(PipelineMessage::Shutdown);
        if self.dropped_messages > 0 {
            tracing::warn!("{} message(s) dropped, controller lagging", self.dropped_messages);
        }
        tracing::info!("Pipeline thread exiting");
        self.pipeline
    }

    fn forward(&mut self, report: PollReport) {
        if let Some(TickOutcome::Terminated(e)) = report.tick {
            self.emit(PipelineMessage::SourceError(e.to_string()));
            self.emit(PipelineMessage::StateChanged(self.pipeline.state()));
        }
        if let Some(sample) = report.fps {
            self.emit(PipelineMessage::Fps(sample));
        }
    }

    /// Returns false when the runner should exit.
    fn handle_command(&mut self, cmd: PipelineCommand) -> bool {
        let now = self.clock.now();
        match cmd {
            PipelineCommand::Start => {
                if self.pipeline.is_running() {
                    return true;
                }
                match self.pipeline.start(now) {
                    Ok(()) => self.emit(PipelineMessage::StateChanged(self.pipeline.state())),
                    Err(e) => self.emit(PipelineMessage::SourceError(e.to_string())),
                }
            }
            PipelineCommand::Stop => {
                if self.pipeline.is_running() {
                    self.pipeline.stop();
                    self.emit(PipelineMessage::StateChanged(self.pipeline.state()));
                }
            }
            PipelineCommand::UpdateConfig(config) => {
                let result = self.pipeline.update_config(config, now);
                self.config_result(result);
            }
            PipelineCommand::SetRadius(radius) => {
                let result = self.pipeline.set_radius(radius);
                self.config_result(result);
            }
            PipelineCommand::SetTickInterval(interval_ms) => {
                let result = self.pipeline.set_tick_interval(interval_ms, now);
                self.config_result(result);
            }
            PipelineCommand::SetInvert {
                horizontal,
                vertical,
            } => {
                let result = self.pipeline.set_invert(horizontal, vertical);
                self.config_result(result);
            }
            PipelineCommand::ProcessStill(frame) => {
                let output = self.pipeline.process_still(&frame);
                self.emit(PipelineMessage::StillProcessed(output.summary()));
            }
            PipelineCommand::RequestStats => {
                self.emit(PipelineMessage::Stats(self.pipeline.stats().clone()));
            }
            PipelineCommand::Shutdown => {
                tracing::debug!("Shutdown requested");
                return false;
            }
        }
        true
    }

    fn config_result(&mut self, result: PipelineResult<()>) {
        match result {
            Ok(()) => self.emit(PipelineMessage::ConfigApplied(*self.pipeline.config())),
            Err(e) => self.emit(PipelineMessage::ConfigRejected(e.to_string())),
        }
    }

    /// Never blocks: a full channel drops the message.
    fn emit(&mut self, msg: PipelineMessage) {
        match self.msg_tx.try_send(msg) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => self.dropped_messages += 1,
            Err(TrySendError::Disconnected(_)) => {}
        }
    }
}

/// A runner thread plus the handles to control it.
pub struct PipelineHandle<S, K> {
    pub bridge: PipelineBridge,
    running: Arc<AtomicBool>,
    join: JoinHandle<FramePipeline<S, K>>,
}

impl<S, K> PipelineHandle<S, K> {
    /// Ask the runner to exit without going through the command channel.
    pub fn request_stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_finished(&self) -> bool {
        self.join.is_finished()
    }

    /// Send Shutdown and wait for the thread, returning the stopped pipeline.
    pub fn join(self) -> PipelineResult<FramePipeline<S, K>> {
        self.bridge.shutdown();
        self.join.join().map_err(|_| PipelineError::ThreadPanicked)
    }
}

/// Spawn a runner thread for `pipeline` driven by `clock`.
pub fn spawn_pipeline<S, K, C>(
    pipeline: FramePipeline<S, K>,
    clock: C,
) -> PipelineResult<PipelineHandle<S, K>>
where
    S: FrameSource + 'static,
    K: DisplaySink + 'static,
    C: Clock + 'static,
{
    let (bridge, cmd_rx, msg_tx) = PipelineBridge::new();
    let running = Arc::new(AtomicBool::new(true));
    let runner = PipelineRunner::new(pipeline, clock, cmd_rx, msg_tx, running.clone());
    let join = std::thread::Builder::new()
        .name("forcefield-pipeline".to_string())
        .spawn(move || runner.run())
        .map_err(PipelineError::Spawn)?;
    Ok(PipelineHandle {
        bridge,
        running,
        join,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::schedule::ManualClock;
    use crate::pipeline::sink::NullSink;
    use crate::source::{SyntheticPattern, SyntheticSource};
    use crate::types::PipelineState;

    fn runner_with(
        source: SyntheticSource,
    ) -> (
        PipelineRunner<SyntheticSource, NullSink, ManualClock>,
        PipelineBridge,
        ManualClock,
    ) {
        let (bridge, cmd_rx, msg_tx) = PipelineBridge::new();
        let clock = ManualClock::new();
        let pipeline = FramePipeline::with_defaults(source, NullSink);
        let runner = PipelineRunner::new(
            pipeline,
            clock.clone(),
            cmd_rx,
            msg_tx,
            Arc::new(AtomicBool::new(true)),
        );
        (runner, bridge, clock)
    }

    #[test]
    fn test_commands_before_shutdown_are_handled() {
        let (runner, bridge, _clock) =
            runner_with(SyntheticSource::new(SyntheticPattern::Constant(5), 8, 8));
        bridge.start();
        bridge.set_radius(2);
        bridge.set_radius(99);
        bridge.stop();
        bridge.shutdown();

        let pipeline = runner.run();
        assert_eq!(pipeline.state(), PipelineState::Stopped);
        assert_eq!(pipeline.config().radius, 2);

        let msgs = bridge.drain();
        assert!(matches!(
            msgs[0],
            PipelineMessage::StateChanged(PipelineState::Running)
        ));
        assert!(matches!(msgs[1], PipelineMessage::ConfigApplied(c) if c.radius == 2));
        assert!(matches!(msgs[2], PipelineMessage::ConfigRejected(_)));
        assert!(matches!(
            msgs[3],
            PipelineMessage::StateChanged(PipelineState::Stopped)
        ));
        assert!(matches!(msgs.last(), Some(PipelineMessage::Shutdown)));
    }

    #[test]
    fn test_start_failure_is_reported() {
        let source =
            SyntheticSource::new(SyntheticPattern::Constant(5), 8, 8).with_start_failure("busy");
        let (runner, bridge, _clock) = runner_with(source);
        bridge.start();
        bridge.shutdown();

        let pipeline = runner.run();
        assert!(!pipeline.is_running());
        let msgs = bridge.drain();
        assert!(matches!(&msgs[0], PipelineMessage::SourceError(m) if m.contains("busy")));
    }

    #[test]
    fn test_still_and_stats() {
        let (runner, bridge, _clock) =
            runner_with(SyntheticSource::new(SyntheticPattern::Constant(5), 8, 8));
        let frame = crate::raster::RawFrame::zeroed(6, 6, crate::raster::PixelLayout::Rgb8).unwrap();
        bridge.process_still(frame);
        bridge.request_stats();
        bridge.shutdown();

        runner.run();
        let msgs = bridge.drain();
        assert!(matches!(msgs[0], PipelineMessage::StillProcessed(s) if s.width == 6));
        assert!(matches!(&msgs[1], PipelineMessage::Stats(s) if s.still_images == 1));
    }

    #[test]
    fn test_exits_when_controller_dropped() {
        let (runner, bridge, _clock) =
            runner_with(SyntheticSource::new(SyntheticPattern::Constant(5), 8, 8));
        drop(bridge);
        let pipeline = runner.run();
        assert!(!pipeline.is_running());
    }
}
