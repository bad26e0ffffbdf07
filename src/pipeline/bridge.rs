//! Thread boundary between the pipeline runner and its controller.
//!
//! The controller (CLI, UI or test) holds a [`PipelineBridge`]; the runner
//! thread owns the matching command receiver and message sender.

use crate::config::PipelineConfig;
use crate::raster::RawFrame;
use crate::types::{FpsSample, GridSummary, PipelineState, PipelineStats};
use crossbeam_channel::{bounded, Receiver, RecvTimeoutError, Sender};
use std::time::Duration;

/// Messages sent from the runner to the controller.
#[derive(Debug, Clone)]
pub enum PipelineMessage {
    /// The pipeline entered a new run state.
    StateChanged(PipelineState),

    /// Periodic throughput sample.
    Fps(FpsSample),

    /// Statistics snapshot (response to RequestStats).
    Stats(PipelineStats),

    /// A configuration update was accepted.
    ConfigApplied(PipelineConfig),

    /// A configuration update was rejected; the previous one stays in effect.
    ConfigRejected(String),

    /// The frame source failed to start or terminated.
    SourceError(String),

    /// A still image went through the one-shot path.
    StillProcessed(GridSummary),

    /// The runner is shutting down.
    Shutdown,
}

/// Commands sent from the controller to the runner.
#[derive(Debug, Clone)]
pub enum PipelineCommand {
    /// Start the source and begin ticking.
    Start,
    /// Stop ticking.
    Stop,
    /// Replace the whole pipeline configuration.
    UpdateConfig(PipelineConfig),
    /// Set the window radius.
    SetRadius(usize),
    /// Set the tick interval in milliseconds.
    SetTickInterval(u64),
    /// Set both mirroring flags.
    SetInvert { horizontal: bool, vertical: bool },
    /// Transform one still image.
    ProcessStill(RawFrame),
    /// Request current statistics.
    RequestStats,
    /// Shut down the runner thread.
    Shutdown,
}

/// Channel capacity for commands (controller → runner).
const CMD_CHANNEL_CAPACITY: usize = 256;
/// Channel capacity for messages (runner → controller).
const MSG_CHANNEL_CAPACITY: usize = 1024;

/// Controller-side handle for communicating with the runner thread.
pub struct PipelineBridge {
    pub cmd_tx: Sender<PipelineCommand>,
    pub msg_rx: Receiver<PipelineMessage>,
}

impl PipelineBridge {
    /// Create a new bridge pair: `(bridge, cmd_rx, msg_tx)`.
    ///
    /// The runner thread owns `cmd_rx` and `msg_tx`.
    pub fn new() -> (Self, Receiver<PipelineCommand>, Sender<PipelineMessage>) {
        let (cmd_tx, cmd_rx) = bounded(CMD_CHANNEL_CAPACITY);
        let (msg_tx, msg_rx) = bounded(MSG_CHANNEL_CAPACITY);
        (Self { cmd_tx, msg_rx }, cmd_rx, msg_tx)
    }

    // --- Messages ---

    /// Drain all pending messages.
    pub fn drain(&self) -> Vec<PipelineMessage> {
        self.msg_rx.try_iter().collect()
    }

    /// Try to receive a single message without blocking.
    pub fn try_recv(&self) -> Option<PipelineMessage> {
        self.msg_rx.try_recv().ok()
    }

    /// Wait up to `timeout` for the next message.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<PipelineMessage> {
        match self.msg_rx.recv_timeout(timeout) {
            Ok(msg) => Some(msg),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    // --- Commands ---

    pub fn send_command(&self, cmd: PipelineCommand) -> bool {
        self.cmd_tx.send(cmd).is_ok()
    }

    pub fn start(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Start);
    }

    pub fn stop(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Stop);
    }

    pub fn update_config(&self, config: PipelineConfig) {
        let _ = self.cmd_tx.send(PipelineCommand::UpdateConfig(config));
    }

    pub fn set_radius(&self, radius: usize) {
        let _ = self.cmd_tx.send(PipelineCommand::SetRadius(radius));
    }

    pub fn set_tick_interval(&self, interval_ms: u64) {
        let _ = self.cmd_tx.send(PipelineCommand::SetTickInterval(interval_ms));
    }

    pub fn set_invert(&self, horizontal: bool, vertical: bool) {
        let _ = self.cmd_tx.send(PipelineCommand::SetInvert {
            horizontal,
            vertical,
        });
    }

    pub fn process_still(&self, frame: RawFrame) {
        let _ = self.cmd_tx.send(PipelineCommand::ProcessStill(frame));
    }

    pub fn request_stats(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::RequestStats);
    }

    pub fn shutdown(&self) {
        let _ = self.cmd_tx.send(PipelineCommand::Shutdown);
    }
}
