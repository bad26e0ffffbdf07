//! Frame sources
//!
//! This module provides a common trait for everything that can deliver raw
//! frames to the pipeline, so the pipeline runs the same way against a camera,
//! a generated pattern, or a list of decoded still images.
//!
//! # Implementations
//!
//! - [`SyntheticSource`] - generated test patterns with failure injection
//! - [`ReplaySource`] - cycles through pre-loaded frames
//!
//! # Error split
//!
//! [`SourceError`] is raised by [`FrameSource::start`] and is fatal: the
//! pipeline refuses to start. [`AcquisitionError`] is raised per frame and is
//! transient unless [`AcquisitionError::is_terminal`] says otherwise.

pub mod replay;
pub mod synthetic;

pub use crate::config::CaptureConfig;
pub use replay::ReplaySource;
pub use synthetic::{SyntheticPattern, SyntheticSource};

use crate::raster::RawFrame;
use std::time::Duration;
use thiserror::Error;

/// Errors that prevent a source from starting
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("capture device {index} unavailable: {reason}")]
    DeviceUnavailable { index: u32, reason: String },

    #[error("unsupported frame format: {0}")]
    UnsupportedFormat(String),

    #[error("failed to decode frame: {0}")]
    Image(#[from] image::ImageError),

    #[error("source has no frames")]
    Empty,
}

/// Errors from a single acquisition
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionError {
    #[error("source is not started")]
    NotStarted,

    #[error("no frame within {0:?}")]
    Timeout(Duration),

    #[error("frame dropped: {0}")]
    Dropped(String),

    #[error("source disconnected: {0}")]
    Disconnected(String),
}

impl AcquisitionError {
    /// Whether the source can no longer deliver frames.
    pub fn is_terminal(&self) -> bool {
        matches!(self, AcquisitionError::Disconnected(_))
    }
}

/// Anything that can deliver fixed-size raw frames on demand
///
/// Implementations must be `Send` so a pipeline can run on its own thread.
/// `acquire` may block briefly; it is the only suspension point of a tick.
///
/// # Example
///
/// ```ignore
/// fn grab(source: &mut dyn FrameSource) -> Option<RawFrame> {
///     source.acquire().ok()
/// }
/// ```
pub trait FrameSource: Send {
    /// Open the device and begin delivering frames
    fn start(&mut self) -> Result<(), SourceError>;

    /// Stop delivering frames. Calling it on a stopped source does nothing.
    fn stop(&mut self);

    fn is_started(&self) -> bool;

    /// Acquire the next frame
    fn acquire(&mut self) -> Result<RawFrame, AcquisitionError>;

    /// `(width, height)` of delivered frames
    fn frame_size(&self) -> (usize, usize);

    /// Human readable label for logs
    fn describe(&self) -> String {
        let (w, h) = self.frame_size();
        format!("{}x{} frame source", w, h)
    }
}

impl<T: FrameSource + ?Sized> FrameSource for Box<T> {
    fn start(&mut self) -> Result<(), SourceError> {
        (**self).start()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn is_started(&self) -> bool {
        (**self).is_started()
    }

    fn acquire(&mut self) -> Result<RawFrame, AcquisitionError> {
        (**self).acquire()
    }

    fn frame_size(&self) -> (usize, usize) {
        (**self).frame_size()
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}
