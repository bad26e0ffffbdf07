//! Replay of pre-loaded frames.

use super::{AcquisitionError, FrameSource, SourceError};
use crate::raster::RawFrame;
use std::path::Path;

/// Cycles through a fixed list of frames, one per acquisition.
///
/// All frames share one size and layout, like a real capture session.
#[derive(Debug, Clone)]
pub struct ReplaySource {
    frames: Vec<RawFrame>,
    cursor: usize,
    started: bool,
}

impl ReplaySource {
    pub fn new(frames: Vec<RawFrame>) -> Result<Self, SourceError> {
        let first = frames.first().ok_or(SourceError::Empty)?;
        let shape = (first.width(), first.height(), first.layout());
        if let Some((i, odd)) = frames
            .iter()
            .enumerate()
            .find(|(_, f)| (f.width(), f.height(), f.layout()) != shape)
        {
            return Err(SourceError::UnsupportedFormat(format!(
                "frame {} is {}x{} {}, expected {}x{} {}",
                i,
                odd.width(),
                odd.height(),
                odd.layout(),
                shape.0,
                shape.1,
                shape.2
            )));
        }
        Ok(Self {
            frames,
            cursor: 0,
            started: false,
        })
    }

    /// Decode every path in order
    pub fn from_paths<P: AsRef<Path>>(paths: &[P]) -> Result<Self, SourceError> {
        let mut frames = Vec::with_capacity(paths.len());
        for path in paths {
            let img = image::open(path.as_ref())?;
            frames.push(RawFrame::from_dynamic(img));
        }
        tracing::debug!("Loaded {} replay frame(s)", frames.len());
        Self::new(frames)
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }
}

impl FrameSource for ReplaySource {
    fn start(&mut self) -> Result<(), SourceError> {
        self.started = true;
        Ok(())
    }

    fn stop(&mut self) {
        self.started = false;
    }

    fn is_started(&self) -> bool {
        self.started
    }

    fn acquire(&mut self) -> Result<RawFrame, AcquisitionError> {
        if !self.started {
            return Err(AcquisitionError::NotStarted);
        }
        let frame = self.frames[self.cursor].clone();
        self.cursor = (self.cursor + 1) % self.frames.len();
        Ok(frame)
    }

    fn frame_size(&self) -> (usize, usize) {
        (self.frames[0].width(), self.frames[0].height())
    }

    fn describe(&self) -> String {
        let (w, h) = self.frame_size();
        format!("replay of {} frame(s) at {}x{}", self.frames.len(), w, h)
    }
}
