//! Processed-frame counter sampled by the FPS trigger.

/// Frames processed since the last FPS sample.
///
/// Only grows between samples; [`FrameCounter::take`] is the only reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameCounter {
    count: u64,
}

impl FrameCounter {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn increment(&mut self) {
        self.count = self.count.saturating_add(1);
    }

    pub fn value(&self) -> u64 {
        self.count
    }

    /// Read the count and reset it to zero.
    pub fn take(&mut self) -> u64 {
        std::mem::take(&mut self.count)
    }
}
