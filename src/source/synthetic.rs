//! Synthetic frame source
//!
//! Generates frames from a fixed pattern so the pipeline can be exercised
//! without a capture device. Every pattern is defined as a gray value per
//! pixel and written to all color channels, so the luminance reduction
//! recovers it exactly.
//!
//! # Patterns
//!
//! - [`SyntheticPattern::Constant`] - one gray level everywhere
//! - [`SyntheticPattern::Checkerboard`] - alternating black and white squares
//! - [`SyntheticPattern::MovingBar`] - a bright vertical bar that advances every frame
//! - [`SyntheticPattern::PointSource`] - a single bright pixel in the center
//! - [`SyntheticPattern::Noise`] - xorshift noise, reproducible from a seed
//!
//! # Failure injection
//!
//! ```ignore
//! let source = SyntheticSource::new(SyntheticPattern::Constant(128), 320, 240)
//!     .with_transient_failures(5)
//!     .with_disconnect_after(100);
//! ```

use super::{AcquisitionError, FrameSource, SourceError};
use crate::config::CaptureConfig;
use crate::raster::{PixelLayout, RawFrame};

/// Pattern for generating synthetic frames
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyntheticPattern {
    /// Constant gray level
    Constant(u8),
    /// Squares of `square` pixels, white where `(x / square + y / square)` is odd
    Checkerboard { square: usize },
    /// Vertical bar `width` pixels wide moving `speed` pixels per frame
    MovingBar { width: usize, speed: usize },
    /// Single pixel of `value` at the frame center
    PointSource { value: u8 },
    /// Uniform noise
    Noise { seed: u64 },
}

impl Default for SyntheticPattern {
    fn default() -> Self {
        SyntheticPattern::Checkerboard { square: 16 }
    }
}

/// Frame source producing generated patterns
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    width: usize,
    height: usize,
    layout: PixelLayout,
    pattern: SyntheticPattern,
    started: bool,
    /// Frames delivered since creation
    delivered: u64,
    rng: u64,
    transient_failures: u32,
    disconnect_after: Option<u64>,
    start_failure: Option<String>,
    device_index: u32,
}

impl SyntheticSource {
    /// BGR source of the given size
    pub fn new(pattern: SyntheticPattern, width: usize, height: usize) -> Self {
        let rng = match pattern {
            SyntheticPattern::Noise { seed } => seed,
            _ => 0,
        };
        Self {
            width,
            height,
            layout: PixelLayout::Bgr8,
            pattern,
            started: false,
            delivered: 0,
            // xorshift never leaves zero
            rng: if rng == 0 { 0x9E37_79B9_7F4A_7C15 } else { rng },
            transient_failures: 0,
            disconnect_after: None,
            start_failure: None,
            device_index: 0,
        }
    }

    /// Source matching the requested capture size, layout and device index
    pub fn from_capture(capture: &CaptureConfig, pattern: SyntheticPattern) -> Self {
        let mut source = Self::new(pattern, capture.frame_width, capture.frame_height)
            .with_layout(capture.layout);
        source.device_index = capture.device_index;
        source
    }

    pub fn with_layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    /// Fail the next `count` acquisitions with a dropped frame
    pub fn with_transient_failures(mut self, count: u32) -> Self {
        self.transient_failures = count;
        self
    }

    /// Report a disconnect once `frames` frames have been delivered
    pub fn with_disconnect_after(mut self, frames: u64) -> Self {
        self.disconnect_after = Some(frames);
        self
    }

    /// Make `start` fail as if the device were missing or busy
    pub fn with_start_failure(mut self, reason: impl Into<String>) -> Self {
        self.start_failure = Some(reason.into());
        self
    }

    pub fn pattern(&self) -> SyntheticPattern {
        self.pattern
    }

    /// Frames delivered since creation
    pub fn delivered(&self) -> u64 {
        self.delivered
    }

    fn next_random(&mut self) -> u8 {
        let mut s = self.rng;
        s ^= s << 13;
        s ^= s >> 7;
        s ^= s << 17;
        self.rng = s;
        (s >> 56) as u8
    }

    fn render(&mut self) -> Vec<u8> {
        let (w, h) = (self.width, self.height);
        let mut gray = vec![0u8; w * h];
        match self.pattern {
            SyntheticPattern::Constant(v) => gray.fill(v),
            SyntheticPattern::Checkerboard { square } => {
                let square = square.max(1);
                for (i, px) in gray.iter_mut().enumerate() {
                    let (x, y) = (i % w, i / w);
                    if (x / square + y / square) % 2 == 1 {
                        *px = 255;
                    }
                }
            }
            SyntheticPattern::MovingBar { width, speed } => {
                if w > 0 {
                    let start = (self.delivered as usize).wrapping_mul(speed) % w;
                    for row in gray.chunks_exact_mut(w) {
                        for dx in 0..width.min(w) {
                            row[(start + dx) % w] = 255;
                        }
                    }
                }
            }
            SyntheticPattern::PointSource { value } => {
                if w > 0 && h > 0 {
                    gray[(h / 2) * w + w / 2] = value;
                }
            }
            SyntheticPattern::Noise { .. } => {
                for px in gray.iter_mut() {
                    *px = self.next_random();
                }
            }
        }
        expand_gray(&gray, self.layout)
    }
}

/// Write each gray sample to every color channel, alpha opaque.
fn expand_gray(gray: &[u8], layout: PixelLayout) -> Vec<u8> {
    match layout {
        PixelLayout::Gray8 => gray.to_vec(),
        PixelLayout::Rgb8 | PixelLayout::Bgr8 => gray.iter().flat_map(|&v| [v, v, v]).collect(),
        PixelLayout::Rgba8 | PixelLayout::Bgra8 => {
            gray.iter().flat_map(|&v| [v, v, v, 255]).collect()
        }
    }
}

impl FrameSource for SyntheticSource {
    fn start(&mut self) -> Result<(), SourceError> {
        if let Some(reason) = &self.start_failure {
            return Err(SourceError::DeviceUnavailable {
                index: self.device_index,
                reason: reason.clone(),
            });
        }
        if self.width == 0 || self.height == 0 {
            return Err(SourceError::UnsupportedFormat(format!(
                "frame size {}x{}",
                self.width, self.height
            )));
        }
        tracing::debug!("Starting {}", self.describe());
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
        if self.disconnect_after.is_some_and(|n| self.delivered >= n) {
            return Err(AcquisitionError::Disconnected(format!(
                "synthetic device {} unplugged after {} frames",
                self.device_index, self.delivered
            )));
        }
        if self.transient_failures > 0 {
            self.transient_failures -= 1;
            return Err(AcquisitionError::Dropped("injected failure".to_string()));
        }

        let data = self.render();
        let frame = RawFrame::new(self.width, self.height, self.layout, data)
            .map_err(|e| AcquisitionError::Dropped(e.to_string()))?;
        self.delivered += 1;
        Ok(frame)
    }

    fn frame_size(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    fn describe(&self) -> String {
        format!(
            "synthetic {:?} source {}x{} {}",
            self.pattern, self.width, self.height, self.layout
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(pattern: SyntheticPattern, w: usize, h: usize) -> SyntheticSource {
        let mut source = SyntheticSource::new(pattern, w, h);
        source.start().unwrap();
        source
    }

    #[test]
    fn test_constant_reduces_to_same_gray() {
        let mut source = started(SyntheticPattern::Constant(123), 8, 6);
        let frame = source.acquire().unwrap();
        assert_eq!(frame.layout(), PixelLayout::Bgr8);
        assert!(frame.to_intensity().as_slice().iter().all(|&v| v == 123));
    }

    #[test]
    fn test_checkerboard() {
        let mut source = started(SyntheticPattern::Checkerboard { square: 2 }, 8, 8)
            .with_layout(PixelLayout::Gray8);
        let grid = source.acquire().unwrap().to_intensity();
        assert_eq!(grid.get(0, 0), 0);
        assert_eq!(grid.get(2, 0), 255);
        assert_eq!(grid.get(2, 2), 0);
        assert_eq!(grid.get(1, 3), 255);
    }

    #[test]
    fn test_moving_bar_advances() {
        let mut source = started(SyntheticPattern::MovingBar { width: 1, speed: 3 }, 10, 2);
        let first = source.acquire().unwrap().to_intensity();
        let second = source.acquire().unwrap().to_intensity();
        assert_eq!(first.get(0, 1), 255);
        assert_eq!(second.get(3, 1), 255);
        assert_eq!(second.get(0, 1), 0);
    }

    #[test]
    fn test_point_source_centered() {
        let mut source = started(SyntheticPattern::PointSource { value: 200 }, 9, 7);
        let grid = source.acquire().unwrap().to_intensity();
        assert_eq!(grid.get(4, 3), 200);
        assert_eq!(grid.summary().nonzero, 1);
    }

    #[test]
    fn test_noise_is_reproducible() {
        let a = started(SyntheticPattern::Noise { seed: 42 }, 16, 16).acquire().unwrap();
        let b = started(SyntheticPattern::Noise { seed: 42 }, 16, 16).acquire().unwrap();
        assert_eq!(a, b);
        assert!(a.to_intensity().summary().max > 0);
    }

    #[test]
    fn test_transient_failures_then_frames() {
        let mut source = started(SyntheticPattern::Constant(1), 4, 4).with_transient_failures(2);
        assert!(matches!(source.acquire(), Err(AcquisitionError::Dropped(_))));
        assert!(matches!(source.acquire(), Err(AcquisitionError::Dropped(_))));
        assert!(source.acquire().is_ok());
        assert_eq!(source.delivered(), 1);
    }

    #[test]
    fn test_disconnect_after() {
        let mut source = started(SyntheticPattern::Constant(1), 4, 4).with_disconnect_after(1);
        assert!(source.acquire().is_ok());
        let err = source.acquire().unwrap_err();
        assert!(err.is_terminal());
    }

    #[test]
    fn test_start_failure() {
        let mut source =
            SyntheticSource::new(SyntheticPattern::Constant(1), 4, 4).with_start_failure("busy");
        assert!(matches!(
            source.start(),
            Err(SourceError::DeviceUnavailable { .. })
        ));
        assert!(!source.is_started());
    }

    #[test]
    fn test_from_capture() {
        let capture = CaptureConfig::default();
        let source = SyntheticSource::from_capture(&capture, SyntheticPattern::default());
        assert_eq!(source.frame_size(), (320, 240));
    }

    #[test]
    fn test_rgba_layout_has_opaque_alpha() {
        let mut source =
            started(SyntheticPattern::Constant(9), 2, 2).with_layout(PixelLayout::Rgba8);
        let frame = source.acquire().unwrap();
        assert_eq!(&frame.as_bytes()[..4], &[9, 9, 9, 255]);
    }
}
