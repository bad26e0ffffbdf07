//! Pixel buffers flowing through the pipeline.
//!
//! - [`RawFrame`] - multi-channel byte buffer as delivered by a frame source
//! - [`IntensityGrid`] - single-channel 8-bit grid consumed and produced by the transform
//! - [`load_still_image`] - decode an image file into a [`RawFrame`]
//!
//! Both buffers are row-major with stride equal to width and are passed by
//! value between pipeline stages.

pub mod frame;
pub mod grid;
pub mod still;

pub use frame::{PixelLayout, RawFrame};
pub use grid::IntensityGrid;
pub use still::load_still_image;

use thiserror::Error;

/// Errors for malformed pixel buffers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("buffer holds {actual} bytes, {width}x{height} with {channels} channel(s) needs {expected}")]
    BufferSize {
        width: usize,
        height: usize,
        channels: usize,
        expected: usize,
        actual: usize,
    },

    #[error("image dimensions {width}x{height} overflow the addressable size")]
    TooLarge { width: usize, height: usize },
}

/// Expected byte length of a `width x height` buffer with `channels` bytes per pixel.
pub(crate) fn buffer_len(
    width: usize,
    height: usize,
    channels: usize,
) -> Result<usize, FrameError> {
    width
        .checked_mul(height)
        .and_then(|n| n.checked_mul(channels))
        .ok_or(FrameError::TooLarge { width, height })
}

/// Reverse the order of `channels`-byte pixels within each row.
pub(crate) fn mirror_rows(data: &mut [u8], width: usize, channels: usize) {
    let row_len = width * channels;
    if row_len == 0 {
        return;
    }
    for row in data.chunks_exact_mut(row_len) {
        if channels == 1 {
            row.reverse();
            continue;
        }
        let (mut left, mut right) = (0, width.saturating_sub(1));
        while left < right {
            let (head, tail) = row.split_at_mut(right * channels);
            head[left * channels..(left + 1) * channels].swap_with_slice(&mut tail[..channels]);
            left += 1;
            right -= 1;
        }
    }
}

/// Swap row `y` with row `height - 1 - y` for the top half of the buffer.
pub(crate) fn mirror_columns(data: &mut [u8], height: usize, row_len: usize) {
    if row_len == 0 || height < 2 {
        return;
    }
    for y in 0..height / 2 {
        let (top, bottom) = data.split_at_mut((height - 1 - y) * row_len);
        top[y * row_len..(y + 1) * row_len].swap_with_slice(&mut bottom[..row_len]);
    }
}
