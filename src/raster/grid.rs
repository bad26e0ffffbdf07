//! Single-channel 8-bit intensity grid.

use super::{buffer_len, mirror_columns, mirror_rows, FrameError};
use crate::types::GridSummary;
use image::GrayImage;

/// A 2-D grid of unsigned 8-bit samples, row-major with stride equal to width.
///
/// Dimensions are fixed for the lifetime of a grid. Grids move between pipeline
/// stages by value; `Clone` is a deep copy of the pixel buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IntensityGrid {
    width: usize,
    height: usize,
    data: Vec<u8>,
}

impl IntensityGrid {
    /// Create a zero-filled grid.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    pub fn new(width: usize, height: usize) -> Self {
        Self::filled(width, height, 0)
    }

    /// Create a grid with every sample set to `value`.
    ///
    /// # Panics
    /// Panics if `width * height` overflows `usize`.
    pub fn filled(width: usize, height: usize, value: u8) -> Self {
        let len = width
            .checked_mul(height)
            .unwrap_or_else(|| panic!("grid dimensions {width}x{height} overflow usize"));
        Self {
            width,
            height,
            data: vec![value; len],
        }
    }

    /// Wrap an existing buffer. The length must be exactly `width * height`.
    pub fn from_raw(width: usize, height: usize, data: Vec<u8>) -> Result<Self, FrameError> {
        let expected = buffer_len(width, height, 1)?;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels: 1,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Length already validated by the caller.
    pub(crate) fn from_parts(width: usize, height: usize, data: Vec<u8>) -> Self {
        debug_assert_eq!(data.len(), width * height);
        Self {
            width,
            height,
            data,
        }
    }

    /// Build a grid by evaluating `f(x, y)` for every sample.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> u8) -> Self {
        let mut grid = Self::new(width, height);
        for y in 0..height {
            for x in 0..width {
                grid.data[y * width + x] = f(x, y);
            }
        }
        grid
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// `(width, height)`
    #[inline]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Sample at `(x, y)`.
    ///
    /// # Panics
    /// Panics if the coordinate is out of bounds.
    #[inline]
    pub fn get(&self, x: usize, y: usize) -> u8 {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x]
    }

    /// Bounds-checked sample access.
    #[inline]
    pub fn try_get(&self, x: usize, y: usize) -> Option<u8> {
        (x < self.width && y < self.height).then(|| self.data[y * self.width + x])
    }

    #[inline]
    pub fn set(&mut self, x: usize, y: usize, value: u8) {
        assert!(x < self.width && y < self.height, "({x}, {y}) out of bounds");
        self.data[y * self.width + x] = value;
    }

    /// Row `y` as a slice of `width` samples.
    pub fn row(&self, y: usize) -> &[u8] {
        &self.data[y * self.width..(y + 1) * self.width]
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [u8] {
        &mut self.data
    }

    pub fn into_raw(self) -> Vec<u8> {
        self.data
    }

    /// Mirror along the vertical axis (left and right swap).
    pub fn flip_horizontal(&mut self) {
        mirror_rows(&mut self.data, self.width, 1);
    }

    /// Mirror along the horizontal axis (top and bottom swap).
    pub fn flip_vertical(&mut self) {
        mirror_columns(&mut self.data, self.height, self.width);
    }

    /// Min / max / mean / non-zero count over all samples.
    pub fn summary(&self) -> GridSummary {
        if self.data.is_empty() {
            return GridSummary::default();
        }
        let mut min = u8::MAX;
        let mut max = u8::MIN;
        let mut sum = 0u64;
        let mut nonzero = 0usize;
        for &v in &self.data {
            min = min.min(v);
            max = max.max(v);
            sum += u64::from(v);
            if v != 0 {
                nonzero += 1;
            }
        }
        GridSummary {
            width: self.width,
            height: self.height,
            min,
            max,
            mean: sum as f64 / self.data.len() as f64,
            nonzero,
        }
    }

    /// Copy into an `image` crate buffer for display consumers.
    pub fn to_gray_image(&self) -> Option<GrayImage> {
        let w = u32::try_from(self.width).ok()?;
        let h = u32::try_from(self.height).ok()?;
        GrayImage::from_raw(w, h, self.data.clone())
    }
}

impl From<GrayImage> for IntensityGrid {
    fn from(img: GrayImage) -> Self {
        let width = img.width() as usize;
        let height = img.height() as usize;
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}
