//! Multi-channel frames as delivered by a frame source.

use super::{buffer_len, mirror_columns, mirror_rows, FrameError, IntensityGrid};
use image::DynamicImage;
use serde::{Deserialize, Serialize};

/// Channel layout of a [`RawFrame`] (8 bits per channel, interleaved).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PixelLayout {
    Gray8,
    Rgb8,
    /// Native layout of most capture devices
    #[default]
    Bgr8,
    Rgba8,
    Bgra8,
}

impl PixelLayout {
    /// Bytes per pixel
    pub const fn channels(self) -> usize {
        match self {
            PixelLayout::Gray8 => 1,
            PixelLayout::Rgb8 | PixelLayout::Bgr8 => 3,
            PixelLayout::Rgba8 | PixelLayout::Bgra8 => 4,
        }
    }

    /// Byte offsets of the (red, green, blue) channels within one pixel.
    const fn rgb_offsets(self) -> (usize, usize, usize) {
        match self {
            PixelLayout::Gray8 => (0, 0, 0),
            PixelLayout::Rgb8 | PixelLayout::Rgba8 => (0, 1, 2),
            PixelLayout::Bgr8 | PixelLayout::Bgra8 => (2, 1, 0),
        }
    }
}

impl std::fmt::Display for PixelLayout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PixelLayout::Gray8 => write!(f, "GRAY8"),
            PixelLayout::Rgb8 => write!(f, "RGB8"),
            PixelLayout::Bgr8 => write!(f, "BGR8"),
            PixelLayout::Rgba8 => write!(f, "RGBA8"),
            PixelLayout::Bgra8 => write!(f, "BGRA8"),
        }
    }
}

// BT.601 luma weights in 14-bit fixed point; they sum to 1 << 14.
const LUMA_R: u32 = 4899;
const LUMA_G: u32 = 9617;
const LUMA_B: u32 = 1868;
const LUMA_SHIFT: u32 = 14;
const LUMA_ROUND: u32 = 1 << (LUMA_SHIFT - 1);

/// BT.601 luminance of one pixel.
#[inline]
pub fn luma(r: u8, g: u8, b: u8) -> u8 {
    let y = (LUMA_R * u32::from(r) + LUMA_G * u32::from(g) + LUMA_B * u32::from(b) + LUMA_ROUND)
        >> LUMA_SHIFT;
    // weights sum to 1 << 14 so y never exceeds 255
    y as u8
}

/// An interleaved 8-bit frame of fixed size.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawFrame {
    width: usize,
    height: usize,
    layout: PixelLayout,
    data: Vec<u8>,
}

impl RawFrame {
    /// Wrap a buffer; its length must match `width * height * layout.channels()`.
    pub fn new(
        width: usize,
        height: usize,
        layout: PixelLayout,
        data: Vec<u8>,
    ) -> Result<Self, FrameError> {
        let channels = layout.channels();
        let expected = buffer_len(width, height, channels)?;
        if data.len() != expected {
            return Err(FrameError::BufferSize {
                width,
                height,
                channels,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            layout,
            data,
        })
    }

    /// Black frame of the given size.
    pub fn zeroed(width: usize, height: usize, layout: PixelLayout) -> Result<Self, FrameError> {
        let len = buffer_len(width, height, layout.channels())?;
        Self::new(width, height, layout, vec![0; len])
    }

    /// Take over a decoded image. 8-bit gray stays single channel, everything else
    /// is converted to RGB8.
    pub fn from_dynamic(img: DynamicImage) -> Self {
        let (layout, width, height, data) = match img {
            DynamicImage::ImageLuma8(gray) => (
                PixelLayout::Gray8,
                gray.width(),
                gray.height(),
                gray.into_raw(),
            ),
            other => {
                let rgb = other.into_rgb8();
                (PixelLayout::Rgb8, rgb.width(), rgb.height(), rgb.into_raw())
            }
        };
        Self {
            width: width as usize,
            height: height as usize,
            layout,
            data,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn layout(&self) -> PixelLayout {
        self.layout
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn as_bytes_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Mirror along the vertical axis (left and right swap).
    pub fn flip_horizontal(&mut self) {
        mirror_rows(&mut self.data, self.width, self.layout.channels());
    }

    /// Mirror along the horizontal axis (top and bottom swap).
    pub fn flip_vertical(&mut self) {
        let row_len = self.width * self.layout.channels();
        mirror_columns(&mut self.data, self.height, row_len);
    }

    /// Reduce to a single-channel luminance grid. Alpha is ignored.
    pub fn to_intensity(&self) -> IntensityGrid {
        let data = match self.layout {
            PixelLayout::Gray8 => self.data.clone(),
            layout => {
                let (ri, gi, bi) = layout.rgb_offsets();
                self.data
                    .chunks_exact(layout.channels())
                    .map(|px| luma(px[ri], px[gi], px[bi]))
                    .collect()
            }
        };
        IntensityGrid::from_parts(self.width, self.height, data)
    }
}

impl From<IntensityGrid> for RawFrame {
    fn from(grid: IntensityGrid) -> Self {
        let (width, height) = grid.dimensions();
        Self {
            width,
            height,
            layout: PixelLayout::Gray8,
            data: grid.into_raw(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_luma_extremes() {
        assert_eq!(luma(0, 0, 0), 0);
        assert_eq!(luma(255, 255, 255), 255);
        // Pure green dominates pure blue
        assert!(luma(0, 255, 0) > luma(0, 0, 255));
    }

    #[test]
    fn test_luma_primaries() {
        assert_eq!(luma(255, 0, 0), 76);
        assert_eq!(luma(0, 255, 0), 150);
        assert_eq!(luma(0, 0, 255), 29);
    }

    #[test]
    fn test_bgr_and_rgb_agree() {
        let rgb = RawFrame::new(1, 1, PixelLayout::Rgb8, vec![200, 100, 50]).unwrap();
        let bgr = RawFrame::new(1, 1, PixelLayout::Bgr8, vec![50, 100, 200]).unwrap();
        assert_eq!(rgb.to_intensity(), bgr.to_intensity());
    }

    #[test]
    fn test_alpha_ignored() {
        let opaque = RawFrame::new(1, 1, PixelLayout::Bgra8, vec![10, 20, 30, 255]).unwrap();
        let clear = RawFrame::new(1, 1, PixelLayout::Bgra8, vec![10, 20, 30, 0]).unwrap();
        assert_eq!(opaque.to_intensity(), clear.to_intensity());
    }

    #[test]
    fn test_new_validates_length() {
        assert!(RawFrame::new(2, 2, PixelLayout::Bgr8, vec![0; 11]).is_err());
        assert!(RawFrame::new(2, 2, PixelLayout::Bgr8, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_flip_horizontal_keeps_channels_together() {
        let mut frame =
            RawFrame::new(2, 1, PixelLayout::Bgr8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        frame.flip_horizontal();
        assert_eq!(frame.as_bytes(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_flip_vertical() {
        let mut frame = RawFrame::new(1, 2, PixelLayout::Rgb8, vec![1, 2, 3, 4, 5, 6]).unwrap();
        frame.flip_vertical();
        assert_eq!(frame.as_bytes(), &[4, 5, 6, 1, 2, 3]);
    }

    #[test]
    fn test_from_dynamic_rgba_becomes_rgb() {
        let img = DynamicImage::new_rgba8(3, 2);
        let frame = RawFrame::from_dynamic(img);
        assert_eq!(frame.layout(), PixelLayout::Rgb8);
        assert_eq!(frame.as_bytes().len(), 18);
    }

    #[test]
    fn test_gray_passthrough() {
        let grid = IntensityGrid::from_fn(3, 3, |x, y| (x + y * 3) as u8);
        let frame = RawFrame::from(grid.clone());
        assert_eq!(frame.to_intensity(), grid);
    }
}
