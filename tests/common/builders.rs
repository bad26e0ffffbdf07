//! Test data builders for frames and grids

use forcefield_rs::{IntensityGrid, PixelLayout, RawFrame};

/// Builder for checkerboard frames in any pixel layout
pub struct CheckerboardBuilder {
    width: usize,
    height: usize,
    square: usize,
    layout: PixelLayout,
    dark: u8,
    light: u8,
}

impl CheckerboardBuilder {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            square: 8,
            layout: PixelLayout::Rgb8,
            dark: 0,
            light: 255,
        }
    }

    pub fn square(mut self, square: usize) -> Self {
        self.square = square;
        self
    }

    pub fn layout(mut self, layout: PixelLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn levels(mut self, dark: u8, light: u8) -> Self {
        self.dark = dark;
        self.light = light;
        self
    }

    /// Gray level at `(x, y)`; square (0, 0) is dark
    pub fn value_at(&self, x: usize, y: usize) -> u8 {
        if (x / self.square + y / self.square) % 2 == 0 {
            self.dark
        } else {
            self.light
        }
    }

    pub fn build_grid(&self) -> IntensityGrid {
        IntensityGrid::from_fn(self.width, self.height, |x, y| self.value_at(x, y))
    }

    pub fn build(&self) -> RawFrame {
        let channels = self.layout.channels();
        let mut data = Vec::with_capacity(self.width * self.height * channels);
        for y in 0..self.height {
            for x in 0..self.width {
                let v = self.value_at(x, y);
                match channels {
                    1 => data.push(v),
                    3 => data.extend_from_slice(&[v, v, v]),
                    _ => data.extend_from_slice(&[v, v, v, 255]),
                }
            }
        }
        RawFrame::new(self.width, self.height, self.layout, data).unwrap()
    }
}

/// Zero grid with one bright pixel
pub fn point_source(width: usize, height: usize, x: usize, y: usize, value: u8) -> IntensityGrid {
    let mut grid = IntensityGrid::new(width, height);
    grid.set(x, y, value);
    grid
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checkerboard_builder() {
        let board = CheckerboardBuilder::new(16, 8).square(4);
        let frame = board.build();
        assert_eq!(frame.layout(), PixelLayout::Rgb8);
        assert_eq!(frame.as_bytes().len(), 16 * 8 * 3);
        assert_eq!(frame.to_intensity(), board.build_grid());
        assert_eq!(board.value_at(4, 0), 255);
    }
}
