//! Force field transform engine
//!
//! For every interior pixel the engine sums the inverse-square weighted
//! direction to every contributing neighbor in a `(2r + 1)^2` window:
//!
//! ```text
//! F(x, y) = sum over (dx, dy) of (dx, dy) * I(x + dx, y + dy) / |(dx, dy)|^3
//! out(x, y) = clamp(round(|F|), 0, 255)
//! ```
//!
//! Pixels closer than `r` to any edge are left at zero. Grids with no interior
//! pixels (`width <= 2r` or `height <= 2r`) produce an all-zero grid of the same
//! size.
//!
//! The transform is not idempotent: applying it to its own output generally
//! yields a different grid.
//!
//! # Example
//!
//! ```
//! use forcefield_rs::raster::IntensityGrid;
//! use forcefield_rs::transform::force_field_transform;
//!
//! let input = IntensityGrid::filled(16, 16, 200);
//! let output = force_field_transform(&input, 2);
//! assert_eq!(output.dimensions(), (16, 16));
//! assert!(output.as_slice().iter().all(|&v| v == 0));
//! ```

pub mod kernel;

pub use kernel::{ForceKernel, NeighborPolicy, Tap};

use crate::config::PipelineConfig;
use crate::raster::IntensityGrid;
use rayon::prelude::*;
use std::sync::OnceLock;

/// Configured transform engine.
///
/// The kernel is built on the first grid large enough to have an interior, so
/// its size is bounded by the grids actually transformed rather than by the
/// radius alone.
#[derive(Debug, Clone)]
pub struct ForceFieldTransform {
    radius: usize,
    policy: NeighborPolicy,
    parallel: bool,
    kernel: OnceLock<ForceKernel>,
}

impl PartialEq for ForceFieldTransform {
    fn eq(&self, other: &Self) -> bool {
        self.radius == other.radius
            && self.policy == other.policy
            && self.parallel == other.parallel
    }
}

impl ForceFieldTransform {
    /// Engine with the default neighbor policy, evaluated in parallel.
    pub fn new(radius: usize) -> Self {
        Self {
            radius,
            policy: NeighborPolicy::default(),
            parallel: true,
            kernel: OnceLock::new(),
        }
    }

    /// Engine matching the transform settings of a pipeline configuration.
    pub fn from_config(config: &PipelineConfig) -> Self {
        Self::new(config.radius)
            .with_neighbors(config.neighbor_policy)
            .with_parallel(config.parallel)
    }

    pub fn with_neighbors(mut self, policy: NeighborPolicy) -> Self {
        if policy != self.policy {
            self.policy = policy;
            self.kernel = OnceLock::new();
        }
        self
    }

    /// Split rows across the rayon pool. Output is identical either way.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn neighbors(&self) -> NeighborPolicy {
        self.policy
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel
    }

    /// The precomputed kernel, once a grid with an interior has been transformed.
    pub fn kernel(&self) -> Option<&ForceKernel> {
        self.kernel.get()
    }

    /// Whether a grid of this size has any interior pixel for this radius.
    pub fn has_interior(&self, width: usize, height: usize) -> bool {
        self.radius
            .checked_mul(2)
            .is_some_and(|span| width > span && height > span)
    }

    /// Transform `input` into a new magnitude grid of the same dimensions.
    pub fn apply(&self, input: &IntensityGrid) -> IntensityGrid {
        let (width, height) = input.dimensions();
        let mut output = IntensityGrid::new(width, height);
        if !self.has_interior(width, height) {
            tracing::trace!(
                "Grid {}x{} has no interior for radius {}",
                width,
                height,
                self.radius()
            );
            return output;
        }

        let r = self.radius;
        // The window fits inside the grid here, so the kernel does too
        let kernel = self
            .kernel
            .get_or_init(|| ForceKernel::new(r, self.policy));
        let taps = kernel.linear_taps(width);
        let src = input.as_slice();
        let interior_rows = &mut output.as_mut_slice()[r * width..(height - r) * width];

        if self.parallel {
            interior_rows
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(i, row)| render_row(src, width, r, r + i, &taps, row));
        } else {
            interior_rows
                .chunks_mut(width)
                .enumerate()
                .for_each(|(i, row)| render_row(src, width, r, r + i, &taps, row));
        }
        output
    }
}

impl Default for ForceFieldTransform {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Transform with the default neighbor policy.
pub fn force_field_transform(input: &IntensityGrid, radius: usize) -> IntensityGrid {
    ForceFieldTransform::new(radius).apply(input)
}

/// Fill the interior columns of output row `y`.
fn render_row(
    src: &[u8],
    width: usize,
    r: usize,
    y: usize,
    taps: &[(isize, f64, f64)],
    row: &mut [u8],
) {
    for x in r..width - r {
        let center = (y * width + x) as isize;
        let (mut fx, mut fy) = (0.0f64, 0.0f64);
        for &(offset, wx, wy) in taps {
            // offset stays inside the window, which lies inside the grid
            let v = f64::from(src[(center + offset) as usize]);
            fx += wx * v;
            fy += wy * v;
        }
        row[x] = quantize((fx * fx + fy * fy).sqrt());
    }
}

#[inline]
fn quantize(magnitude: f64) -> u8 {
    magnitude.round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Direct transcription of the windowed sum, no precomputation.
    fn reference(input: &IntensityGrid, r: usize, policy: NeighborPolicy) -> IntensityGrid {
        let (w, h) = input.dimensions();
        let mut out = IntensityGrid::new(w, h);
        if w <= 2 * r || h <= 2 * r {
            return out;
        }
        for y in r..h - r {
            for x in r..w - r {
                let (mut fx, mut fy) = (0.0, 0.0);
                for yy in y - r..=y + r {
                    for xx in x - r..=x + r {
                        let dx = xx as isize - x as isize;
                        let dy = yy as isize - y as isize;
                        if !policy.includes(dx, dy) {
                            continue;
                        }
                        let d = ((dx * dx + dy * dy) as f64).sqrt();
                        let inv_cube = 1.0 / (d * d * d);
                        let v = f64::from(input.get(xx, yy));
                        fx += dx as f64 * inv_cube * v;
                        fy += dy as f64 * inv_cube * v;
                    }
                }
                out.set(x, y, quantize((fx * fx + fy * fy).sqrt()));
            }
        }
        out
    }

    fn ramp(w: usize, h: usize) -> IntensityGrid {
        IntensityGrid::from_fn(w, h, |x, y| ((x * 37 + y * 91) % 256) as u8)
    }

    #[test]
    fn test_matches_reference() {
        let input = ramp(23, 17);
        for policy in [NeighborPolicy::OffAxis, NeighborPolicy::AllButCenter] {
            for r in 1..=4 {
                let engine = ForceFieldTransform::new(r).with_neighbors(policy);
                assert_eq!(engine.apply(&input), reference(&input, r, policy), "r={r} {policy}");
            }
        }
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let input = ramp(64, 48);
        let par = ForceFieldTransform::new(3).apply(&input);
        let seq = ForceFieldTransform::new(3).with_parallel(false).apply(&input);
        assert_eq!(par, seq);
    }

    #[test]
    fn test_border_is_zero() {
        let mut input = IntensityGrid::filled(12, 9, 255);
        input.set(5, 4, 0);
        let out = force_field_transform(&input, 2);
        for y in 0..9 {
            for x in 0..12 {
                if x < 2 || y < 2 || x >= 10 || y >= 7 {
                    assert_eq!(out.get(x, y), 0, "({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn test_degenerate_sizes() {
        for (w, h) in [(0, 0), (3, 10), (10, 3), (2, 2), (5, 5)] {
            let input = IntensityGrid::filled(w, h, 99);
            let out = force_field_transform(&input, 2);
            assert_eq!(out.dimensions(), (w, h));
            assert!(out.as_slice().iter().all(|&v| v == 0));
        }
    }

    #[test]
    fn test_smallest_interior() {
        // 3x3 with radius 1 has exactly one interior pixel
        let input = IntensityGrid::from_raw(3, 3, vec![254, 0, 0, 0, 0, 0, 0, 0, 0]).unwrap();
        let out = force_field_transform(&input, 1);
        // Single diagonal neighbor at distance sqrt(2): 254 / 2
        assert_eq!(out.get(1, 1), 127);
        assert_eq!(out.as_slice().iter().filter(|&&v| v != 0).count(), 1);
    }

    #[test]
    fn test_off_axis_ignores_same_row_and_column() {
        let mut input = IntensityGrid::new(5, 5);
        input.set(2, 0, 255);
        input.set(4, 2, 255);
        let off = ForceFieldTransform::new(2).apply(&input);
        assert_eq!(off.get(2, 2), 0);

        let all = ForceFieldTransform::new(2)
            .with_neighbors(NeighborPolicy::AllButCenter)
            .apply(&input);
        assert!(all.get(2, 2) > 0);
    }

    #[test]
    fn test_saturates_at_255() {
        // Bright half-plane: the all-but-center sum exceeds 255
        let input = IntensityGrid::from_fn(9, 9, |x, _| if x > 4 { 255 } else { 0 });
        let out = ForceFieldTransform::new(3)
            .with_neighbors(NeighborPolicy::AllButCenter)
            .apply(&input);
        assert_eq!(out.get(4, 4), 255);
    }

    #[test]
    fn test_huge_radius_on_small_grid_is_zero() {
        let input = IntensityGrid::filled(8, 8, 100);
        for radius in [1 << 20, usize::MAX / 2, usize::MAX] {
            let engine = ForceFieldTransform::new(radius);
            let out = engine.apply(&input);
            assert_eq!(out.dimensions(), (8, 8));
            assert!(out.as_slice().iter().all(|&v| v == 0));
            assert!(engine.kernel().is_none());
        }
        assert!(force_field_transform(&input, 1 << 20)
            .as_slice()
            .iter()
            .all(|&v| v == 0));
    }

    #[test]
    fn test_kernel_built_on_first_interior_grid() {
        let engine = ForceFieldTransform::new(2);
        engine.apply(&IntensityGrid::filled(4, 4, 1));
        assert!(engine.kernel().is_none());
        engine.apply(&ramp(6, 6));
        assert_eq!(engine.kernel().map(|k| k.radius()), Some(2));
    }

    #[test]
    fn test_zero_radius_yields_zero_grid() {
        let out = force_field_transform(&ramp(8, 8), 0);
        assert!(out.as_slice().iter().all(|&v| v == 0));
    }

    #[test]
    fn test_from_config() {
        let config = PipelineConfig {
            radius: 4,
            neighbor_policy: NeighborPolicy::AllButCenter,
            parallel: false,
            ..PipelineConfig::default()
        };
        let engine = ForceFieldTransform::from_config(&config);
        assert_eq!(engine.radius(), 4);
        assert_eq!(engine.neighbors(), NeighborPolicy::AllButCenter);
        assert!(!engine.is_parallel());
    }
}
