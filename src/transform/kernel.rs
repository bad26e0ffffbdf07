//! Precomputed inverse-square weights for one window radius.

use serde::{Deserialize, Serialize};

/// Which neighbors of the window contribute to the force on the center pixel.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default, clap::ValueEnum,
)]
#[serde(rename_all = "snake_case")]
pub enum NeighborPolicy {
    /// Only neighbors with `dx != 0 && dy != 0`. Same-row and same-column
    /// neighbors are skipped along with the center.
    #[default]
    OffAxis,
    /// Every neighbor except the center pixel.
    AllButCenter,
}

impl NeighborPolicy {
    /// Whether the neighbor at offset `(dx, dy)` contributes.
    #[inline]
    pub fn includes(self, dx: isize, dy: isize) -> bool {
        match self {
            NeighborPolicy::OffAxis => dx != 0 && dy != 0,
            NeighborPolicy::AllButCenter => dx != 0 || dy != 0,
        }
    }
}

impl std::fmt::Display for NeighborPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NeighborPolicy::OffAxis => write!(f, "off-axis"),
            NeighborPolicy::AllButCenter => write!(f, "all-but-center"),
        }
    }
}

/// One contributing neighbor: offset plus `(dx, dy) / |d|^3`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub dx: isize,
    pub dy: isize,
    pub wx: f64,
    pub wy: f64,
}

/// The taps of a `(2r + 1)^2` window, row-major (dy outer, dx inner).
#[derive(Debug, Clone, PartialEq)]
pub struct ForceKernel {
    radius: usize,
    policy: NeighborPolicy,
    taps: Vec<Tap>,
}

impl ForceKernel {
    /// Taps for a `(2r + 1)^2` window.
    ///
    /// Builds `(2r + 1)^2` entries, so callers size `radius` to a grid first;
    /// the transform engine only does so once the window fits.
    pub fn new(radius: usize, policy: NeighborPolicy) -> Self {
        let r = isize::try_from(radius).unwrap_or(isize::MAX);
        let capacity = radius
            .checked_mul(2)
            .and_then(|span| span.checked_add(1))
            .and_then(|side| side.checked_mul(side))
            .unwrap_or(0);
        let mut taps = Vec::with_capacity(capacity);
        for dy in -r..=r {
            for dx in -r..=r {
                if !policy.includes(dx, dy) {
                    continue;
                }
                let (fx, fy) = (dx as f64, dy as f64);
                let dist = (fx * fx + fy * fy).sqrt();
                let inv_cube = 1.0 / (dist * dist * dist);
                taps.push(Tap {
                    dx,
                    dy,
                    wx: fx * inv_cube,
                    wy: fy * inv_cube,
                });
            }
        }
        Self {
            radius,
            policy,
            taps,
        }
    }

    pub fn radius(&self) -> usize {
        self.radius
    }

    pub fn policy(&self) -> NeighborPolicy {
        self.policy
    }

    pub fn taps(&self) -> &[Tap] {
        &self.taps
    }

    /// Taps resolved to linear buffer offsets for a grid of the given width.
    pub(crate) fn linear_taps(&self, width: usize) -> Vec<(isize, f64, f64)> {
        let stride = width as isize;
        self.taps
            .iter()
            .map(|t| (t.dy * stride + t.dx, t.wx, t.wy))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_off_axis_radius_one_is_diagonals() {
        let kernel = ForceKernel::new(1, NeighborPolicy::OffAxis);
        let offsets: Vec<_> = kernel.taps().iter().map(|t| (t.dx, t.dy)).collect();
        assert_eq!(offsets, vec![(-1, -1), (1, -1), (-1, 1), (1, 1)]);
    }

    #[test]
    fn test_tap_counts() {
        // (2r+1)^2 - 1 for all-but-center, (2r)^2 for off-axis
        for r in 1..6 {
            let all = ForceKernel::new(r, NeighborPolicy::AllButCenter);
            let off = ForceKernel::new(r, NeighborPolicy::OffAxis);
            assert_eq!(all.taps().len(), (2 * r + 1).pow(2) - 1);
            assert_eq!(off.taps().len(), (2 * r).pow(2));
        }
    }

    #[test]
    fn test_center_never_included() {
        for policy in [NeighborPolicy::OffAxis, NeighborPolicy::AllButCenter] {
            let kernel = ForceKernel::new(4, policy);
            assert!(kernel.taps().iter().all(|t| (t.dx, t.dy) != (0, 0)));
            assert!(kernel.taps().iter().all(|t| t.wx.is_finite() && t.wy.is_finite()));
        }
    }

    #[test]
    fn test_inverse_square_weight() {
        let kernel = ForceKernel::new(2, NeighborPolicy::AllButCenter);
        let tap = kernel
            .taps()
            .iter()
            .find(|t| (t.dx, t.dy) == (2, 0))
            .unwrap();
        // (2, 0) / 2^3 = (0.25, 0)
        assert!((tap.wx - 0.25).abs() < 1e-12);
        assert_eq!(tap.wy, 0.0);
    }

    #[test]
    fn test_weights_cancel_over_window() {
        let kernel = ForceKernel::new(3, NeighborPolicy::OffAxis);
        let sx: f64 = kernel.taps().iter().map(|t| t.wx).sum();
        let sy: f64 = kernel.taps().iter().map(|t| t.wy).sum();
        assert!(sx.abs() < 1e-12 && sy.abs() < 1e-12);
    }

    #[test]
    fn test_linear_taps() {
        let kernel = ForceKernel::new(1, NeighborPolicy::OffAxis);
        let linear: Vec<isize> = kernel.linear_taps(10).iter().map(|t| t.0).collect();
        assert_eq!(linear, vec![-11, -9, 9, 11]);
    }

    #[test]
    fn test_zero_radius_is_empty() {
        assert!(ForceKernel::new(0, NeighborPolicy::AllButCenter).taps().is_empty());
    }
}
