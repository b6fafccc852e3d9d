//! Blurred circular brush stamped once per heatmap point.
//!
//! The brush is an alpha-only mask: a circle of radius [`BRUSH_SIZE`] whose
//! edge is softened outward by the blur size, centered in a square of side
//! `2 * (BRUSH_SIZE + blur_size)`. The sharp circle itself never appears;
//! only its blurred profile is sampled, the same way a canvas drop shadow
//! renders a blurred silhouette of an off-screen shape.

use heatmap_common::{HeatmapError, HeatmapResult};

/// Radius of the unblurred brush circle in pixels.
pub const BRUSH_SIZE: i32 = 20;

/// Radius of the brush bounding box for a given blur size.
pub fn brush_radius(blur_size: i32) -> HeatmapResult<u32> {
    let radius = BRUSH_SIZE
        .checked_add(blur_size)
        .ok_or(HeatmapError::InvalidBlurSize(blur_size))?;
    u32::try_from(radius).map_err(|_| HeatmapError::InvalidBlurSize(blur_size))
}

/// A square alpha mask, `side = 2 * radius` pixels on each edge.
#[derive(Debug, Clone, PartialEq)]
pub struct BrushMask {
    blur_size: i32,
    radius: u32,
    alphas: Vec<u8>,
}

impl BrushMask {
    /// Render the brush for `blur_size`.
    ///
    /// Fails with [`HeatmapError::InvalidBlurSize`] when `20 + blur_size`
    /// is negative.
    pub fn build(blur_size: i32) -> HeatmapResult<Self> {
        brush_radius(blur_size)?;
        Ok(Self::render(blur_size))
    }

    /// Render without validation, clamping a negative radius to zero.
    pub(crate) fn render(blur_size: i32) -> Self {
        let radius = BRUSH_SIZE.saturating_add(blur_size).max(0) as u32;
        let side = radius as usize * 2;
        let center = radius as f64;
        let profile = Falloff::new(blur_size, center);

        let mut alphas = vec![0u8; side * side];
        for (j, row) in alphas.chunks_exact_mut(side.max(1)).enumerate() {
            let dy = j as f64 + 0.5 - center;
            for (i, alpha) in row.iter_mut().enumerate() {
                let dx = i as f64 + 0.5 - center;
                let coverage = profile.at(dx.hypot(dy));
                *alpha = (coverage * 255.0).round() as u8;
            }
        }

        tracing::trace!(blur_size, radius, side, "Built brush mask");

        Self {
            blur_size,
            radius,
            alphas,
        }
    }

    pub fn blur_size(&self) -> i32 {
        self.blur_size
    }

    /// Half the side length; the stamp is drawn at `(x - radius, y - radius)`.
    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn side(&self) -> usize {
        self.radius as usize * 2
    }

    /// Alpha at mask pixel `(i, j)`, or `None` outside the mask.
    pub fn alpha_at(&self, i: usize, j: usize) -> Option<u8> {
        let side = self.side();
        if i >= side || j >= side {
            return None;
        }
        Some(self.alphas[j * side + i])
    }

    /// Row-major alpha values, `side * side` long.
    pub fn alphas(&self) -> &[u8] {
        &self.alphas
    }
}

/// Radial coverage profile of the blurred circle.
struct Falloff {
    /// Gaussian standard deviation; 0 for an unblurred disk.
    sigma: f64,
    /// Distance at which coverage reaches zero.
    cutoff: f64,
    /// Unnormalized edge value at the center and at the cutoff.
    peak: f64,
    floor: f64,
}

impl Falloff {
    fn new(blur_size: i32, cutoff: f64) -> Self {
        // Canvas shadow blur uses a Gaussian with sigma = blur / 2.
        let sigma = if blur_size > 0 { blur_size as f64 / 2.0 } else { 0.0 };
        let mut falloff = Self {
            sigma,
            cutoff,
            peak: 1.0,
            floor: 0.0,
        };
        if sigma > 0.0 {
            falloff.peak = falloff.edge(0.0);
            falloff.floor = falloff.edge(cutoff);
        }
        falloff
    }

    /// Edge profile of a circle convolved with a Gaussian, approximated by
    /// the blurred half-plane at the circle's radius.
    fn edge(&self, distance: f64) -> f64 {
        let z = (distance - BRUSH_SIZE as f64) / (self.sigma * std::f64::consts::SQRT_2);
        0.5 * erfc(z)
    }

    fn at(&self, distance: f64) -> f64 {
        if distance >= self.cutoff {
            return 0.0;
        }
        if self.sigma == 0.0 {
            // 1px anti-aliased hard edge
            return (BRUSH_SIZE as f64 - distance).clamp(0.0, 1.0);
        }
        let range = self.peak - self.floor;
        if range <= 0.0 {
            return 0.0;
        }
        ((self.edge(distance) - self.floor) / range).clamp(0.0, 1.0)
    }
}

/// Complementary error function (Abramowitz & Stegun 7.1.26, |ε| < 1.5e-7).
fn erfc(x: f64) -> f64 {
    const P: f64 = 0.327_591_1;
    const A: [f64; 5] = [
        0.254_829_592,
        -0.284_496_736,
        1.421_413_741,
        -1.453_152_027,
        1.061_405_429,
    ];

    let ax = x.abs();
    let t = 1.0 / (1.0 + P * ax);
    let poly = t * (A[0] + t * (A[1] + t * (A[2] + t * (A[3] + t * A[4]))));
    let tail = poly * (-ax * ax).exp();
    if x >= 0.0 {
        tail
    } else {
        2.0 - tail
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_brush_radius() {
        assert_eq!(brush_radius(30).unwrap(), 50);
        assert_eq!(brush_radius(0).unwrap(), 20);
        assert_eq!(brush_radius(-20).unwrap(), 0);
        assert!(matches!(
            brush_radius(-21),
            Err(HeatmapError::InvalidBlurSize(-21))
        ));
    }

    #[test]
    fn test_erfc_reference_values() {
        assert!((erfc(0.0) - 1.0).abs() < 1e-6);
        assert!((erfc(1.0) - 0.157_299_2).abs() < 1e-6);
        assert!((erfc(-1.0) - 1.842_700_8).abs() < 1e-6);
        assert!(erfc(6.0) < 1e-9);
    }

    #[test]
    fn test_mask_dimensions() {
        let mask = BrushMask::build(30).unwrap();
        assert_eq!(mask.radius(), 50);
        assert_eq!(mask.side(), 100);
        assert_eq!(mask.alphas().len(), 100 * 100);
        assert_eq!(mask.alpha_at(100, 0), None);
    }

    #[test]
    fn test_render_clamps_negative_radius() {
        let mask = BrushMask::render(-500);
        assert_eq!(mask.radius(), 0);
        assert!(mask.alphas().is_empty());
    }

    #[test]
    fn test_zero_radius_mask_is_empty() {
        let mask = BrushMask::build(-20).unwrap();
        assert_eq!(mask.side(), 0);
        assert!(mask.alphas().is_empty());
    }

    #[test]
    fn test_center_is_densest() {
        let mask = BrushMask::build(30).unwrap();
        let c = mask.radius() as usize;
        let center = mask.alpha_at(c, c).unwrap();
        assert!(center >= 250, "center alpha {}", center);
        assert_eq!(mask.alphas().iter().max(), Some(&center));
    }

    #[test]
    fn test_unblurred_disk_is_opaque_inside() {
        let mask = BrushMask::build(0).unwrap();
        assert_eq!(mask.alpha_at(20, 20), Some(255));
        assert_eq!(mask.alpha_at(5, 20), Some(255));
        // Corner lies outside the circle
        assert_eq!(mask.alpha_at(0, 0), Some(0));
    }
}
