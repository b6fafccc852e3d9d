//! Point splatting: builds the density field in the surface alpha channel.

use crate::brush::BrushMask;
use crate::surface::RasterSurface;
use heatmap_common::Point;

/// Stamp `brush` once per point, centered on the point, in input order.
///
/// Each stamp's alpha is `normalize(point.value)`; the result is not
/// re-clamped here, so `normalize` is expected to stay within [0, 1].
/// Stamp positions are snapped to the nearest whole pixel. Returns the
/// number of stamps that touched the surface.
pub fn paint<N>(surface: &mut RasterSurface, points: &[Point], brush: &BrushMask, normalize: N) -> usize
where
    N: Fn(f64) -> f64,
{
    let r = brush.radius() as f64;
    let mut painted = 0;

    for p in points {
        let alpha = normalize(p.value);
        let x = (p.x - r).round();
        let y = (p.y - r).round();
        // Non-finite positions cannot land on the surface.
        if !x.is_finite() || !y.is_finite() {
            continue;
        }
        if surface.composite_stamp(brush, x as i64, y as i64, alpha) {
            painted += 1;
        }
    }

    painted
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stamp_is_centered_on_point() {
        let brush = BrushMask::build(0).unwrap();
        let mut surface = RasterSurface::new(100, 100);
        paint(&mut surface, &[Point::new(50.0, 50.0, 1.0)], &brush, |v| v);

        // Symmetric around (50, 50): pixel 50 + k mirrors pixel 49 - k
        for k in 0..25 {
            let right = surface.pixel(50 + k, 50).unwrap().a;
            let left = surface.pixel(49 - k, 50).unwrap().a;
            assert_eq!(right, left, "k = {}", k);
        }
        assert_eq!(surface.pixel(50, 50).unwrap().a, 255);
        assert_eq!(surface.pixel(50, 75).unwrap().a, 0);
    }

    #[test]
    fn test_zero_alpha_points_leave_surface_untouched() {
        let brush = BrushMask::build(10).unwrap();
        let mut surface = RasterSurface::new(20, 20);
        let painted = paint(&mut surface, &[Point::new(10.0, 10.0, 5.0)], &brush, |_| 0.0);
        assert_eq!(painted, 1);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_overlapping_points_accumulate() {
        let brush = BrushMask::build(0).unwrap();
        let mut one = RasterSurface::new(40, 40);
        let mut two = RasterSurface::new(40, 40);
        let p = Point::new(20.0, 20.0, 0.25);
        paint(&mut one, &[p], &brush, |v| v);
        paint(&mut two, &[p, p], &brush, |v| v);
        assert!(two.pixel(20, 20).unwrap().a > one.pixel(20, 20).unwrap().a);
    }

    #[test]
    fn test_non_finite_positions_are_skipped() {
        let brush = BrushMask::build(0).unwrap();
        let mut surface = RasterSurface::new(10, 10);
        let points = [Point::new(f64::NAN, 5.0, 1.0), Point::new(5.0, f64::INFINITY, 1.0)];
        assert_eq!(paint(&mut surface, &points, &brush, |v| v), 0);
        assert!(surface.pixels().iter().all(|&b| b == 0));
    }
}
