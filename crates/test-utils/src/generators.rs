//! Test data generators for creating synthetic heatmap inputs.
//!
//! These generators create predictable, verifiable point sets and pixel
//! buffers that can be used across the test suite.

use heatmap_common::Point;

/// Creates a regular grid of points with a constant value.
///
/// Points are placed at `(offset + col * spacing, offset + row * spacing)`
/// in row-major order.
///
/// # Example
///
/// ```
/// use test_utils::create_point_grid;
///
/// let points = create_point_grid(3, 2, 10.0, 5.0, 1.0);
/// assert_eq!(points.len(), 6);
/// assert_eq!((points[1].x, points[1].y), (15.0, 5.0));
/// assert_eq!((points[3].x, points[3].y), (5.0, 15.0));
/// ```
pub fn create_point_grid(cols: usize, rows: usize, spacing: f64, offset: f64, value: f64) -> Vec<Point> {
    let mut points = Vec::with_capacity(cols * rows);
    for row in 0..rows {
        for col in 0..cols {
            points.push(Point::new(
                offset + col as f64 * spacing,
                offset + row as f64 * spacing,
                value,
            ));
        }
    }
    points
}

/// Creates `count` points spiralling out from `(cx, cy)`.
///
/// Values fall off linearly from 1 at the centre to 0 at `max_radius`,
/// giving a dense core and a sparse rim.
pub fn create_cluster(cx: f64, cy: f64, count: usize, max_radius: f64) -> Vec<Point> {
    // Golden angle keeps successive points evenly spread.
    const GOLDEN_ANGLE: f64 = 2.399_963_229_728_653;

    (0..count)
        .map(|i| {
            let t = if count > 1 { i as f64 / (count - 1) as f64 } else { 0.0 };
            let radius = max_radius * t.sqrt();
            let angle = i as f64 * GOLDEN_ANGLE;
            Point::new(cx + radius * angle.cos(), cy + radius * angle.sin(), 1.0 - t)
        })
        .collect()
}

/// Creates pseudo-random points over a `width x height` area.
///
/// Uses a simple hash-based approach for reproducibility. Values lie in
/// [0, 1).
pub fn create_scattered_points(width: f64, height: f64, count: usize, seed: u32) -> Vec<Point> {
    (0..count as u32)
        .map(|i| {
            let hx = simple_hash(i, 0, seed);
            let hy = simple_hash(i, 1, seed);
            let hv = simple_hash(i, 2, seed);
            Point::new(
                unit(hx) * width,
                unit(hy) * height,
                unit(hv),
            )
        })
        .collect()
}

fn unit(hash: u32) -> f64 {
    hash as f64 / (u32::MAX as f64 + 1.0)
}

/// Simple deterministic hash for reproducible test data.
fn simple_hash(x: u32, y: u32, seed: u32) -> u32 {
    let mut h = seed;
    h = h.wrapping_mul(31).wrapping_add(x);
    h = h.wrapping_mul(31).wrapping_add(y);
    h ^= h >> 16;
    h = h.wrapping_mul(0x85ebca6b);
    h ^= h >> 13;
    h = h.wrapping_mul(0xc2b2ae35);
    h ^= h >> 16;
    h
}

/// Creates RGBA pixel data for a smooth test pattern.
///
/// Red follows x, green follows y, so any image wider or taller than 16
/// pixels has more than 256 unique colors.
pub fn create_test_rgba_pixels(width: usize, height: usize) -> Vec<u8> {
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        for x in 0..width {
            let r = ((x as f32 / width as f32) * 255.0) as u8;
            let g = ((y as f32 / height as f32) * 255.0) as u8;
            pixels.extend_from_slice(&[r, g, 128, 255]);
        }
    }
    pixels
}

/// Creates RGBA pixel data with a single hue and `levels` alpha steps.
///
/// Mimics a colorized heatmap from a one-color gradient: transparent at
/// the top, increasingly opaque towards the bottom.
pub fn create_alpha_ramp_pixels(width: usize, height: usize, levels: u8) -> Vec<u8> {
    let levels = levels.max(1) as usize;
    let mut pixels = Vec::with_capacity(width * height * 4);
    for y in 0..height {
        let step = (y * levels / height.max(1)).min(levels - 1);
        let alpha = (step * 255 / levels.saturating_sub(1).max(1)) as u8;
        for _ in 0..width {
            pixels.extend_from_slice(&[255, 64, 0, alpha]);
        }
    }
    pixels
}
