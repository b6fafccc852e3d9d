//! RGBA raster surface the heatmap is painted into.

use crate::brush::BrushMask;
use heatmap_common::Color;

/// A `width x height` grid of non-premultiplied RGBA8 pixels, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterSurface {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl RasterSurface {
    /// Create a fully transparent surface.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0u8; width as usize * height as usize * 4],
        }
    }

    /// Resize the surface, discarding all prior contents.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.width = width;
        self.height = height;
        self.pixels.clear();
        self.pixels.resize(width as usize * height as usize * 4, 0);
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = (y as usize * self.width as usize + x as usize) * 4;
        let px = &self.pixels[idx..idx + 4];
        Some(Color::new(px[0], px[1], px[2], px[3]))
    }

    /// Raw RGBA bytes, 4 per pixel.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn pixels_mut(&mut self) -> &mut [u8] {
        &mut self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Composite a black `stamp` with its top-left corner at `(x, y)`.
    ///
    /// Each stamp pixel contributes source alpha `mask_alpha * alpha`,
    /// blended with the "over" operator. Portions of the stamp outside the
    /// surface are clipped. Returns `false` when nothing was touched.
    pub fn composite_stamp(&mut self, stamp: &BrushMask, x: i64, y: i64, alpha: f64) -> bool {
        let side = stamp.side() as i64;
        let x0 = x.max(0);
        let y0 = y.max(0);
        let x1 = x.saturating_add(side).min(self.width as i64);
        let y1 = y.saturating_add(side).min(self.height as i64);
        if x0 >= x1 || y0 >= y1 {
            return false;
        }

        let width = self.width as usize;
        let mask = stamp.alphas();
        for sy in y0..y1 {
            let mask_row = (sy - y) as usize * side as usize;
            let row = sy as usize * width;
            for sx in x0..x1 {
                let mask_alpha = mask[mask_row + (sx - x) as usize];
                if mask_alpha == 0 {
                    continue;
                }
                // Saturating cast: NaN becomes 0, overshoot becomes 255.
                let src_a = (mask_alpha as f64 * alpha).round() as u8;
                let idx = (row + sx as usize) * 4;
                blend_black_over(&mut self.pixels[idx..idx + 4], src_a);
            }
        }
        true
    }
}

/// Source-over of an opaque-black source with alpha `src_a` onto `dst`.
#[inline(always)]
fn blend_black_over(dst: &mut [u8], src_a: u8) {
    if src_a == 0 {
        return;
    }
    let sa = src_a as u32;
    let da = dst[3] as u32;
    // Destination weight in the result: da * (1 - sa), on a 0..=255 scale.
    let dst_weight = div255(da * (255 - sa));
    let out_a = sa + dst_weight;

    for c in &mut dst[..3] {
        // Black source contributes nothing to the color sum.
        *c = if out_a == 0 {
            0
        } else {
            ((*c as u32 * dst_weight + out_a / 2) / out_a) as u8
        };
    }
    dst[3] = out_a as u8;
}

/// Exact rounded division by 255 for values up to 255 * 255.
#[inline(always)]
fn div255(v: u32) -> u32 {
    let v = v + 128;
    (v + (v >> 8)) >> 8
}
