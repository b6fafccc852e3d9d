//! Colorization pass: maps accumulated alpha through the gradient tables.

use crate::gradient::{GradientLut, GRADIENT_LEVELS};
use crate::surface::RasterSurface;
use rayon::prelude::*;

/// Minimum pixels before rows are colorized in parallel
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

/// Recolor every pixel of `surface` from its alpha channel.
///
/// For a pixel with alpha `a8`, the normalized density is `a8 / 256` and
/// the table index `floor(density * 255)`, so a fully opaque pixel reads
/// entry 254, never 255. `is_in_range(density)` selects the table; RGB is
/// overwritten from the entry and alpha becomes
/// `a8 * opacity * entry.a / 255`.
pub fn colorize<P>(
    surface: &mut RasterSurface,
    in_range: &GradientLut,
    out_of_range: &GradientLut,
    is_in_range: P,
    opacity: f64,
) where
    P: Fn(f64) -> bool + Sync,
{
    let row_bytes = surface.width() as usize * 4;
    let pixel_count = surface.pixels().len() / 4;
    if pixel_count == 0 {
        return;
    }

    let pixels = surface.pixels_mut();
    let shade_row = |row: &mut [u8]| {
        for px in row.chunks_exact_mut(4) {
            shade_pixel(px, in_range, out_of_range, &is_in_range, opacity);
        }
    };

    if pixel_count >= PARALLEL_THRESHOLD {
        pixels.par_chunks_mut(row_bytes).for_each(shade_row);
    } else {
        pixels.chunks_mut(row_bytes).for_each(shade_row);
    }
}

#[inline(always)]
fn shade_pixel<P>(
    px: &mut [u8],
    in_range: &GradientLut,
    out_of_range: &GradientLut,
    is_in_range: &P,
    opacity: f64,
) where
    P: Fn(f64) -> bool,
{
    let a8 = px[3];
    let alpha = lut_position(a8);
    let offset = (alpha * (GRADIENT_LEVELS - 1) as f64).floor() as usize;
    let table = if is_in_range(alpha) { in_range } else { out_of_range };
    let c = table.entry(offset);

    px[0] = c.r;
    px[1] = c.g;
    px[2] = c.b;
    // Saturating cast keeps garbage-in opacity from wrapping.
    px[3] = (a8 as f64 * opacity * (c.a as f64 / 255.0)).round() as u8;
}

/// Normalized density of an 8-bit alpha, in [0, 255/256].
///
/// Divides by 256 rather than 255; existing heatmaps depend on the
/// resulting table indices, so this stays as is.
#[inline(always)]
pub fn lut_position(a8: u8) -> f64 {
    a8 as f64 / 256.0
}
