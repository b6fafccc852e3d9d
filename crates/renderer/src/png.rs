//! PNG encoding for rendered heatmaps.
//!
//! Two encodings are produced:
//! - **Indexed PNG (color type 3)** when the image has at most 256 unique
//!   colors. Heatmaps drawn from a stepped gradient usually qualify.
//! - **RGBA PNG (color type 6)** otherwise.
//!
//! Use [`encode_surface`] or [`encode_auto`] for automatic selection.

use std::collections::HashMap;
use std::io::Write;

use rayon::prelude::*;

use crate::surface::RasterSurface;
use heatmap_common::{HeatmapError, HeatmapResult};

const PNG_SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

/// Encode a rendered surface, choosing the smallest suitable format.
pub fn encode_surface(surface: &RasterSurface) -> HeatmapResult<Vec<u8>> {
    encode_auto(
        surface.pixels(),
        surface.width() as usize,
        surface.height() as usize,
    )
}

/// Encode RGBA pixels as indexed PNG if the palette fits, RGBA otherwise.
pub fn encode_auto(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let palette = if pixels.len() / 4 >= PARALLEL_THRESHOLD {
        Palette::extract_parallel(pixels)
    } else {
        Palette::extract(pixels)
    };

    match palette {
        Some(palette) => {
            tracing::trace!(colors = palette.colors.len(), "Encoding indexed PNG");
            encode_indexed(width, height, &palette.colors, &palette.indices)
        }
        None => encode_rgba(pixels, width, height),
    }
}

/// Encode RGBA pixel data (color type 6).
pub fn encode_rgba(pixels: &[u8], width: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    check_len(pixels.len(), width, height, 4)?;

    let mut png = Vec::with_capacity(pixels.len() / 2 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_RGBA));
    write_chunk(&mut png, b"IDAT", &deflate_scanlines(pixels, width * 4, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

/// Encode palette indices (color type 3), adding tRNS when any palette
/// entry is not fully opaque.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> HeatmapResult<Vec<u8>> {
    check_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(HeatmapError::EncodeError(format!(
            "palette must have 1..=256 entries, got {}",
            palette.len()
        )));
    }

    let mut png = Vec::with_capacity(indices.len() / 2 + palette.len() * 4 + 64);
    png.extend_from_slice(&PNG_SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, COLOR_TYPE_INDEXED));

    let plte: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();
    write_chunk(&mut png, b"PLTE", &plte);

    if palette.iter().any(|c| c[3] < 255) {
        let trns: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        write_chunk(&mut png, b"tRNS", &trns);
    }

    write_chunk(&mut png, b"IDAT", &deflate_scanlines(indices, width, height)?);
    write_chunk(&mut png, b"IEND", &[]);
    Ok(png)
}

fn check_len(len: usize, width: usize, height: usize, bytes_per_pixel: usize) -> HeatmapResult<()> {
    if width == 0 || height == 0 {
        return Err(HeatmapError::EncodeError(format!(
            "cannot encode empty {}x{} image",
            width, height
        )));
    }
    let expected = width * height * bytes_per_pixel;
    if len != expected {
        return Err(HeatmapError::EncodeError(format!(
            "buffer has {} bytes, expected {} for {}x{}",
            len, expected, width, height
        )));
    }
    Ok(())
}

fn ihdr(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut data = [0u8; 13];
    data[0..4].copy_from_slice(&(width as u32).to_be_bytes());
    data[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    data[8] = 8; // bit depth
    data[9] = color_type;
    // compression, filter and interlace methods stay 0
    data
}

/// Write a PNG chunk: length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Prefix each scanline with filter type 0 (none) and zlib-compress.
fn deflate_scanlines(data: &[u8], row_bytes: usize, height: usize) -> HeatmapResult<Vec<u8>> {
    let mut uncompressed = Vec::with_capacity(height * (1 + row_bytes));
    for row in data.chunks_exact(row_bytes) {
        uncompressed.push(0);
        uncompressed.extend_from_slice(row);
    }

    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(&uncompressed)
        .and_then(|_| encoder.finish())
        .map_err(|e| HeatmapError::EncodeError(format!("IDAT compression failed: {}", e)))
}

/// Pack RGBA bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(px: &[u8]) -> u32 {
    u32::from_le_bytes([px[0], px[1], px[2], px[3]])
}

/// Palette and per-pixel indices of an image with few colors.
struct Palette {
    colors: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

impl Palette {
    /// Sequential extraction; `None` when there are more than 256 colors.
    fn extract(pixels: &[u8]) -> Option<Self> {
        let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
        let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
        let mut indices = Vec::with_capacity(pixels.len() / 4);

        for px in pixels.chunks_exact(4) {
            let packed = pack_color(px);
            let index = match lookup.get(&packed) {
                Some(&idx) => idx,
                None => {
                    if colors.len() >= MAX_PALETTE_SIZE {
                        return None;
                    }
                    let idx = colors.len() as u8;
                    colors.push(packed.to_le_bytes());
                    lookup.insert(packed, idx);
                    idx
                }
            };
            indices.push(index);
        }

        Some(Self { colors, indices })
    }

    /// Parallel extraction for larger images: collect unique colors per
    /// chunk, merge, then map pixels to indices in parallel.
    fn extract_parallel(pixels: &[u8]) -> Option<Self> {
        let chunk_size = (pixels.len() / 4 / rayon::current_num_threads()).max(256) * 4;

        let unique: Vec<u32> = pixels
            .par_chunks(chunk_size)
            .flat_map_iter(|chunk| {
                let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
                for px in chunk.chunks_exact(4) {
                    local.insert(pack_color(px), ());
                    // Early exit if we definitely have too many colors
                    if local.len() > MAX_PALETTE_SIZE {
                        break;
                    }
                }
                local.into_keys()
            })
            .collect();

        let mut lookup: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
        let mut colors = Vec::with_capacity(MAX_PALETTE_SIZE);
        for packed in unique {
            if lookup.contains_key(&packed) {
                continue;
            }
            if colors.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            lookup.insert(packed, colors.len() as u8);
            colors.push(packed.to_le_bytes());
        }

        let indices = pixels
            .par_chunks_exact(4)
            .map(|px| lookup.get(&pack_color(px)).copied().unwrap_or(0))
            .collect();

        Some(Self { colors, indices })
    }
}
