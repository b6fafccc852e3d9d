//! Gradient lookup tables for heatmap colorization.
//!
//! A color function is sampled once per table entry at evenly spaced
//! positions in [0, 1]; colorization then indexes the table instead of
//! calling back per pixel.

use heatmap_common::{Color, VisualState};

/// Number of entries in each gradient table.
pub const GRADIENT_LEVELS: usize = 256;

/// Maps a gradient position in [0, 1] to a color, for each visual state.
///
/// `out` is a scratch buffer reused across every sample of a table build,
/// so implementations write into it rather than returning a fresh value.
pub trait ColorFunction {
    fn color_into(&self, state: VisualState, position: f64, out: &mut Color);

    /// Identity of the color mapping for gradient caching.
    ///
    /// Two calls returning the same `Some(key)` promise identical colors.
    /// `None` (the default) rebuilds the tables on every render.
    fn cache_key(&self) -> Option<u64> {
        None
    }
}

impl<F> ColorFunction for F
where
    F: Fn(VisualState, f64, &mut Color),
{
    fn color_into(&self, state: VisualState, position: f64, out: &mut Color) {
        self(state, position, out)
    }
}

/// A 256-entry RGBA lookup table for one visual state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GradientLut {
    entries: [Color; GRADIENT_LEVELS],
}

impl GradientLut {
    /// Sample `colors` for `state` at `i / 255` for every entry `i`.
    pub fn build<C>(colors: &C, state: VisualState) -> Self
    where
        C: ColorFunction + ?Sized,
    {
        let mut entries = [Color::transparent(); GRADIENT_LEVELS];
        let mut scratch = Color::transparent();
        for (i, entry) in entries.iter_mut().enumerate() {
            colors.color_into(state, i as f64 / (GRADIENT_LEVELS - 1) as f64, &mut scratch);
            *entry = scratch;
        }
        Self { entries }
    }

    pub fn entries(&self) -> &[Color; GRADIENT_LEVELS] {
        &self.entries
    }

    /// Entry at `index`, clamped to the last entry.
    #[inline(always)]
    pub fn entry(&self, index: usize) -> Color {
        self.entries[index.min(GRADIENT_LEVELS - 1)]
    }

    /// Flat RGBA bytes, 4 per entry.
    pub fn to_bytes(&self) -> [u8; GRADIENT_LEVELS * 4] {
        let mut bytes = [0u8; GRADIENT_LEVELS * 4];
        for (chunk, c) in bytes.chunks_exact_mut(4).zip(self.entries.iter()) {
            chunk.copy_from_slice(&c.to_array());
        }
        bytes
    }
}

/// Both gradient tables, rebuilt when the color function's key changes.
#[derive(Debug, Clone)]
pub struct GradientCache {
    key: Option<u64>,
    valid: bool,
    in_range: GradientLut,
    out_of_range: GradientLut,
    builds: u64,
}

impl Default for GradientCache {
    fn default() -> Self {
        let empty = GradientLut {
            entries: [Color::transparent(); GRADIENT_LEVELS],
        };
        Self {
            key: None,
            valid: false,
            in_range: empty.clone(),
            out_of_range: empty,
            builds: 0,
        }
    }
}

impl GradientCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Force the next lookup to rebuild both tables.
    pub fn invalidate(&mut self) {
        self.valid = false;
    }

    /// Number of times the tables were (re)built.
    pub fn builds(&self) -> u64 {
        self.builds
    }

    /// Table for `state`, as of the last build.
    pub fn table(&self, state: VisualState) -> &GradientLut {
        match state {
            VisualState::InRange => &self.in_range,
            VisualState::OutOfRange => &self.out_of_range,
        }
    }

    /// Return `(in_range, out_of_range)` tables for `colors`, rebuilding
    /// them unless the cached key matches.
    pub fn tables<C>(&mut self, colors: &C) -> (&GradientLut, &GradientLut)
    where
        C: ColorFunction + ?Sized,
    {
        let key = colors.cache_key();
        let reusable = self.valid && key.is_some() && key == self.key;
        if !reusable {
            self.in_range = GradientLut::build(colors, VisualState::InRange);
            self.out_of_range = GradientLut::build(colors, VisualState::OutOfRange);
            self.key = key;
            self.valid = true;
            self.builds += 1;
            tracing::trace!(cache_key = ?key, builds = self.builds, "Rebuilt gradient tables");
        }
        (&self.in_range, &self.out_of_range)
    }
}
