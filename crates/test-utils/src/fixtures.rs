//! Common test fixtures for heatmap tests.
//!
//! Color functions here are plain closures, which the renderer accepts
//! anywhere it takes a color function.

use std::io::Write;

use heatmap_common::{Color, VisualState};

/// Common surface sizes for testing.
pub mod sizes {
    /// Single pixel
    pub const PIXEL: (u32, u32) = (1, 1);

    /// Smallest surface that still holds a whole unblurred brush
    pub const SMALL: (u32, u32) = (40, 40);

    /// A typical map tile
    pub const TILE: (u32, u32) = (256, 256);

    /// Zero-width surface
    pub const EMPTY: (u32, u32) = (0, 64);
}

/// Color function returning `color` for both states at every position.
pub fn solid_color(color: Color) -> impl Fn(VisualState, f64, &mut Color) {
    move |_, _, out| *out = color
}

/// Opaque gray ramp for in-range, transparent for out-of-range.
///
/// The gray level is `round(position * 255)`, so table entry `i` has all
/// channels equal to `i`.
pub fn grayscale_ramp() -> impl Fn(VisualState, f64, &mut Color) {
    |state, position, out| {
        *out = match state {
            VisualState::InRange => {
                let v = (position * 255.0).round() as u8;
                Color::new(v, v, v, 255)
            }
            VisualState::OutOfRange => Color::transparent(),
        }
    }
}

/// Distinct solid colors per state: blue in range, red out of range.
pub fn two_state_colors() -> impl Fn(VisualState, f64, &mut Color) {
    |state, _, out| {
        *out = match state {
            VisualState::InRange => Color::new(0, 0, 255, 255),
            VisualState::OutOfRange => Color::new(255, 0, 0, 255),
        }
    }
}

/// Style document with two styles: `density` (blue to red, full range)
/// and `hotspots` (restricted range, gray out-of-range, custom blur).
pub const SAMPLE_STYLE_JSON: &str = r##"{
  "version": "1.0",
  "styles": {
    "density": {
      "name": "Density",
      "description": "Blue to red over the full value range",
      "min": 0.0,
      "max": 10.0,
      "in_range": [
        { "position": 0.0, "color": "#0000FF" },
        { "position": 0.5, "color": "#00FF00", "label": "mid" },
        { "position": 1.0, "color": "#FF0000" }
      ]
    },
    "hotspots": {
      "name": "Hotspots",
      "min": 0.0,
      "max": 1.0,
      "range": [0.5, 1.0],
      "in_range": [
        { "position": 0.0, "color": "#FFFF00" },
        { "position": 1.0, "color": "#FF000080" }
      ],
      "out_of_range": [
        { "position": 0.0, "color": "#80808040" }
      ],
      "blur_size": 10,
      "opacity": 0.75
    }
  }
}"##;

/// Write `contents` to a named temporary file that lives as long as the
/// returned handle.
pub fn write_temp_file(suffix: &str, contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(suffix)
        .tempfile()
        .expect("Failed to create temporary test file");
    file.write_all(contents.as_bytes())
        .expect("Failed to write temporary test file");
    file
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grayscale_ramp() {
        let f = grayscale_ramp();
        let mut c = Color::transparent();
        f(VisualState::InRange, 1.0, &mut c);
        assert_eq!(c, Color::new(255, 255, 255, 255));
        f(VisualState::InRange, 10.0 / 255.0, &mut c);
        assert_eq!(c.r, 10);
        f(VisualState::OutOfRange, 0.5, &mut c);
        assert_eq!(c, Color::transparent());
    }

    #[test]
    fn test_solid_color() {
        let f = solid_color(Color::new(1, 2, 3, 4));
        let mut c = Color::transparent();
        f(VisualState::OutOfRange, 0.7, &mut c);
        assert_eq!(c, Color::new(1, 2, 3, 4));
    }

    #[test]
    fn test_write_temp_file() {
        let file = write_temp_file(".json", "[]");
        assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "[]");
        assert!(file.path().to_string_lossy().ends_with(".json"));
    }
}
