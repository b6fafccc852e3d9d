//! RGBA colors and the two visual states of a heatmap gradient.

use crate::error::{HeatmapError, HeatmapResult};
use serde::{Deserialize, Serialize};

/// Color value in RGBA format, 0-255 per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn transparent() -> Self {
        Self { r: 0, g: 0, b: 0, a: 0 }
    }

    /// Parse `#RRGGBB` or `#RRGGBBAA` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> HeatmapResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if !(digits.len() == 6 || digits.len() == 8) || !digits.is_ascii() {
            return Err(HeatmapError::InvalidColor(hex.to_string()));
        }

        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| HeatmapError::InvalidColor(hex.to_string()))
        };

        let a = if digits.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?, a))
    }

    /// Linear color interpolation, `t` clamped to [0, 1].
    pub fn lerp(self, other: Color, t: f64) -> Color {
        let t = t.clamp(0.0, 1.0);
        let t_inv = 1.0 - t;
        let mix = |a: u8, b: u8| ((a as f64 * t_inv) + (b as f64 * t)) as u8;

        Color::new(
            mix(self.r, other.r),
            mix(self.g, other.g),
            mix(self.b, other.b),
            mix(self.a, other.a),
        )
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<[u8; 4]> for Color {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Self { r, g, b, a }
    }
}

/// Which side of the visible value range a pixel falls on.
///
/// Selects between the two gradient tables of a heatmap.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VisualState {
    InRange,
    OutOfRange,
}

impl VisualState {
    pub const ALL: [VisualState; 2] = [VisualState::InRange, VisualState::OutOfRange];

    pub fn as_str(&self) -> &'static str {
        match self {
            VisualState::InRange => "inRange",
            VisualState::OutOfRange => "outOfRange",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_hex() {
        assert_eq!(Color::from_hex("#FF0000").unwrap(), Color::new(255, 0, 0, 255));
        assert_eq!(Color::from_hex("00FF00").unwrap(), Color::new(0, 255, 0, 255));
        assert_eq!(Color::from_hex("#0000ff80").unwrap(), Color::new(0, 0, 255, 128));
        assert!(Color::from_hex("#GGGGGG").is_err());
        assert!(Color::from_hex("#FFF").is_err());
    }

    #[test]
    fn test_lerp_endpoints_and_midpoint() {
        let black = Color::new(0, 0, 0, 255);
        let white = Color::new(255, 255, 255, 255);
        assert_eq!(black.lerp(white, 0.0), black);
        assert_eq!(black.lerp(white, 1.0), white);
        assert_eq!(black.lerp(white, 0.5), Color::new(127, 127, 127, 255));
        // Out of range t is clamped
        assert_eq!(black.lerp(white, 4.0), white);
    }

    #[test]
    fn test_visual_state_names() {
        assert_eq!(VisualState::InRange.as_str(), "inRange");
        assert_eq!(VisualState::OutOfRange.as_str(), "outOfRange");
        assert_eq!(VisualState::ALL.len(), 2);
    }
}
