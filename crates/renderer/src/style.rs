//! Visual-map styles: value normalization, visible range and color stops.

use std::collections::hash_map::DefaultHasher;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::gradient::ColorFunction;
use crate::heatmap::HeatmapConfig;
use heatmap_common::{Color, HeatmapError, HeatmapResult, VisualState};

/// Style configuration loaded from JSON
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StyleConfig {
    #[serde(default = "default_version")]
    pub version: String,
    pub styles: HashMap<String, VisualMapStyle>,
}

fn default_version() -> String {
    "1.0".to_string()
}

/// A single visual-map style
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct VisualMapStyle {
    pub name: String,
    pub description: Option<String>,
    /// Data value mapped to density 0
    pub min: f64,
    /// Data value mapped to density 1
    pub max: f64,
    /// Visible value range in data units; everything is in range when unset
    #[serde(default)]
    pub range: Option<[f64; 2]>,
    pub in_range: Vec<ColorStop>,
    /// Colors for densities outside `range`; transparent when empty
    #[serde(default)]
    pub out_of_range: Vec<ColorStop>,
    #[serde(default)]
    pub blur_size: Option<i32>,
    #[serde(default)]
    pub opacity: Option<f64>,
}

/// Color stop for gradient, `position` in [0, 1]
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ColorStop {
    pub position: f64,
    pub color: String,
    pub label: Option<String>,
}

impl StyleConfig {
    /// Load style configuration from JSON string
    pub fn from_json(json_str: &str) -> HeatmapResult<Self> {
        Ok(serde_json::from_str(json_str)?)
    }

    /// Load style configuration from file
    pub fn from_file(path: impl AsRef<Path>) -> HeatmapResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Get a specific style definition
    pub fn get_style(&self, name: &str) -> Option<&VisualMapStyle> {
        self.styles.get(name)
    }

    /// Get and compile a style, failing if it is missing or invalid.
    pub fn compile_style(&self, name: &str) -> HeatmapResult<VisualMap> {
        self.get_style(name)
            .ok_or_else(|| HeatmapError::StyleNotFound(name.to_string()))?
            .compile()
    }
}

impl VisualMapStyle {
    /// Rasterizer settings, with defaults where the style is silent.
    pub fn heatmap_config(&self) -> HeatmapConfig {
        let defaults = HeatmapConfig::default();
        HeatmapConfig {
            blur_size: self.blur_size.unwrap_or(defaults.blur_size),
            opacity: self.opacity.unwrap_or(defaults.opacity),
        }
    }

    /// Validate the style and parse its colors.
    pub fn compile(&self) -> HeatmapResult<VisualMap> {
        let invalid = |message: String| HeatmapError::InvalidStyle {
            name: self.name.clone(),
            message,
        };

        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(invalid(format!("non-finite value extent [{}, {}]", self.min, self.max)));
        }
        if self.in_range.is_empty() {
            return Err(invalid("in_range needs at least one color stop".to_string()));
        }

        let range = match self.range {
            Some([lo, hi]) if !(lo.is_finite() && hi.is_finite()) || lo > hi => {
                return Err(invalid(format!("invalid visible range [{}, {}]", lo, hi)));
            }
            Some([lo, hi]) => {
                let span = self.max - self.min;
                let norm = |v: f64| if span.abs() < f64::EPSILON { 0.5 } else { (v - self.min) / span };
                Some([norm(lo), norm(hi)])
            }
            None => None,
        };

        let in_range = Stops::parse(&self.in_range).map_err(|e| invalid(e.to_string()))?;
        let out_of_range = Stops::parse(&self.out_of_range).map_err(|e| invalid(e.to_string()))?;

        let mut hasher = DefaultHasher::new();
        self.min.to_bits().hash(&mut hasher);
        self.max.to_bits().hash(&mut hasher);
        in_range.hash(&mut hasher);
        out_of_range.hash(&mut hasher);

        Ok(VisualMap {
            min: self.min,
            max: self.max,
            range,
            in_range,
            out_of_range,
            key: hasher.finish(),
        })
    }
}

/// Sorted, parsed color stops.
#[derive(Debug, Clone, PartialEq)]
struct Stops(Vec<(f64, Color)>);

impl Stops {
    fn parse(stops: &[ColorStop]) -> HeatmapResult<Self> {
        let mut parsed = stops
            .iter()
            .map(|s| {
                if !s.position.is_finite() {
                    return Err(HeatmapError::InvalidColor(format!(
                        "stop position {} for {}",
                        s.position, s.color
                    )));
                }
                Ok((s.position, Color::from_hex(&s.color)?))
            })
            .collect::<HeatmapResult<Vec<_>>>()?;
        parsed.sort_by(|a, b| a.0.total_cmp(&b.0));
        Ok(Self(parsed))
    }

    /// Piecewise-linear color at `t`, clamped to the first and last stop.
    fn sample(&self, t: f64) -> Color {
        let stops = &self.0;
        let (first, last) = match (stops.first(), stops.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Color::transparent(),
        };
        if t <= first.0 {
            return first.1;
        }
        if t >= last.0 {
            return last.1;
        }

        // First stop strictly above t; t > first.0 so the index is >= 1.
        let high = stops.partition_point(|(p, _)| *p <= t);
        let (p0, c0) = stops[high - 1];
        let (p1, c1) = stops[high];
        let span = p1 - p0;
        if span <= 0.0 {
            return c1;
        }
        c0.lerp(c1, (t - p0) / span)
    }
}

impl Hash for Stops {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for (p, c) in &self.0 {
            p.to_bits().hash(state);
            c.hash(state);
        }
    }
}

/// A compiled visual map, usable directly as the rasterizer's callbacks.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualMap {
    min: f64,
    max: f64,
    range: Option<[f64; 2]>,
    in_range: Stops,
    out_of_range: Stops,
    key: u64,
}

impl VisualMap {
    /// Point value to stamp alpha: linear over `[min, max]`, clamped to [0, 1].
    pub fn normalize(&self, value: f64) -> f64 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((value - self.min) / span).clamp(0.0, 1.0)
    }

    /// Whether an accumulated density lies within the visible range.
    pub fn is_in_range(&self, density: f64) -> bool {
        match self.range {
            Some([lo, hi]) => density >= lo && density <= hi,
            None => true,
        }
    }

    /// Visible range in normalized density units, if restricted.
    pub fn normalized_range(&self) -> Option<[f64; 2]> {
        self.range
    }
}

impl ColorFunction for VisualMap {
    fn color_into(&self, state: VisualState, position: f64, out: &mut Color) {
        *out = match state {
            VisualState::InRange => self.in_range.sample(position),
            VisualState::OutOfRange => self.out_of_range.sample(position),
        };
    }

    fn cache_key(&self) -> Option<u64> {
        Some(self.key)
    }
}
