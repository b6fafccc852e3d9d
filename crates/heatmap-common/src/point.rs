//! Weighted points fed to the rasterizer.

use serde::{Deserialize, Serialize};

/// A weighted sample at an already-projected pixel position.
///
/// Serialized as a `[x, y, value]` triple.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 3]", into = "[f64; 3]")]
pub struct Point {
    pub x: f64,
    pub y: f64,
    pub value: f64,
}

/// Ordered sequence of points. Render order follows the sequence.
pub type PointSet = Vec<Point>;

impl Point {
    pub fn new(x: f64, y: f64, value: f64) -> Self {
        Self { x, y, value }
    }

    /// True when all three components are finite numbers.
    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.value.is_finite()
    }
}

impl From<[f64; 3]> for Point {
    fn from([x, y, value]: [f64; 3]) -> Self {
        Self { x, y, value }
    }
}

impl From<Point> for [f64; 3] {
    fn from(p: Point) -> Self {
        [p.x, p.y, p.value]
    }
}
