//! Common types and utilities shared across the heatmap workspace.

pub mod axis;
pub mod color;
pub mod error;
pub mod point;

pub use axis::{Extent, ExtentParseError, LinearAxis};
pub use color::{Color, VisualState};
pub use error::{HeatmapError, HeatmapResult};
pub use point::{Point, PointSet};
