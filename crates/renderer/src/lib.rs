//! Density heatmap rendering.
//!
//! Rendering runs in two passes over one RGBA surface:
//! - Accumulation: every point is stamped as a blurred black circle whose
//!   alpha is the point's normalized value, building a density field in the
//!   alpha channel.
//! - Colorization: each pixel's density selects an entry from a 256-entry
//!   gradient table, in range or out of range.
//!
//! [`HeatmapRasterizer`] drives both passes and caches the brush and
//! gradient tables between renders.

pub mod accumulate;
pub mod brush;
pub mod colorize;
pub mod gradient;
pub mod heatmap;
pub mod png;
pub mod style;
pub mod surface;

pub use brush::{BrushMask, BRUSH_SIZE};
pub use gradient::{ColorFunction, GradientCache, GradientLut, GRADIENT_LEVELS};
pub use heatmap::{HeatmapConfig, HeatmapRasterizer, DEFAULT_BLUR_SIZE, DEFAULT_OPACITY};
pub use style::{ColorStop, StyleConfig, VisualMap, VisualMapStyle};
pub use surface::RasterSurface;
