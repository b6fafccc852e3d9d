//! Heatmap rasterizer: accumulate weighted points, then colorize.

use std::time::Instant;

use serde::{Deserialize, Serialize};

use crate::accumulate;
use crate::brush::{brush_radius, BrushMask};
use crate::colorize;
use crate::gradient::{ColorFunction, GradientCache};
use crate::style::VisualMap;
use crate::surface::RasterSurface;
use heatmap_common::{HeatmapError, HeatmapResult, Point};

/// Default blur added to the brush radius.
pub const DEFAULT_BLUR_SIZE: i32 = 30;

/// Default final alpha multiplier.
pub const DEFAULT_OPACITY: f64 = 1.0;

/// Configuration for heatmap rendering
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeatmapConfig {
    /// Blur added to the 20px brush circle
    pub blur_size: i32,
    /// Final alpha multiplier in [0, 1]
    pub opacity: f64,
}

impl Default for HeatmapConfig {
    fn default() -> Self {
        Self {
            blur_size: DEFAULT_BLUR_SIZE,
            opacity: DEFAULT_OPACITY,
        }
    }
}

impl HeatmapConfig {
    pub fn validate(&self) -> HeatmapResult<()> {
        brush_radius(self.blur_size)?;
        validate_opacity(self.opacity)
    }
}

fn validate_opacity(opacity: f64) -> HeatmapResult<()> {
    if opacity.is_finite() && (0.0..=1.0).contains(&opacity) {
        Ok(())
    } else {
        Err(HeatmapError::InvalidOpacity(opacity))
    }
}

/// Renders weighted points into a colorized density raster.
///
/// The brush mask and gradient tables are cached across renders; they
/// never change the output, only how much work a render repeats. An
/// instance is single-threaded: use one rasterizer per concurrent caller.
#[derive(Debug, Clone)]
pub struct HeatmapRasterizer {
    config: HeatmapConfig,
    brush: Option<BrushMask>,
    gradients: GradientCache,
}

impl Default for HeatmapRasterizer {
    fn default() -> Self {
        Self {
            config: HeatmapConfig::default(),
            brush: None,
            gradients: GradientCache::new(),
        }
    }
}

impl HeatmapRasterizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: HeatmapConfig) -> HeatmapResult<Self> {
        config.validate()?;
        Ok(Self {
            config,
            ..Self::default()
        })
    }

    pub fn config(&self) -> HeatmapConfig {
        self.config
    }

    pub fn blur_size(&self) -> i32 {
        self.config.blur_size
    }

    /// Change the blur size. The brush is rebuilt lazily on the next render.
    pub fn set_blur_size(&mut self, blur_size: i32) -> HeatmapResult<()> {
        brush_radius(blur_size)?;
        self.config.blur_size = blur_size;
        Ok(())
    }

    pub fn opacity(&self) -> f64 {
        self.config.opacity
    }

    pub fn set_opacity(&mut self, opacity: f64) -> HeatmapResult<()> {
        validate_opacity(opacity)?;
        self.config.opacity = opacity;
        Ok(())
    }

    /// Drop the cached gradient tables, e.g. after the series data or the
    /// selected range changed under a keyed color function.
    pub fn invalidate_gradients(&mut self) {
        self.gradients.invalidate();
    }

    /// Number of gradient table builds so far.
    pub fn gradient_builds(&self) -> u64 {
        self.gradients.builds()
    }

    /// Brush for the current blur size, built on first use.
    pub fn brush(&mut self) -> &BrushMask {
        let blur_size = self.config.blur_size;
        if self.brush.as_ref().is_some_and(|b| b.blur_size() != blur_size) {
            self.brush = None;
        }
        // blur_size is validated by every setter, so render never clamps here.
        self.brush.get_or_insert_with(|| BrushMask::render(blur_size))
    }

    /// Render `points` into a fresh `width x height` surface.
    ///
    /// Points are splatted with alpha `normalize(value)`, then every pixel
    /// is colorized from the in-range or out-of-range gradient of `colors`
    /// according to `is_in_range`. The returned surface belongs to the
    /// caller.
    pub fn render<N, C, P>(
        &mut self,
        points: &[Point],
        width: u32,
        height: u32,
        normalize: N,
        colors: &C,
        is_in_range: P,
    ) -> RasterSurface
    where
        N: Fn(f64) -> f64,
        C: ColorFunction + ?Sized,
        P: Fn(f64) -> bool + Sync,
    {
        let start = Instant::now();
        let mut surface = RasterSurface::new(width, height);
        if surface.is_empty() {
            tracing::debug!(width, height, "Skipping render of empty surface");
            return surface;
        }

        let opacity = self.config.opacity;
        let painted = {
            let brush = self.brush();
            accumulate::paint(&mut surface, points, brush, normalize)
        };
        let accumulate_ms = start.elapsed().as_secs_f64() * 1000.0;

        let (in_range, out_of_range) = self.gradients.tables(colors);
        colorize::colorize(&mut surface, in_range, out_of_range, is_in_range, opacity);

        tracing::debug!(
            points = points.len(),
            painted,
            width,
            height,
            blur_size = self.config.blur_size,
            opacity,
            accumulate_ms,
            total_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Rendered heatmap"
        );

        surface
    }

    /// Render using a compiled visual map for normalization, colors and
    /// the in-range predicate.
    pub fn render_with_style(
        &mut self,
        points: &[Point],
        width: u32,
        height: u32,
        visual_map: &VisualMap,
    ) -> RasterSurface {
        self.render(
            points,
            width,
            height,
            |v| visual_map.normalize(v),
            visual_map,
            |a| visual_map.is_in_range(a),
        )
    }
}
