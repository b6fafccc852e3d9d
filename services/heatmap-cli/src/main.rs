//! Heatmap command line renderer.
//!
//! Loads weighted points and a visual-map style, projects the points onto
//! the output image and writes the rendered heatmap as PNG.

mod config;
mod input;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use config::RunConfig;
use heatmap_common::{Extent, HeatmapError};
use renderer::{png, HeatmapRasterizer, StyleConfig};

#[derive(Parser, Debug)]
#[command(name = "heatmap-cli")]
#[command(about = "Render weighted points into a density heatmap PNG")]
struct Args {
    /// Points file: JSON array of [x, y, value] rows in data units
    #[arg(short, long, env = "HEATMAP_INPUT")]
    input: Option<PathBuf>,

    /// Style file (JSON)
    #[arg(short, long, env = "HEATMAP_STYLE")]
    style: Option<PathBuf>,

    /// Style to use from the style file
    #[arg(long, env = "HEATMAP_STYLE_NAME")]
    style_name: Option<String>,

    /// Output PNG path
    #[arg(short, long, env = "HEATMAP_OUTPUT")]
    output: Option<PathBuf>,

    /// Run configuration file (YAML); flags override its values
    #[arg(short, long, env = "HEATMAP_CONFIG")]
    config: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Blur added to the 20px brush radius
    #[arg(long, allow_hyphen_values = true)]
    blur_size: Option<i32>,

    /// Final alpha multiplier in [0, 1]
    #[arg(long)]
    opacity: Option<f64>,

    /// Data range mapped to the image width, as "min,max"
    #[arg(long, value_parser = Extent::from_str_pair, allow_hyphen_values = true)]
    x_extent: Option<Extent>,

    /// Data range mapped to the image height, as "min,max"
    #[arg(long, value_parser = Extent::from_str_pair, allow_hyphen_values = true)]
    y_extent: Option<Extent>,

    /// Log level
    #[arg(long, default_value = "info", env = "LOG_LEVEL")]
    log_level: String,

    /// Emit logs as JSON
    #[arg(long, env = "LOG_JSON")]
    log_json: bool,
}

impl Args {
    fn overrides(&self) -> RunConfig {
        RunConfig {
            input: self.input.clone(),
            style: self.style.clone(),
            style_name: self.style_name.clone(),
            output: self.output.clone(),
            width: self.width,
            height: self.height,
            blur_size: self.blur_size,
            opacity: self.opacity,
            x_extent: self.x_extent,
            y_extent: self.y_extent,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();

    init_tracing(&args.log_level, args.log_json)?;

    if let Err(e) = run(&args) {
        let code = e
            .downcast_ref::<HeatmapError>()
            .map(HeatmapError::code)
            .unwrap_or("error");
        error!(code, error = %format!("{:#}", e), "Render failed");
        return Err(e);
    }
    Ok(())
}

fn init_tracing(log_level: &str, json: bool) -> Result<()> {
    let level = match log_level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let builder = FmtSubscriber::builder().with_max_level(level);
    if json {
        tracing::subscriber::set_global_default(builder.json().finish())?;
    } else {
        tracing::subscriber::set_global_default(builder.finish())?;
    }
    Ok(())
}

fn run(args: &Args) -> Result<()> {
    let start = Instant::now();

    let file_config = match &args.config {
        Some(path) => config::load_run_config(path)?,
        None => RunConfig::default(),
    };
    let plan = file_config.merge(args.overrides()).resolve()?;

    let styles = StyleConfig::from_file(&plan.style)
        .with_context(|| format!("Failed to load styles from {:?}", plan.style))?;
    let (style_name, style) = plan.select_style(&styles)?;
    let visual_map = style
        .compile()
        .with_context(|| format!("Failed to compile style '{}'", style_name))?;

    let mut rasterizer = HeatmapRasterizer::with_config(plan.heatmap_config(style))?;

    let raw = input::load_points(&plan.input)
        .with_context(|| format!("Failed to load points from {:?}", plan.input))?;
    let (x_axis, y_axis) = input::axes_for(&raw, plan.width, plan.height, plan.x_extent, plan.y_extent);
    let points = input::project(&raw, &x_axis, &y_axis);

    info!(
        points = points.len(),
        style = %style_name,
        width = plan.width,
        height = plan.height,
        blur_size = rasterizer.blur_size(),
        opacity = rasterizer.opacity(),
        "Rendering heatmap"
    );

    let surface = rasterizer.render_with_style(&points, plan.width, plan.height, &visual_map);
    let image = png::encode_surface(&surface)?;

    std::fs::write(&plan.output, &image)
        .with_context(|| format!("Failed to write {:?}", plan.output))?;

    info!(
        output = %plan.output.display(),
        bytes = image.len(),
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Heatmap written"
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r##"{ "styles": { "heat": { "name": "Heat", "min": 0, "max": 1,
        "in_range": [{ "position": 0, "color": "#FFFF00" }, { "position": 1, "color": "#FF0000" }] } } }"##;

    fn args(dir: &tempfile::TempDir) -> Args {
        let input = dir.path().join("points.json");
        let style = dir.path().join("styles.json");
        std::fs::write(&input, "[[0, 0, 1], [1, 1, 0.5], [0.5, 0.5, null]]").unwrap();
        std::fs::write(&style, STYLES).unwrap();

        Args::parse_from([
            "heatmap-cli",
            "--input",
            input.to_str().unwrap(),
            "--style",
            style.to_str().unwrap(),
            "--output",
            dir.path().join("out.png").to_str().unwrap(),
            "--width",
            "64",
            "--height",
            "48",
            "--blur-size",
            "-5",
            "--x-extent",
            "-1,2",
        ])
    }

    #[test]
    fn test_args_parse_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let overrides = args(&dir).overrides();
        assert_eq!(overrides.width, Some(64));
        assert_eq!(overrides.blur_size, Some(-5));
        assert_eq!(overrides.x_extent, Some(Extent::new(-1.0, 2.0)));
        assert_eq!(overrides.y_extent, None);
    }

    #[test]
    fn test_run_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        run(&args(&dir)).unwrap();

        let png = std::fs::read(dir.path().join("out.png")).unwrap();
        assert_eq!(&png[..8], &[137, 80, 78, 71, 13, 10, 26, 10]);
        assert_eq!(u32::from_be_bytes([png[16], png[17], png[18], png[19]]), 64);
        assert_eq!(u32::from_be_bytes([png[20], png[21], png[22], png[23]]), 48);
    }

    #[test]
    fn test_run_reports_invalid_blur() {
        let dir = tempfile::tempdir().unwrap();
        let mut args = args(&dir);
        args.blur_size = Some(-100);
        let err = run(&args).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<HeatmapError>(),
            Some(HeatmapError::InvalidBlurSize(-100))
        ));
    }
}
