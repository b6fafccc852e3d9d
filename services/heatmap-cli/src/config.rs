//! Run configuration: an optional YAML file overlaid by command-line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use heatmap_common::Extent;
use renderer::{HeatmapConfig, StyleConfig, VisualMapStyle};

/// Surface size used when neither the run file nor the flags set one.
pub const DEFAULT_SIZE: u32 = 512;

/// Every setting of a run. All fields are optional so that a run file and
/// the command line can each supply part of it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RunConfig {
    pub input: Option<PathBuf>,
    pub style: Option<PathBuf>,
    pub style_name: Option<String>,
    pub output: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub blur_size: Option<i32>,
    pub opacity: Option<f64>,
    pub x_extent: Option<Extent>,
    pub y_extent: Option<Extent>,
}

/// A run with every required setting present.
#[derive(Debug, Clone, PartialEq)]
pub struct RunPlan {
    pub input: PathBuf,
    pub style: PathBuf,
    pub style_name: Option<String>,
    pub output: PathBuf,
    pub width: u32,
    pub height: u32,
    pub blur_size: Option<i32>,
    pub opacity: Option<f64>,
    pub x_extent: Option<Extent>,
    pub y_extent: Option<Extent>,
}

/// Load a YAML run file, expanding `${VAR}` and `${VAR:-default}` first.
pub fn load_run_config<P: AsRef<Path>>(path: P) -> Result<RunConfig> {
    let content = fs::read_to_string(path.as_ref())
        .with_context(|| format!("Failed to read run config from {:?}", path.as_ref()))?;

    let expanded = expand_env_vars(&content)?;

    serde_yaml::from_str(&expanded)
        .with_context(|| format!("Failed to parse run config from {:?}", path.as_ref()))
}

impl RunConfig {
    /// Overlay `overrides` on `self`; any value set in `overrides` wins.
    pub fn merge(self, overrides: RunConfig) -> RunConfig {
        RunConfig {
            input: overrides.input.or(self.input),
            style: overrides.style.or(self.style),
            style_name: overrides.style_name.or(self.style_name),
            output: overrides.output.or(self.output),
            width: overrides.width.or(self.width),
            height: overrides.height.or(self.height),
            blur_size: overrides.blur_size.or(self.blur_size),
            opacity: overrides.opacity.or(self.opacity),
            x_extent: overrides.x_extent.or(self.x_extent),
            y_extent: overrides.y_extent.or(self.y_extent),
        }
    }

    /// Check that input, style and output are known and fill in the size.
    pub fn resolve(self) -> Result<RunPlan> {
        let input = self
            .input
            .context("No input file: pass --input or set `input` in the run config")?;
        let style = self
            .style
            .context("No style file: pass --style or set `style` in the run config")?;
        let output = self
            .output
            .context("No output file: pass --output or set `output` in the run config")?;

        Ok(RunPlan {
            input,
            style,
            style_name: self.style_name,
            output,
            width: self.width.unwrap_or(DEFAULT_SIZE),
            height: self.height.unwrap_or(DEFAULT_SIZE),
            blur_size: self.blur_size,
            opacity: self.opacity,
            x_extent: self.x_extent,
            y_extent: self.y_extent,
        })
    }
}

impl RunPlan {
    /// Pick the style to render with. Without a name, a style file holding
    /// exactly one style selects that style.
    pub fn select_style<'a>(&self, styles: &'a StyleConfig) -> Result<(&'a str, &'a VisualMapStyle)> {
        if let Some(name) = &self.style_name {
            return styles
                .styles
                .get_key_value(name.as_str())
                .map(|(k, v)| (k.as_str(), v))
                .with_context(|| {
                    format!("Style '{}' not found in {:?}", name, self.style)
                });
        }

        let mut entries = styles.styles.iter();
        match (entries.next(), entries.next()) {
            (Some((name, style)), None) => Ok((name.as_str(), style)),
            (None, _) => anyhow::bail!("Style file {:?} defines no styles", self.style),
            _ => {
                let mut names: Vec<&str> = styles.styles.keys().map(String::as_str).collect();
                names.sort_unstable();
                anyhow::bail!(
                    "Style file {:?} defines several styles ({}); pick one with --style-name",
                    self.style,
                    names.join(", ")
                )
            }
        }
    }

    /// Rasterizer settings: the style's, with run-level overrides applied.
    pub fn heatmap_config(&self, style: &VisualMapStyle) -> HeatmapConfig {
        let base = style.heatmap_config();
        HeatmapConfig {
            blur_size: self.blur_size.unwrap_or(base.blur_size),
            opacity: self.opacity.unwrap_or(base.opacity),
        }
    }
}

/// Expand `${VAR}` and `${VAR:-default}` references.
///
/// An unset variable without a default is an error.
fn expand_env_vars(content: &str) -> Result<String> {
    let mut result = String::with_capacity(content.len());
    let mut rest = content;

    while let Some(start) = rest.find("${") {
        result.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let end = after
            .find('}')
            .with_context(|| format!("Unclosed variable substitution: ${{{}", after))?;
        let expr = &after[..end];

        let (name, default) = match expr.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (expr, None),
        };
        match (std::env::var(name), default) {
            (Ok(value), _) => result.push_str(&value),
            (Err(_), Some(default)) => result.push_str(default),
            (Err(_), None) => anyhow::bail!("Environment variable {} is not set", name),
        }

        rest = &after[end + 1..];
    }

    result.push_str(rest);
    Ok(result)
}
