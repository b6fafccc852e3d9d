//! Error types for heatmap rendering.

use thiserror::Error;

/// Result type alias using HeatmapError.
pub type HeatmapResult<T> = Result<T, HeatmapError>;

/// Primary error type for heatmap operations.
#[derive(Debug, Error)]
pub enum HeatmapError {
    // === Configuration Errors ===
    #[error("Invalid blur size {0}: brush radius 20 + blur size must not be negative")]
    InvalidBlurSize(i32),

    #[error("Invalid opacity {0}: expected a finite value in [0, 1]")]
    InvalidOpacity(f64),

    // === Style Errors ===
    #[error("Invalid color: {0}")]
    InvalidColor(String),

    #[error("Invalid style '{name}': {message}")]
    InvalidStyle { name: String, message: String },

    #[error("Style not found: {0}")]
    StyleNotFound(String),

    // === Input Errors ===
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    // === Output Errors ===
    #[error("Encoding failed: {0}")]
    EncodeError(String),

    // === Infrastructure Errors ===
    #[error("Internal error: {0}")]
    InternalError(String),
}

impl HeatmapError {
    /// Short machine-readable code for this error, used as a log field.
    pub fn code(&self) -> &'static str {
        match self {
            HeatmapError::InvalidBlurSize(_) => "invalid_blur_size",
            HeatmapError::InvalidOpacity(_) => "invalid_opacity",
            HeatmapError::InvalidColor(_) => "invalid_color",
            HeatmapError::InvalidStyle { .. } => "invalid_style",
            HeatmapError::StyleNotFound(_) => "style_not_found",
            HeatmapError::InvalidInput(_) => "invalid_input",
            HeatmapError::EncodeError(_) => "encode_error",
            HeatmapError::InternalError(_) => "internal_error",
        }
    }

    /// Whether the error was caused by caller-supplied configuration rather
    /// than by the environment.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            HeatmapError::InvalidBlurSize(_)
                | HeatmapError::InvalidOpacity(_)
                | HeatmapError::InvalidColor(_)
                | HeatmapError::InvalidStyle { .. }
                | HeatmapError::StyleNotFound(_)
        )
    }
}

// Conversion from common error types
impl From<std::io::Error> for HeatmapError {
    fn from(err: std::io::Error) -> Self {
        HeatmapError::InternalError(err.to_string())
    }
}

impl From<serde_json::Error> for HeatmapError {
    fn from(err: serde_json::Error) -> Self {
        HeatmapError::InvalidInput(format!("JSON error: {}", err))
    }
}
