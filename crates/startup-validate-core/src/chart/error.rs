// ABOUTME: Error type for chart request construction.
// ABOUTME: Callers exposed to an LLM flatten these into text; internal callers match on variants.

use thiserror::Error;

/// Smallest accepted width or height, in pixels.
pub const MIN_DIMENSION: i64 = 100;

/// Largest accepted width or height, in pixels.
pub const MAX_DIMENSION: i64 = 2000;

/// Errors that can occur while building a chart request.
#[derive(Debug, Error)]
pub enum ChartBuildError {
    #[error("Width and height must be between 100 and 2000 pixels (got {width}x{height})")]
    InvalidDimensions { width: i64, height: i64 },

    #[error("Invalid series: {0}")]
    InvalidSeries(String),

    #[error("Invalid chart arguments: {0}")]
    InvalidArguments(String),

    #[error("Failed to serialize chart configuration: {0}")]
    Serialization(String),
}

impl From<serde_json::Error> for ChartBuildError {
    fn from(err: serde_json::Error) -> Self {
        ChartBuildError::Serialization(err.to_string())
    }
}
