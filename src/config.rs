// ABOUTME: Configuration loading and validation for the startup-validate binary.
// ABOUTME: Reads provider credentials, rate limit, chart endpoint and output path from the environment.

use std::path::PathBuf;

use thiserror::Error;

use startup_validate_agent::ProviderConfig;
use startup_validate_core::chart::builder::DEFAULT_BASE_URL;

/// File the crew's result is written to when nothing else is configured.
pub const DEFAULT_OUTPUT: &str = "res.md";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("VALIDATE_MAX_RPM must be a positive integer, got '{0}'")]
    InvalidMaxRpm(String),

    #[error("QUICKCHART_BASE_URL must be an http or https URL, got '{0}'")]
    InvalidQuickChartUrl(String),
}

/// Binary configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub provider: ProviderConfig,
    /// Overrides the crew's own `max_rpm` when set.
    pub max_rpm: Option<u32>,
    pub quickchart_base_url: String,
    pub output: PathBuf,
}

/// Read an env var and return `Some(value)` only if it is non-empty after trimming.
fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|v| {
        let trimmed = v.trim().to_string();
        if trimmed.is_empty() { None } else { Some(trimmed) }
    })
}

impl AppConfig {
    /// Load configuration from environment variables with sensible defaults.
    ///
    /// Environment variables:
    /// - VALIDATE_PROVIDER: LLM provider (default: gemini)
    /// - GEMINI_API_KEY: API key, required only when a crew is run
    /// - GEMINI_BASE_URL / GEMINI_MODEL: endpoint and model overrides
    /// - VALIDATE_MAX_RPM: requests per minute cap (default: the crew's own)
    /// - QUICKCHART_BASE_URL: chart endpoint (default: https://quickchart.io/chart)
    /// - VALIDATE_OUTPUT: result file (default: res.md)
    pub fn from_env() -> Result<Self, ConfigError> {
        let provider = ProviderConfig {
            provider: non_empty_env("VALIDATE_PROVIDER").unwrap_or_else(|| "gemini".to_string()),
            api_key: non_empty_env("GEMINI_API_KEY"),
            base_url: non_empty_env("GEMINI_BASE_URL"),
            model: non_empty_env("GEMINI_MODEL"),
        };

        let max_rpm = match non_empty_env("VALIDATE_MAX_RPM") {
            Some(raw) => match raw.parse::<u32>() {
                Ok(rpm) if rpm > 0 => Some(rpm),
                _ => return Err(ConfigError::InvalidMaxRpm(raw)),
            },
            None => None,
        };

        let quickchart_base_url =
            non_empty_env("QUICKCHART_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        if !(quickchart_base_url.starts_with("https://")
            || quickchart_base_url.starts_with("http://"))
        {
            return Err(ConfigError::InvalidQuickChartUrl(quickchart_base_url));
        }

        let output = non_empty_env("VALIDATE_OUTPUT")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT));

        Ok(Self {
            provider,
            max_rpm,
            quickchart_base_url,
            output,
        })
    }
}
