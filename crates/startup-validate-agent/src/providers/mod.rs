// ABOUTME: Provider module aggregating LLM runtime adapters.
// ABOUTME: create_runtime resolves a provider name and settings into a shared AgentRuntime.

pub mod gemini;

use std::sync::Arc;

use crate::runtime::{AgentError, AgentRuntime};

pub use gemini::GeminiRuntime;

/// Provider selection and credentials, usually filled from the environment.
#[derive(Debug, Clone, Default)]
pub struct ProviderConfig {
    pub provider: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub model: Option<String>,
}

impl ProviderConfig {
    pub fn gemini(api_key: impl Into<String>) -> Self {
        Self {
            provider: "gemini".to_string(),
            api_key: Some(api_key.into()),
            base_url: None,
            model: None,
        }
    }
}

/// Create a runtime for the configured provider.
pub fn create_runtime(config: &ProviderConfig) -> Result<Arc<dyn AgentRuntime>, AgentError> {
    match config.provider.as_str() {
        "gemini" => {
            let api_key = config
                .api_key
                .clone()
                .filter(|k| !k.trim().is_empty())
                .ok_or_else(|| AgentError::ProviderError("GEMINI_API_KEY not set".to_string()))?;
            let base_url = config
                .base_url
                .clone()
                .unwrap_or_else(|| gemini::DEFAULT_BASE_URL.to_string());
            let model = config
                .model
                .clone()
                .unwrap_or_else(|| gemini::DEFAULT_MODEL.to_string());

            tracing::info!(provider = "gemini", model = %model, "created LLM runtime");
            Ok(Arc::new(GeminiRuntime::new(api_key, base_url, model)))
        }
        unknown => Err(AgentError::ProviderError(format!(
            "unsupported LLM provider: {}",
            unknown
        ))),
    }
}
