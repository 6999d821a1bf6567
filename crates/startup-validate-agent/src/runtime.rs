// ABOUTME: Defines the AgentRuntime trait that LLM provider adapters implement.
// ABOUTME: Also defines StepRequest (what an agent is asked), AgentAction (what it answers) and AgentError.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use startup_validate_core::crew::CrewError;

/// One entry in the conversation an agent sees for the current task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Turn {
    /// Text from the orchestrator (task prompt, context).
    User { text: String },

    /// Text previously produced by the model.
    Model { text: String },

    /// A tool call the model made.
    ToolCall { name: String, args: Value },

    /// The result handed back for a tool call.
    ToolResponse { name: String, content: String },
}

impl Turn {
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User { text: text.into() }
    }

    pub fn model(text: impl Into<String>) -> Self {
        Turn::Model { text: text.into() }
    }
}

/// Everything a provider needs to run one reasoning step.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StepRequest {
    pub system_prompt: String,
    pub turns: Vec<Turn>,
    /// Provider-agnostic tool declarations: `{name, description, parameters}`.
    pub tools: Vec<Value>,
}

/// What an agent produced from a single reasoning step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AgentAction {
    /// Final text for the current task.
    Respond(String),

    /// Request to run a tool before continuing.
    CallTool { name: String, args: Value },
}

/// Errors that can occur during agent execution.
#[derive(Debug, thiserror::Error)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Rate limited")]
    RateLimited,

    #[error("Context too large")]
    ContextTooLarge,

    #[error("Task '{task}' failed: {reason}")]
    TaskFailed { task: String, reason: String },

    #[error("Invalid crew: {0}")]
    InvalidCrew(#[from] CrewError),
}

impl AgentError {
    /// Whether retrying the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AgentError::ProviderError(_) | AgentError::InvalidResponse(_) | AgentError::RateLimited
        )
    }
}

/// Trait that all LLM provider adapters must implement. Each provider
/// translates a StepRequest into API calls and parses the reply into an
/// AgentAction.
#[async_trait]
pub trait AgentRuntime: Send + Sync {
    /// Execute one step of agent reasoning.
    async fn run_step(&self, request: &StepRequest) -> Result<AgentAction, AgentError>;

    /// Provider name for logging and display (e.g. "gemini").
    fn provider_name(&self) -> &str;

    /// Model identifier being used (e.g. "gemini-2.0-flash").
    fn model_name(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn agent_action_round_trips() {
        let actions = vec![
            AgentAction::Respond("Market is large.".to_string()),
            AgentAction::CallTool {
                name: "quickchart_generator".to_string(),
                args: json!({"chart_type": "bar"}),
            },
        ];

        for action in &actions {
            let json = serde_json::to_string(action).expect("serialize action");
            let back: AgentAction = serde_json::from_str(&json).expect("deserialize action");
            assert_eq!(&back, action);
        }
    }

    #[test]
    fn turn_serializes_with_kind_tag() {
        let turn = Turn::ToolResponse {
            name: "quickchart_generator".to_string(),
            content: "https://quickchart.io/chart?c=...".to_string(),
        };
        let json = serde_json::to_value(&turn).unwrap();
        assert_eq!(json["kind"], "tool_response");
        assert_eq!(json["name"], "quickchart_generator");
    }

    #[test]
    fn agent_error_display() {
        let errors = vec![
            AgentError::ProviderError("connection timeout".to_string()),
            AgentError::InvalidResponse("missing candidates".to_string()),
            AgentError::RateLimited,
            AgentError::ContextTooLarge,
            AgentError::TaskFailed {
                task: "market_analysis_task".to_string(),
                reason: "no response".to_string(),
            },
        ];

        for err in &errors {
            assert!(!err.to_string().is_empty());
        }
        assert!(errors[4].to_string().contains("market_analysis_task"));

        let crew_err = AgentError::from(CrewError::NoTasks);
        assert!(crew_err.to_string().starts_with("Invalid crew"));
        assert!(!crew_err.is_retryable());
    }

    #[test]
    fn retryable_errors() {
        assert!(AgentError::RateLimited.is_retryable());
        assert!(AgentError::ProviderError("503".to_string()).is_retryable());
        assert!(AgentError::InvalidResponse("empty".to_string()).is_retryable());
        assert!(!AgentError::ContextTooLarge.is_retryable());
    }
}
