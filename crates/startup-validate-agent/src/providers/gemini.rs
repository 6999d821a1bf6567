// ABOUTME: Google Gemini API adapter implementing the AgentRuntime trait.
// ABOUTME: Translates a StepRequest into a generateContent call with function declarations.

use async_trait::async_trait;
use serde_json::{Value, json};

use crate::runtime::{AgentAction, AgentError, AgentRuntime, StepRequest, Turn};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const MAX_TOKENS: u32 = 4096;
const STOP_SEQUENCE: &str = "<stop>";

/// Google Gemini runtime adapter. Calls the generateContent API with function
/// declarations and maps functionCall responses back to AgentActions.
pub struct GeminiRuntime {
    client: reqwest::Client,
    api_key: String,
    base_url: String,
    model: String,
}

impl GeminiRuntime {
    /// Create a new GeminiRuntime reading configuration from environment variables.
    /// Required: `GEMINI_API_KEY`
    /// Optional: `GEMINI_BASE_URL` (defaults to https://generativelanguage.googleapis.com)
    /// Optional: `GEMINI_MODEL` (defaults to gemini-2.0-flash)
    pub fn from_env() -> Result<Self, AgentError> {
        let api_key = std::env::var("GEMINI_API_KEY")
            .map_err(|_| AgentError::ProviderError("GEMINI_API_KEY not set".to_string()))?;

        let base_url =
            std::env::var("GEMINI_BASE_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let model = std::env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());

        Ok(Self::new(api_key, base_url, model))
    }

    /// Create a new GeminiRuntime with explicit configuration.
    pub fn new(api_key: String, base_url: String, model: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
        }
    }

    /// Build the JSON request body for the Gemini generateContent API.
    pub fn build_request_body(&self, request: &StepRequest) -> Value {
        let contents: Vec<Value> = request.turns.iter().map(turn_to_content).collect();
        let contents = coalesce_gemini_contents(contents);

        let mut body = json!({
            "system_instruction": {
                "parts": [{"text": request.system_prompt}]
            },
            "contents": contents,
            "generation_config": {
                "temperature": 0.0,
                "stop_sequences": [STOP_SEQUENCE],
                "max_output_tokens": MAX_TOKENS
            }
        });

        if !request.tools.is_empty() {
            body["tools"] = json!([{"function_declarations": build_gemini_tools(&request.tools)}]);
        }

        body
    }

    /// Parse a Gemini generateContent response into an AgentAction.
    pub fn parse_response(response_body: &Value) -> Result<AgentAction, AgentError> {
        let candidates = response_body
            .get("candidates")
            .and_then(|c| c.as_array())
            .ok_or_else(|| {
                AgentError::InvalidResponse("missing candidates array in response".to_string())
            })?;

        let candidate = candidates
            .first()
            .ok_or_else(|| AgentError::InvalidResponse("empty candidates array".to_string()))?;

        let finish_reason = candidate
            .get("finishReason")
            .and_then(|f| f.as_str())
            .unwrap_or("");

        let parts = candidate
            .get("content")
            .and_then(|c| c.get("parts"))
            .and_then(|p| p.as_array());

        let Some(parts) = parts else {
            if finish_reason == "STOP" {
                return Ok(AgentAction::Respond(String::new()));
            }
            return Err(AgentError::InvalidResponse(format!(
                "missing content parts (finishReason: {})",
                if finish_reason.is_empty() { "none" } else { finish_reason }
            )));
        };

        // Look for functionCall parts first
        for part in parts {
            if let Some(function_call) = part.get("functionCall") {
                return parse_gemini_function_call(function_call);
            }
        }

        let text: String = parts
            .iter()
            .filter_map(|part| part.get("text").and_then(|t| t.as_str()))
            .collect();

        if !text.is_empty() {
            return Ok(AgentAction::Respond(text));
        }

        if finish_reason == "STOP" {
            return Ok(AgentAction::Respond(String::new()));
        }

        Err(AgentError::InvalidResponse(
            "no actionable content in response".to_string(),
        ))
    }
}

/// Map one conversation turn to a Gemini content entry.
fn turn_to_content(turn: &Turn) -> Value {
    match turn {
        Turn::User { text } => json!({"role": "user", "parts": [{"text": text}]}),
        Turn::Model { text } => json!({"role": "model", "parts": [{"text": text}]}),
        Turn::ToolCall { name, args } => json!({
            "role": "model",
            "parts": [{"functionCall": {"name": name, "args": args}}]
        }),
        Turn::ToolResponse { name, content } => json!({
            "role": "user",
            "parts": [{"functionResponse": {"name": name, "response": {"content": content}}}]
        }),
    }
}

/// Convert tool definitions to Gemini's function declaration format.
fn build_gemini_tools(tools: &[Value]) -> Vec<Value> {
    tools
        .iter()
        .map(|tool| {
            json!({
                "name": tool.get("name").cloned().unwrap_or(Value::Null),
                "description": tool.get("description").cloned().unwrap_or(Value::Null),
                "parameters": tool.get("parameters").cloned().unwrap_or(json!({"type": "object"}))
            })
        })
        .collect()
}

/// Parse a Gemini functionCall object into an AgentAction.
fn parse_gemini_function_call(function_call: &Value) -> Result<AgentAction, AgentError> {
    let name = function_call
        .get("name")
        .and_then(|n| n.as_str())
        .filter(|n| !n.is_empty())
        .ok_or_else(|| AgentError::InvalidResponse("functionCall missing name".to_string()))?;

    let args = function_call.get("args").cloned().unwrap_or(json!({}));

    Ok(AgentAction::CallTool {
        name: name.to_string(),
        args,
    })
}

/// Coalesce consecutive Gemini contents with the same role by concatenating parts.
fn coalesce_gemini_contents(contents: Vec<Value>) -> Vec<Value> {
    let mut result: Vec<Value> = Vec::new();

    for content in contents {
        let role = content
            .get("role")
            .and_then(|r| r.as_str())
            .unwrap_or("user")
            .to_string();
        let parts = content
            .get("parts")
            .and_then(|p| p.as_array())
            .cloned()
            .unwrap_or_default();

        if let Some(last) = result.last_mut()
            && last.get("role").and_then(|r| r.as_str()) == Some(role.as_str())
            && let Some(last_parts) = last.get_mut("parts").and_then(|p| p.as_array_mut())
        {
            last_parts.extend(parts);
            continue;
        }

        result.push(json!({"role": role, "parts": parts}));
    }

    result
}

#[async_trait]
impl AgentRuntime for GeminiRuntime {
    async fn run_step(&self, request: &StepRequest) -> Result<AgentAction, AgentError> {
        let body = self.build_request_body(request);
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url, self.model, self.api_key
        );

        tracing::debug!(
            model = %self.model,
            turns = request.turns.len(),
            tools = request.tools.len(),
            "sending generateContent request"
        );

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AgentError::ProviderError(format!("HTTP request failed: {}", e)))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(AgentError::RateLimited);
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(AgentError::ProviderError(
                "Unauthorized: check GEMINI_API_KEY".to_string(),
            ));
        }

        if status.is_server_error() {
            return Err(AgentError::ProviderError(format!("Server error: {}", status)));
        }

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(AgentError::ProviderError(format!(
                "API error {}: {}",
                status, error_body
            )));
        }

        let response_body: Value = response
            .json()
            .await
            .map_err(|e| AgentError::InvalidResponse(format!("failed to parse JSON: {}", e)))?;

        Self::parse_response(&response_body)
    }

    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn runtime() -> GeminiRuntime {
        GeminiRuntime::new(
            "test-key".to_string(),
            "https://generativelanguage.googleapis.com/".to_string(),
            "gemini-2.0-flash".to_string(),
        )
    }

    fn chart_tool_definition() -> Value {
        json!({
            "name": "quickchart_generator",
            "description": "Generates QuickChart.io URLs",
            "parameters": {"type": "object", "properties": {}}
        })
    }

    #[test]
    fn gemini_runtime_creation() {
        let runtime = runtime();

        assert_eq!(runtime.provider_name(), "gemini");
        assert_eq!(runtime.model_name(), "gemini-2.0-flash");
        assert_eq!(runtime.api_key, "test-key");
        assert_eq!(runtime.base_url, "https://generativelanguage.googleapis.com");
    }

    #[test]
    fn gemini_builds_request_body() {
        let request = StepRequest {
            system_prompt: "You are the Market Analyst.".to_string(),
            turns: vec![Turn::user("Analyze solar drones")],
            tools: vec![chart_tool_definition()],
        };

        let body = runtime().build_request_body(&request);

        assert_eq!(
            body["system_instruction"]["parts"][0]["text"],
            "You are the Market Analyst."
        );

        let contents = body["contents"].as_array().unwrap();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0]["role"], "user");

        let declarations = body["tools"][0]["function_declarations"].as_array().unwrap();
        assert_eq!(declarations.len(), 1);
        assert_eq!(declarations[0]["name"], "quickchart_generator");

        let gen_config = &body["generation_config"];
        assert_eq!(gen_config["temperature"].as_f64(), Some(0.0));
        assert_eq!(gen_config["stop_sequences"], json!(["<stop>"]));
        assert_eq!(gen_config["max_output_tokens"].as_u64(), Some(4096));
    }

    #[test]
    fn gemini_omits_tools_when_none_declared() {
        let request = StepRequest {
            system_prompt: "plan".to_string(),
            turns: vec![Turn::user("Write a plan")],
            tools: Vec::new(),
        };

        let body = runtime().build_request_body(&request);
        assert!(body.get("tools").is_none());
    }

    #[test]
    fn gemini_maps_tool_turns_to_function_parts() {
        let request = StepRequest {
            system_prompt: String::new(),
            turns: vec![
                Turn::user("Score the idea"),
                Turn::ToolCall {
                    name: "quickchart_generator".to_string(),
                    args: json!({"chart_type": "bar"}),
                },
                Turn::ToolResponse {
                    name: "quickchart_generator".to_string(),
                    content: "https://quickchart.io/chart?c=x".to_string(),
                },
            ],
            tools: vec![chart_tool_definition()],
        };

        let body = runtime().build_request_body(&request);
        let contents = body["contents"].as_array().unwrap();

        // user, model(functionCall), user(functionResponse)
        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(
            contents[1]["parts"][0]["functionCall"]["name"],
            "quickchart_generator"
        );
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"][0]["functionResponse"]["response"]["content"],
            "https://quickchart.io/chart?c=x"
        );
    }

    #[test]
    fn gemini_parses_function_call_response() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{
                        "functionCall": {
                            "name": "quickchart_generator",
                            "args": {"chart_type": "radar", "datasets": [{"data": [8, 6]}]}
                        }
                    }],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });

        let action = GeminiRuntime::parse_response(&response).unwrap();
        match action {
            AgentAction::CallTool { name, args } => {
                assert_eq!(name, "quickchart_generator");
                assert_eq!(args["chart_type"], "radar");
            }
            other => panic!("expected CallTool, got {:?}", other),
        }
    }

    #[test]
    fn gemini_function_call_without_args_gets_empty_object() {
        let response = json!({
            "candidates": [{
                "content": {"parts": [{"functionCall": {"name": "quickchart_generator"}}]}
            }]
        });

        let action = GeminiRuntime::parse_response(&response).unwrap();
        assert_eq!(
            action,
            AgentAction::CallTool {
                name: "quickchart_generator".to_string(),
                args: json!({})
            }
        );
    }

    #[test]
    fn gemini_concatenates_text_parts() {
        let response = json!({
            "candidates": [{
                "content": {
                    "parts": [{"text": "## Market\n"}, {"text": "TAM is large."}],
                    "role": "model"
                },
                "finishReason": "STOP"
            }]
        });

        let action = GeminiRuntime::parse_response(&response).unwrap();
        assert_eq!(
            action,
            AgentAction::Respond("## Market\nTAM is large.".to_string())
        );
    }

    #[test]
    fn gemini_parses_stop_with_empty_parts_as_empty_response() {
        let response = json!({
            "candidates": [{
                "content": {"parts": [], "role": "model"},
                "finishReason": "STOP"
            }]
        });

        let action = GeminiRuntime::parse_response(&response).unwrap();
        assert_eq!(action, AgentAction::Respond(String::new()));
    }

    #[test]
    fn gemini_rejects_malformed_responses() {
        let cases = [
            json!({}),
            json!({"candidates": []}),
            json!({"candidates": [{"finishReason": "SAFETY"}]}),
            json!({"candidates": [{"content": {"parts": []}, "finishReason": "MAX_TOKENS"}]}),
            json!({"candidates": [{"content": {"parts": [{"functionCall": {"args": {}}}]}}]}),
        ];

        for response in &cases {
            let result = GeminiRuntime::parse_response(response);
            assert!(
                matches!(result, Err(AgentError::InvalidResponse(_))),
                "expected InvalidResponse for {}, got {:?}",
                response,
                result
            );
        }
    }

    #[test]
    fn coalesce_gemini_merges_consecutive_same_role() {
        let contents = vec![
            json!({"role": "user", "parts": [{"text": "First"}]}),
            json!({"role": "user", "parts": [{"text": "Second"}]}),
            json!({"role": "model", "parts": [{"text": "Reply"}]}),
            json!({"role": "user", "parts": [{"text": "Third"}]}),
        ];

        let result = coalesce_gemini_contents(contents);
        assert_eq!(result.len(), 3);

        let first_parts = result[0]["parts"].as_array().unwrap();
        assert_eq!(first_parts.len(), 2);
        assert_eq!(first_parts[0]["text"], "First");
        assert_eq!(first_parts[1]["text"], "Second");
    }

    #[tokio::test]
    #[cfg(feature = "live-test")]
    async fn gemini_adapter_basic() {
        let runtime = GeminiRuntime::from_env().expect("GEMINI_API_KEY must be set");

        let request = StepRequest {
            system_prompt: "You are a terse market analyst.".to_string(),
            turns: vec![Turn::user("In one sentence, is there demand for solar drones?")],
            tools: Vec::new(),
        };

        let result = runtime.run_step(&request).await;
        assert!(result.is_ok(), "live test failed: {:?}", result.err());
    }
}
