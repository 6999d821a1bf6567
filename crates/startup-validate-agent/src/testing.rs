// ABOUTME: Test utilities for the agent crate, including a scripted stub runtime.
// ABOUTME: Used in tests to drive crew runs without real API calls.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::runtime::{AgentAction, AgentError, AgentRuntime, StepRequest};

/// A stub runtime that replays queued results in order and records every request.
///
/// Once the queue is empty every step answers "Done." so a run always terminates.
#[derive(Debug, Default)]
pub struct ScriptedRuntime {
    script: Mutex<VecDeque<Result<AgentAction, AgentError>>>,
    requests: Mutex<Vec<StepRequest>>,
}

impl ScriptedRuntime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a runtime that answers every step with "Done.".
    pub fn done() -> Self {
        Self::default()
    }

    /// Queue a step result.
    pub fn push(self, step: Result<AgentAction, AgentError>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.push_back(step);
        }
        self
    }

    /// Queue a final text response.
    pub fn respond(self, text: &str) -> Self {
        self.push(Ok(AgentAction::Respond(text.to_owned())))
    }

    /// Queue a tool call.
    pub fn call_tool(self, name: &str, args: serde_json::Value) -> Self {
        self.push(Ok(AgentAction::CallTool {
            name: name.to_owned(),
            args,
        }))
    }

    /// Queue an error.
    pub fn fail(self, err: AgentError) -> Self {
        self.push(Err(err))
    }

    /// Every request received so far, in order.
    pub fn requests(&self) -> Vec<StepRequest> {
        self.requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.script.lock().map(|script| script.len()).unwrap_or(0)
    }
}

#[async_trait]
impl AgentRuntime for ScriptedRuntime {
    async fn run_step(&self, request: &StepRequest) -> Result<AgentAction, AgentError> {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }

        let next = self
            .script
            .lock()
            .ok()
            .and_then(|mut script| script.pop_front());

        next.unwrap_or_else(|| Ok(AgentAction::Respond("Done.".to_owned())))
    }

    fn provider_name(&self) -> &str {
        "scripted"
    }

    fn model_name(&self) -> &str {
        "scripted-model"
    }
}
