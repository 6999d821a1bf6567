// ABOUTME: Tool trait, tool results and the async registry agents call tools through.
// ABOUTME: Provides a registry factory that registers every domain tool.

mod quickchart;

pub use quickchart::QuickChartTool;

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::sync::RwLock;

use startup_validate_core::chart::ChartRequestBuilder;

/// Output of a tool call, always text so it can be handed back to the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolResult {
    pub content: String,
    pub is_error: bool,
}

impl ToolResult {
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: false,
        }
    }

    pub fn error(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            is_error: true,
        }
    }
}

/// A capability an agent can invoke by name with JSON arguments.
#[async_trait]
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// JSON schema of the arguments object.
    fn schema(&self) -> Value;

    async fn execute(&self, params: Value) -> Result<ToolResult, anyhow::Error>;

    /// Provider-agnostic declaration: `{name, description, parameters}`.
    fn definition(&self) -> Value {
        json!({
            "name": self.name(),
            "description": self.description(),
            "parameters": self.schema(),
        })
    }
}

/// Name-indexed set of tools shared by every agent in a run.
#[derive(Default)]
pub struct Registry {
    tools: RwLock<BTreeMap<String, Arc<dyn Tool>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a tool, replacing any tool with the same name.
    pub async fn register<T: Tool + 'static>(&self, tool: T) {
        let name = tool.name().to_string();
        let previous = self.tools.write().await.insert(name.clone(), Arc::new(tool));
        if previous.is_some() {
            tracing::warn!(tool = %name, "replaced previously registered tool");
        }
    }

    pub async fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools.read().await.get(name).cloned()
    }

    /// Registered tool names, sorted.
    pub async fn list(&self) -> Vec<String> {
        self.tools.read().await.keys().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.tools.read().await.len()
    }

    /// Declarations for the named tools that are registered, in the given order.
    pub async fn definitions(&self, names: &[String]) -> Vec<Value> {
        let tools = self.tools.read().await;
        names
            .iter()
            .filter_map(|name| match tools.get(name) {
                Some(tool) => Some(tool.definition()),
                None => {
                    tracing::warn!(tool = %name, "agent declares a tool that is not registered");
                    None
                }
            })
            .collect()
    }
}

/// Build a registry with every domain tool registered.
pub async fn build_registry(chart_builder: ChartRequestBuilder) -> Registry {
    let registry = Registry::new();
    registry.register(QuickChartTool::new(chart_builder)).await;
    registry
}
