// ABOUTME: Agent system for startup validation, running a crew of LLM agents over an idea.
// ABOUTME: Defines the runtime trait, Gemini provider, tools, rate limiting and the crew runner.

pub mod context;
pub mod providers;
pub mod runner;
pub mod runtime;
pub mod testing;
pub mod throttle;
pub mod tools;

pub use context::TaskContext;
pub use providers::{ProviderConfig, create_runtime};
pub use runner::CrewRunner;
pub use runtime::{AgentAction, AgentError, AgentRuntime, StepRequest, Turn};
pub use throttle::RequestLimiter;
pub use tools::{QuickChartTool, Registry, Tool, ToolResult, build_registry};
