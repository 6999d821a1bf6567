// ABOUTME: Agent roles in the validation crew and the per-agent definition record.
// ABOUTME: A definition names the role's goal, backstory, tools and retry budget.

use serde::{Deserialize, Serialize};

/// Default number of retries an agent gets for a failing LLM call.
pub const DEFAULT_MAX_RETRY_LIMIT: u32 = 3;

/// Identifies the specialist an agent plays within the crew.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentRole {
    MarketAnalyst,
    CompetitiveResearcher,
    BusinessModelAnalyst,
    FundingAnalyst,
    ValidationScorer,
    #[serde(rename = "startup_validation_manager")]
    ValidationManager,
}

impl AgentRole {
    /// Every role, in crew order.
    pub const ALL: [AgentRole; 6] = [
        AgentRole::MarketAnalyst,
        AgentRole::CompetitiveResearcher,
        AgentRole::BusinessModelAnalyst,
        AgentRole::FundingAnalyst,
        AgentRole::ValidationScorer,
        AgentRole::ValidationManager,
    ];

    /// Machine-readable label, identical to the serialized form.
    pub fn label(&self) -> &'static str {
        match self {
            AgentRole::MarketAnalyst => "market_analyst",
            AgentRole::CompetitiveResearcher => "competitive_researcher",
            AgentRole::BusinessModelAnalyst => "business_model_analyst",
            AgentRole::FundingAnalyst => "funding_analyst",
            AgentRole::ValidationScorer => "validation_scorer",
            AgentRole::ValidationManager => "startup_validation_manager",
        }
    }

    /// Human-readable title used in prompts and reports.
    pub fn title(&self) -> &'static str {
        match self {
            AgentRole::MarketAnalyst => "Market Analyst",
            AgentRole::CompetitiveResearcher => "Competitive Researcher",
            AgentRole::BusinessModelAnalyst => "Business Model Analyst",
            AgentRole::FundingAnalyst => "Funding Analyst",
            AgentRole::ValidationScorer => "Validation Scorer",
            AgentRole::ValidationManager => "Startup Validation Manager",
        }
    }
}

impl std::fmt::Display for AgentRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

fn default_retry_limit() -> u32 {
    DEFAULT_MAX_RETRY_LIMIT
}

fn default_true() -> bool {
    true
}

/// How one agent in the crew is configured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub role: AgentRole,
    pub goal: String,
    pub backstory: String,
    /// Names of registry tools this agent may call.
    #[serde(default)]
    pub tools: Vec<String>,
    #[serde(default = "default_retry_limit")]
    pub max_retry_limit: u32,
    /// Whether the current date is added to the agent's prompts.
    #[serde(default = "default_true")]
    pub inject_date: bool,
}

impl AgentDefinition {
    pub fn new(role: AgentRole, goal: impl Into<String>, backstory: impl Into<String>) -> Self {
        Self {
            role,
            goal: goal.into(),
            backstory: backstory.into(),
            tools: Vec::new(),
            max_retry_limit: DEFAULT_MAX_RETRY_LIMIT,
            inject_date: true,
        }
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tools.push(tool.into());
        self
    }

    pub fn can_use(&self, tool: &str) -> bool {
        self.tools.iter().any(|t| t == tool)
    }
}
