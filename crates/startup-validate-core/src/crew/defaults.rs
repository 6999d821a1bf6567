// ABOUTME: The built-in startup validation crew: six agents and six tasks.
// ABOUTME: Each specialist task sees every other task as context; the manager report sees all specialists.

use super::role::{AgentDefinition, AgentRole};
use super::{CrewDefinition, DEFAULT_MAX_RPM, Process, TaskDefinition};

pub const MARKET_ANALYSIS_TASK: &str = "market_analysis_task";
pub const COMPETITIVE_ANALYSIS_TASK: &str = "competitive_analysis_task";
pub const BUSINESS_MODEL_TASK: &str = "business_model_task";
pub const FUNDING_ANALYSIS_TASK: &str = "funding_analysis_task";
pub const VALIDATION_SCORING_TASK: &str = "validation_scoring_task";
pub const MANAGER_REPORT_TASK: &str = "manager_report_task";

/// Registry name of the chart tool handed to the scorer.
pub const QUICKCHART_TOOL: &str = "quickchart_generator";

const SPECIALIST_TASKS: [&str; 5] = [
    MARKET_ANALYSIS_TASK,
    COMPETITIVE_ANALYSIS_TASK,
    BUSINESS_MODEL_TASK,
    FUNDING_ANALYSIS_TASK,
    VALIDATION_SCORING_TASK,
];

/// Every task except `id`, specialists first, manager report last.
fn everything_but(id: &str) -> Vec<&'static str> {
    SPECIALIST_TASKS
        .iter()
        .copied()
        .chain(std::iter::once(MANAGER_REPORT_TASK))
        .filter(|other| *other != id)
        .collect()
}

fn agents() -> Vec<AgentDefinition> {
    vec![
        AgentDefinition::new(
            AgentRole::MarketAnalyst,
            "Estimate market size, growth and demand signals for the idea",
            "A market researcher who sizes markets from public data and industry reports.",
        ),
        AgentDefinition::new(
            AgentRole::CompetitiveResearcher,
            "Map direct and indirect competitors and the idea's positioning",
            "A strategy consultant who has mapped hundreds of competitive landscapes.",
        ),
        AgentDefinition::new(
            AgentRole::BusinessModelAnalyst,
            "Evaluate revenue models, unit economics and monetization options",
            "A former operator who has built pricing and revenue models for startups.",
        ),
        AgentDefinition::new(
            AgentRole::FundingAnalyst,
            "Assess the funding landscape and investor appetite for the space",
            "A venture analyst who tracks rounds, valuations and active investors.",
        ),
        AgentDefinition::new(
            AgentRole::ValidationScorer,
            "Score the idea across market, competition, business model and funding, with charts",
            "A diligence lead who turns research into a scored, visual assessment.",
        )
        .with_tool(QUICKCHART_TOOL),
        AgentDefinition::new(
            AgentRole::ValidationManager,
            "Coordinate the specialists and deliver a single validation report",
            "A startup advisor who synthesizes specialist findings into clear recommendations.",
        ),
    ]
}

fn tasks() -> Vec<TaskDefinition> {
    vec![
        TaskDefinition::new(
            MARKET_ANALYSIS_TASK,
            AgentRole::MarketAnalyst,
            "Analyze the market for: {startup_idea}. Cover TAM/SAM/SOM, growth rate and key trends.",
            "A market analysis with size estimates, growth figures and trends.",
        )
        .with_context(everything_but(MARKET_ANALYSIS_TASK)),
        TaskDefinition::new(
            COMPETITIVE_ANALYSIS_TASK,
            AgentRole::CompetitiveResearcher,
            "Research competitors for: {startup_idea}. Identify leaders, gaps and differentiation.",
            "A competitive landscape with named competitors and positioning.",
        )
        .with_context(everything_but(COMPETITIVE_ANALYSIS_TASK)),
        TaskDefinition::new(
            BUSINESS_MODEL_TASK,
            AgentRole::BusinessModelAnalyst,
            "Evaluate business models for: {startup_idea}. Cover pricing, unit economics and scalability.",
            "A business model assessment with recommended revenue streams.",
        )
        .with_context(everything_but(BUSINESS_MODEL_TASK)),
        TaskDefinition::new(
            FUNDING_ANALYSIS_TASK,
            AgentRole::FundingAnalyst,
            "Analyze the funding landscape for: {startup_idea}. Cover recent rounds and active investors.",
            "A funding analysis with comparable rounds and investor targets.",
        )
        .with_context(everything_but(FUNDING_ANALYSIS_TASK)),
        TaskDefinition::new(
            VALIDATION_SCORING_TASK,
            AgentRole::ValidationScorer,
            "Score {startup_idea} from 1-10 on market, competition, business model and funding. \
             Use the chart tool to produce a bar chart of the scores.",
            "A scorecard with justification per dimension and chart URLs.",
        )
        .with_context(everything_but(VALIDATION_SCORING_TASK)),
        TaskDefinition::new(
            MANAGER_REPORT_TASK,
            AgentRole::ValidationManager,
            "Compile the final validation report for: {startup_idea} from the specialists' findings.",
            "A markdown report with an executive summary, findings, scores, charts and a recommendation.",
        )
        .with_context(SPECIALIST_TASKS),
    ]
}

impl CrewDefinition {
    /// The built-in hierarchical startup validation crew.
    pub fn startup_validation() -> Self {
        Self {
            process: Process::Hierarchical,
            agents: agents(),
            manager: Some(AgentRole::ValidationManager),
            tasks: tasks(),
            max_rpm: DEFAULT_MAX_RPM,
            planning: true,
        }
    }
}
