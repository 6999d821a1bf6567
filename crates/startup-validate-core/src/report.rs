// ABOUTME: Records the outputs of one crew run and renders them as a markdown report.
// ABOUTME: The final task's output is the run's headline result.

use std::fmt::Write;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ulid::Ulid;

use crate::crew::AgentRole;

/// The text one task produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskOutput {
    pub task_id: String,
    pub agent: AgentRole,
    pub output: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

/// Everything a crew run produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrewReport {
    pub run_id: Ulid,
    pub startup_idea: String,
    pub plan: Option<String>,
    pub outputs: Vec<TaskOutput>,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl CrewReport {
    /// Start an empty report for `startup_idea`.
    pub fn new(startup_idea: impl Into<String>) -> Self {
        Self {
            run_id: Ulid::new(),
            startup_idea: startup_idea.into(),
            plan: None,
            outputs: Vec::new(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn record(&mut self, output: TaskOutput) {
        self.outputs.push(output);
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn output_of(&self, task_id: &str) -> Option<&str> {
        self.outputs
            .iter()
            .find(|o| o.task_id == task_id)
            .map(|o| o.output.as_str())
    }

    pub fn is_done(&self, task_id: &str) -> bool {
        self.outputs.iter().any(|o| o.task_id == task_id)
    }

    /// The last task's output, which the crew treats as its result.
    pub fn final_output(&self) -> Option<&str> {
        self.outputs.last().map(|o| o.output.as_str())
    }

    /// Render the whole run as markdown, one section per task.
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();

        writeln!(md, "# Startup Validation Report\n").unwrap();
        writeln!(md, "**Idea:** {}\n", self.startup_idea).unwrap();
        writeln!(md, "**Run:** {}", self.run_id).unwrap();
        writeln!(md, "**Started:** {}", self.started_at.to_rfc3339()).unwrap();
        if let Some(finished) = self.finished_at {
            writeln!(md, "**Finished:** {}", finished.to_rfc3339()).unwrap();
        }
        md.push('\n');

        if let Some(final_output) = self.final_output() {
            writeln!(md, "## Summary\n").unwrap();
            writeln!(md, "{}\n", final_output.trim()).unwrap();
        }

        if let Some(plan) = &self.plan {
            writeln!(md, "## Plan\n").unwrap();
            writeln!(md, "{}\n", plan.trim()).unwrap();
        }

        for output in &self.outputs {
            writeln!(md, "## {} ({})\n", section_title(&output.task_id), output.agent.title()).unwrap();
            writeln!(md, "{}\n", output.output.trim()).unwrap();
        }

        md
    }
}

/// `market_analysis_task` -> `Market Analysis`.
fn section_title(task_id: &str) -> String {
    task_id
        .trim_end_matches("_task")
        .split('_')
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn output(task_id: &str, agent: AgentRole, text: &str) -> TaskOutput {
        let now = Utc::now();
        TaskOutput {
            task_id: task_id.to_string(),
            agent,
            output: text.to_string(),
            started_at: now,
            finished_at: now,
        }
    }

    #[test]
    fn new_report_is_empty() {
        let report = CrewReport::new("pet insurance");
        assert!(report.outputs.is_empty());
        assert!(report.final_output().is_none());
        assert!(report.finished_at.is_none());
        assert!(!report.is_done("market_analysis_task"));
    }

    #[test]
    fn final_output_is_last_recorded() {
        let mut report = CrewReport::new("pet insurance");
        report.record(output("market_analysis_task", AgentRole::MarketAnalyst, "big market"));
        report.record(output("manager_report_task", AgentRole::ValidationManager, "go"));

        assert_eq!(report.final_output(), Some("go"));
        assert_eq!(report.output_of("market_analysis_task"), Some("big market"));
        assert!(report.is_done("manager_report_task"));
    }

    #[test]
    fn markdown_has_section_per_task() {
        let mut report = CrewReport::new("pet insurance");
        report.plan = Some("1. research\n2. score".to_string());
        report.record(output("market_analysis_task", AgentRole::MarketAnalyst, "big market"));
        report.record(output("validation_scoring_task", AgentRole::ValidationScorer, "7/10"));
        report.finish();

        let md = report.to_markdown();
        assert!(md.starts_with("# Startup Validation Report"));
        assert!(md.contains("**Idea:** pet insurance"));
        assert!(md.contains("## Plan"));
        assert!(md.contains("## Market Analysis (Market Analyst)"));
        assert!(md.contains("## Validation Scoring (Validation Scorer)"));
        assert!(md.contains("**Finished:**"));
    }

    #[test]
    fn markdown_sections_come_in_order() {
        let mut report = CrewReport::new("pet insurance");
        report.record(output("market_analysis_task", AgentRole::MarketAnalyst, "  big market \n"));
        report.record(output("manager_report_task", AgentRole::ValidationManager, "go"));

        let md = report.to_markdown();
        let header = format!(
            "# Startup Validation Report\n\n**Idea:** pet insurance\n\n**Run:** {}\n**Started:** {}\n\n",
            report.run_id,
            report.started_at.to_rfc3339()
        );
        assert!(md.starts_with(&header), "unexpected header:\n{}", md);
        assert!(!md.contains("**Finished:**"), "unfinished runs have no finish time");
        assert!(!md.contains("## Plan"));

        let summary = md.find("## Summary\n\ngo\n").unwrap();
        let market = md.find("## Market Analysis (Market Analyst)\n\nbig market\n").unwrap();
        let manager = md.find("## Manager Report (Startup Validation Manager)\n\ngo\n").unwrap();
        assert!(summary < market && market < manager);
    }

    #[test]
    fn section_title_humanizes_ids() {
        assert_eq!(section_title("business_model_task"), "Business Model");
        assert_eq!(section_title("custom"), "Custom");
    }

    #[test]
    fn report_serializes_to_json() {
        let mut report = CrewReport::new("idea");
        report.record(output("t", AgentRole::FundingAnalyst, "text"));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["outputs"][0]["agent"], "funding_analyst");
        assert_eq!(json["startup_idea"], "idea");
    }
}
