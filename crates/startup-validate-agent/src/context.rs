// ABOUTME: Assembles the prompt an agent sees for one task: role frame, idea, plan and upstream outputs.
// ABOUTME: Upstream outputs are capped so long reports cannot blow the context window.

use chrono::NaiveDate;

use startup_validate_core::crew::{AgentDefinition, CrewDefinition, TaskDefinition};

use crate::runtime::{StepRequest, Turn};

/// Maximum characters of any single upstream output included in a prompt.
pub const UPSTREAM_OUTPUT_CAP: usize = 4000;

const TRUNCATION_MARKER: &str = "\n[output truncated]";

/// Role frame shared by task and planning prompts.
fn role_prompt(agent: &AgentDefinition, current_date: NaiveDate) -> String {
    let mut prompt = format!(
        "You are the {} on a startup validation crew.\nGoal: {}\nBackstory: {}\n",
        agent.role.title(),
        agent.goal,
        agent.backstory
    );
    if agent.inject_date {
        prompt.push_str(&format!("Current date: {}\n", current_date.format("%Y-%m-%d")));
    }
    prompt.push_str(
        "Call a tool only when it helps. When you are finished, reply with your final answer in markdown.",
    );
    prompt
}

/// Keep at most `cap` characters of `text`, marking the cut.
fn cap_output(text: &str, cap: usize) -> String {
    match text.char_indices().nth(cap) {
        Some((byte_index, _)) => format!("{}{}", &text[..byte_index], TRUNCATION_MARKER),
        None => text.to_string(),
    }
}

/// Everything needed to prompt one agent for one task.
#[derive(Debug, Clone)]
pub struct TaskContext<'a> {
    pub agent: &'a AgentDefinition,
    pub task: &'a TaskDefinition,
    pub startup_idea: &'a str,
    pub plan: Option<&'a str>,
    /// `(task_id, output)` pairs from tasks listed as context that already ran.
    pub upstream: Vec<(&'a str, &'a str)>,
    pub current_date: NaiveDate,
}

impl<'a> TaskContext<'a> {
    pub fn system_prompt(&self) -> String {
        role_prompt(self.agent, self.current_date)
    }

    pub fn task_prompt(&self) -> String {
        let mut prompt = format!("# Startup idea\n{}\n\n", self.startup_idea);

        if let Some(plan) = self.plan {
            prompt.push_str(&format!("# Crew plan\n{}\n\n", plan.trim()));
        }

        if !self.upstream.is_empty() {
            prompt.push_str("# Findings from other tasks\n");
            for (task_id, output) in &self.upstream {
                prompt.push_str(&format!(
                    "## {}\n{}\n\n",
                    task_id,
                    cap_output(output.trim(), UPSTREAM_OUTPUT_CAP)
                ));
            }
        }

        prompt.push_str(&format!(
            "# Task\n{}\n\n# Expected output\n{}\n",
            self.task.render_description(self.startup_idea),
            self.task.expected_output
        ));
        prompt
    }

    /// The opening request for this task.
    pub fn to_request(&self, tools: Vec<serde_json::Value>) -> StepRequest {
        StepRequest {
            system_prompt: self.system_prompt(),
            turns: vec![Turn::user(self.task_prompt())],
            tools,
        }
    }
}

/// Request asking `planner` to lay out how the crew should approach the idea.
pub fn planning_request(
    crew: &CrewDefinition,
    planner: &AgentDefinition,
    startup_idea: &str,
    current_date: NaiveDate,
) -> StepRequest {
    let mut prompt = format!(
        "# Startup idea\n{}\n\nWrite a short step-by-step plan for the crew. \
         For each task below, state what its agent should focus on.\n\n",
        startup_idea
    );
    for task in &crew.tasks {
        prompt.push_str(&format!(
            "- {} ({}): {}\n",
            task.id,
            task.agent.title(),
            task.render_description(startup_idea)
        ));
    }

    StepRequest {
        system_prompt: role_prompt(planner, current_date),
        turns: vec![Turn::user(prompt)],
        tools: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use startup_validate_core::crew::{
        AgentRole, MANAGER_REPORT_TASK, MARKET_ANALYSIS_TASK, VALIDATION_SCORING_TASK,
    };

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, 14).unwrap()
    }

    #[test]
    fn system_prompt_includes_role_and_date() {
        let crew = CrewDefinition::startup_validation();
        let agent = crew.agent(AgentRole::FundingAnalyst).unwrap();
        let task = crew.task("funding_analysis_task").unwrap();
        let ctx = TaskContext {
            agent,
            task,
            startup_idea: "solar drones",
            plan: None,
            upstream: Vec::new(),
            current_date: date(),
        };

        let prompt = ctx.system_prompt();
        assert!(prompt.contains("Funding Analyst"));
        assert!(prompt.contains(&agent.goal));
        assert!(prompt.contains("Current date: 2025-03-14"));
    }

    #[test]
    fn date_is_omitted_when_not_injected() {
        let crew = CrewDefinition::startup_validation();
        let mut agent = crew.agent(AgentRole::MarketAnalyst).unwrap().clone();
        agent.inject_date = false;
        assert!(!role_prompt(&agent, date()).contains("Current date"));
    }

    #[test]
    fn task_prompt_includes_upstream_and_plan() {
        let crew = CrewDefinition::startup_validation();
        let task = crew.task(VALIDATION_SCORING_TASK).unwrap();
        let agent = crew.agent(task.agent).unwrap();
        let ctx = TaskContext {
            agent,
            task,
            startup_idea: "solar drones",
            plan: Some("1. Research\n2. Score"),
            upstream: vec![(MARKET_ANALYSIS_TASK, "TAM is $4B")],
            current_date: date(),
        };

        let prompt = ctx.task_prompt();
        assert!(prompt.contains("# Startup idea\nsolar drones"));
        assert!(prompt.contains("# Crew plan\n1. Research"));
        assert!(prompt.contains("## market_analysis_task\nTAM is $4B"));
        assert!(prompt.contains("Score solar drones"));
        assert!(prompt.contains(&task.expected_output));
        assert!(!prompt.contains("{startup_idea}"));
    }

    #[test]
    fn to_request_starts_with_single_user_turn() {
        let crew = CrewDefinition::startup_validation();
        let task = crew.task(MANAGER_REPORT_TASK).unwrap();
        let agent = crew.agent(task.agent).unwrap();
        let ctx = TaskContext {
            agent,
            task,
            startup_idea: "x",
            plan: None,
            upstream: Vec::new(),
            current_date: date(),
        };

        let request = ctx.to_request(Vec::new());
        assert_eq!(request.turns.len(), 1);
        assert!(matches!(&request.turns[0], Turn::User { .. }));
        assert!(request.tools.is_empty());
    }

    #[test]
    fn long_upstream_output_is_capped() {
        let long = "é".repeat(UPSTREAM_OUTPUT_CAP + 100);
        let capped = cap_output(&long, UPSTREAM_OUTPUT_CAP);
        assert!(capped.ends_with(TRUNCATION_MARKER));
        assert_eq!(
            capped.trim_end_matches(TRUNCATION_MARKER).chars().count(),
            UPSTREAM_OUTPUT_CAP
        );

        assert_eq!(cap_output("short", UPSTREAM_OUTPUT_CAP), "short");
    }

    #[test]
    fn planning_request_lists_every_task() {
        let crew = CrewDefinition::startup_validation();
        let planner = crew.planner().unwrap();
        let request = planning_request(&crew, planner, "solar drones", date());

        assert!(request.system_prompt.contains("Startup Validation Manager"));
        let Turn::User { text } = &request.turns[0] else {
            panic!("expected a user turn");
        };
        for task in &crew.tasks {
            assert!(text.contains(&task.id), "plan prompt should mention {}", task.id);
        }
    }
}
