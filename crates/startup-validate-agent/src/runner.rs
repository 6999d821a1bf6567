// ABOUTME: CrewRunner drives a crew through its tasks: optional planning step, then each task in order.
// ABOUTME: Each task runs a bounded tool loop with rate limiting and retries on transient provider errors.

use std::sync::Arc;
use std::time::Duration;

use chrono::{NaiveDate, Utc};

use startup_validate_core::crew::{AgentDefinition, CrewDefinition, TaskDefinition};
use startup_validate_core::report::{CrewReport, TaskOutput};

use crate::context::{TaskContext, planning_request};
use crate::runtime::{AgentAction, AgentError, AgentRuntime, StepRequest, Turn};
use crate::throttle::RequestLimiter;
use crate::tools::Registry;

/// Tool calls one task may make before it must answer.
pub const MAX_TOOL_ROUNDS: usize = 8;

const DEFAULT_RETRY_BACKOFF: Duration = Duration::from_secs(2);

const FINAL_ANSWER_NUDGE: &str =
    "You have used all available tool calls. Reply now with your final answer.";

/// Runs every task of a crew against one LLM runtime.
pub struct CrewRunner {
    crew: CrewDefinition,
    runtime: Arc<dyn AgentRuntime>,
    registry: Arc<Registry>,
    limiter: Arc<RequestLimiter>,
    retry_backoff: Duration,
}

impl CrewRunner {
    /// Create a runner limited to the crew's own `max_rpm`.
    pub fn new(
        crew: CrewDefinition,
        runtime: Arc<dyn AgentRuntime>,
        registry: Arc<Registry>,
    ) -> Self {
        let limiter = Arc::new(RequestLimiter::per_minute(crew.max_rpm));
        Self {
            crew,
            runtime,
            registry,
            limiter,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
        }
    }

    /// Share a limiter across runners, or override the crew's rate.
    pub fn with_limiter(mut self, limiter: Arc<RequestLimiter>) -> Self {
        self.limiter = limiter;
        self
    }

    /// Base delay between retries; attempt `n` waits `n` times this.
    pub fn with_retry_backoff(mut self, backoff: Duration) -> Self {
        self.retry_backoff = backoff;
        self
    }

    pub fn crew(&self) -> &CrewDefinition {
        &self.crew
    }

    /// Validate `startup_idea` against the whole crew and collect every task's output.
    pub async fn run(&self, startup_idea: &str) -> Result<CrewReport, AgentError> {
        self.crew.validate()?;

        let today = Utc::now().date_naive();
        let mut report = CrewReport::new(startup_idea);

        tracing::info!(
            run_id = %report.run_id,
            provider = self.runtime.provider_name(),
            model = self.runtime.model_name(),
            tasks = self.crew.tasks.len(),
            "starting crew run"
        );

        if self.crew.planning {
            report.plan = self.plan(startup_idea, today).await?;
        }

        for task in &self.crew.tasks {
            let output = self.run_task(task, &report, today).await?;
            report.record(output);
        }

        report.finish();
        tracing::info!(
            run_id = %report.run_id,
            outputs = report.outputs.len(),
            "crew run finished"
        );
        Ok(report)
    }

    /// Ask the planner for a plan. Tool calls are not offered, so any text answer is the plan.
    async fn plan(&self, startup_idea: &str, today: NaiveDate) -> Result<Option<String>, AgentError> {
        let Some(planner) = self.crew.planner() else {
            return Ok(None);
        };

        let request = planning_request(&self.crew, planner, startup_idea, today);
        match self.step("planning", planner, &request).await? {
            AgentAction::Respond(text) => {
                tracing::info!(planner = %planner.role, chars = text.len(), "crew plan drafted");
                Ok(Some(text))
            }
            AgentAction::CallTool { name, .. } => {
                tracing::warn!(planner = %planner.role, tool = %name, "planner called a tool, skipping plan");
                Ok(None)
            }
        }
    }

    async fn run_task(
        &self,
        task: &TaskDefinition,
        report: &CrewReport,
        today: NaiveDate,
    ) -> Result<TaskOutput, AgentError> {
        let agent = self.crew.agent(task.agent).ok_or_else(|| AgentError::TaskFailed {
            task: task.id.clone(),
            reason: format!("no agent defined for role {}", task.agent),
        })?;

        let upstream = self
            .crew
            .available_context(&task.id, |id| report.is_done(id))
            .into_iter()
            .filter_map(|id| report.output_of(id).map(|output| (id, output)))
            .collect();

        let context = TaskContext {
            agent,
            task,
            startup_idea: &report.startup_idea,
            plan: report.plan.as_deref(),
            upstream,
            current_date: today,
        };

        let tools = self.registry.definitions(&agent.tools).await;
        let mut request = context.to_request(tools);
        let started_at = Utc::now();
        let mut tool_rounds = 0;

        tracing::info!(
            task = %task.id,
            agent = %agent.role,
            context = context.upstream.len(),
            "task started"
        );

        loop {
            let action = self
                .step(&task.id, agent, &request)
                .await
                .map_err(|err| AgentError::TaskFailed {
                    task: task.id.clone(),
                    reason: err.to_string(),
                })?;

            match action {
                AgentAction::Respond(output) => {
                    if output.trim().is_empty() {
                        tracing::warn!(task = %task.id, "agent returned an empty answer");
                    }
                    tracing::info!(
                        task = %task.id,
                        tool_calls = tool_rounds,
                        chars = output.len(),
                        "task finished"
                    );
                    return Ok(TaskOutput {
                        task_id: task.id.clone(),
                        agent: agent.role,
                        output,
                        started_at,
                        finished_at: Utc::now(),
                    });
                }
                AgentAction::CallTool { name, args } => {
                    if tool_rounds >= MAX_TOOL_ROUNDS {
                        return Err(AgentError::TaskFailed {
                            task: task.id.clone(),
                            reason: format!("still calling tools after {} rounds", MAX_TOOL_ROUNDS),
                        });
                    }
                    tool_rounds += 1;

                    let content = self.call_tool(agent, &name, args.clone()).await;
                    request.turns.push(Turn::ToolCall {
                        name: name.clone(),
                        args,
                    });
                    request.turns.push(Turn::ToolResponse { name, content });

                    if tool_rounds == MAX_TOOL_ROUNDS {
                        request.tools.clear();
                        request.turns.push(Turn::user(FINAL_ANSWER_NUDGE));
                    }
                }
            }
        }
    }

    /// Run one tool on behalf of `agent`, always producing text for the model.
    async fn call_tool(&self, agent: &AgentDefinition, name: &str, args: serde_json::Value) -> String {
        if !agent.can_use(name) {
            tracing::warn!(agent = %agent.role, tool = %name, "agent called a tool it was not given");
            return format!(
                "Tool '{}' is not available to the {}. Available tools: {}",
                name,
                agent.role.title(),
                if agent.tools.is_empty() {
                    "none".to_string()
                } else {
                    agent.tools.join(", ")
                }
            );
        }

        let Some(tool) = self.registry.get(name).await else {
            tracing::warn!(tool = %name, "tool is not registered");
            return format!("Tool '{}' is not registered", name);
        };

        match tool.execute(args).await {
            Ok(result) => {
                tracing::debug!(tool = %name, is_error = result.is_error, "tool call finished");
                result.content
            }
            Err(err) => {
                tracing::error!(tool = %name, error = %err, "tool call failed");
                format!("Tool '{}' failed: {}", name, err)
            }
        }
    }

    /// One LLM call, rate limited, retried on transient errors up to the agent's limit.
    async fn step(
        &self,
        label: &str,
        agent: &AgentDefinition,
        request: &StepRequest,
    ) -> Result<AgentAction, AgentError> {
        let mut attempt: u32 = 0;
        loop {
            self.limiter.acquire().await;
            match self.runtime.run_step(request).await {
                Ok(action) => return Ok(action),
                Err(err) if err.is_retryable() && attempt < agent.max_retry_limit => {
                    attempt += 1;
                    let delay = self.retry_backoff * attempt;
                    tracing::warn!(
                        step = label,
                        agent = %agent.role,
                        attempt,
                        max = agent.max_retry_limit,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying agent step"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err) => {
                    tracing::error!(step = label, agent = %agent.role, error = %err, "agent step failed");
                    return Err(err);
                }
            }
        }
    }
}
