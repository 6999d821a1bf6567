// ABOUTME: Declarative crew wiring: which agent runs which task and which outputs feed each task.
// ABOUTME: Provides validation of the task-context graph and YAML loading/saving.

mod defaults;
pub mod role;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use defaults::{
    BUSINESS_MODEL_TASK, COMPETITIVE_ANALYSIS_TASK, FUNDING_ANALYSIS_TASK, MANAGER_REPORT_TASK,
    MARKET_ANALYSIS_TASK, QUICKCHART_TOOL, VALIDATION_SCORING_TASK,
};
pub use role::{AgentDefinition, AgentRole};

/// Default cap on LLM requests per minute.
pub const DEFAULT_MAX_RPM: u32 = 13;

/// Placeholder substituted with the idea under validation.
pub const IDEA_PLACEHOLDER: &str = "{startup_idea}";

/// Errors from crew validation or loading.
#[derive(Debug, Error)]
pub enum CrewError {
    #[error("crew has no tasks")]
    NoTasks,

    #[error("duplicate task id '{0}'")]
    DuplicateTask(String),

    #[error("task '{task}' lists unknown task '{reference}' as context")]
    UnknownContext { task: String, reference: String },

    #[error("task '{0}' lists itself as context")]
    SelfContext(String),

    #[error("task '{task}' is assigned to '{role}', which has no agent definition")]
    UnknownAgent { task: String, role: AgentRole },

    #[error("duplicate agent definition for '{0}'")]
    DuplicateAgent(AgentRole),

    #[error("hierarchical process requires a manager with an agent definition")]
    MissingManager,

    #[error("max_rpm must be greater than zero")]
    ZeroRpm,

    #[error("failed to read crew file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid crew YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// How the crew is coordinated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Process {
    /// Tasks run in declared order.
    #[default]
    Sequential,
    /// Tasks run in declared order under a manager agent, which owns the plan.
    Hierarchical,
}

/// One unit of work assigned to an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskDefinition {
    pub id: String,
    pub agent: AgentRole,
    pub description: String,
    pub expected_output: String,
    /// Ids of tasks whose outputs are fed to this one.
    #[serde(default)]
    pub context: Vec<String>,
}

impl TaskDefinition {
    pub fn new(
        id: impl Into<String>,
        agent: AgentRole,
        description: impl Into<String>,
        expected_output: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            agent,
            description: description.into(),
            expected_output: expected_output.into(),
            context: Vec::new(),
        }
    }

    pub fn with_context<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.context.extend(ids.into_iter().map(Into::into));
        self
    }

    /// The description with the idea placeholder filled in.
    pub fn render_description(&self, startup_idea: &str) -> String {
        self.description.replace(IDEA_PLACEHOLDER, startup_idea)
    }
}

fn default_max_rpm() -> u32 {
    DEFAULT_MAX_RPM
}

fn default_planning() -> bool {
    true
}

/// The full crew: agents, tasks and coordination settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrewDefinition {
    #[serde(default)]
    pub process: Process,
    pub agents: Vec<AgentDefinition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub manager: Option<AgentRole>,
    pub tasks: Vec<TaskDefinition>,
    #[serde(default = "default_max_rpm")]
    pub max_rpm: u32,
    /// Ask the manager for a plan before the first task.
    #[serde(default = "default_planning")]
    pub planning: bool,
}

impl CrewDefinition {
    /// Check the task graph and agent assignments.
    pub fn validate(&self) -> Result<(), CrewError> {
        if self.tasks.is_empty() {
            return Err(CrewError::NoTasks);
        }
        if self.max_rpm == 0 {
            return Err(CrewError::ZeroRpm);
        }

        let mut roles = HashSet::new();
        for agent in &self.agents {
            if !roles.insert(agent.role) {
                return Err(CrewError::DuplicateAgent(agent.role));
            }
        }

        let mut ids = HashSet::new();
        for task in &self.tasks {
            if !ids.insert(task.id.as_str()) {
                return Err(CrewError::DuplicateTask(task.id.clone()));
            }
        }

        for task in &self.tasks {
            if !roles.contains(&task.agent) {
                return Err(CrewError::UnknownAgent {
                    task: task.id.clone(),
                    role: task.agent,
                });
            }
            for reference in &task.context {
                if reference == &task.id {
                    return Err(CrewError::SelfContext(task.id.clone()));
                }
                if !ids.contains(reference.as_str()) {
                    return Err(CrewError::UnknownContext {
                        task: task.id.clone(),
                        reference: reference.clone(),
                    });
                }
            }
        }

        if self.process == Process::Hierarchical {
            match self.manager {
                Some(role) if roles.contains(&role) => {}
                _ => return Err(CrewError::MissingManager),
            }
        }

        Ok(())
    }

    pub fn task(&self, id: &str) -> Option<&TaskDefinition> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn agent(&self, role: AgentRole) -> Option<&AgentDefinition> {
        self.agents.iter().find(|a| a.role == role)
    }

    /// The agent that drafts the plan: the manager if set, else the first agent.
    pub fn planner(&self) -> Option<&AgentDefinition> {
        self.manager
            .and_then(|role| self.agent(role))
            .or_else(|| self.agents.first())
    }

    /// Context ids of `task_id` whose outputs already exist, in declared order.
    ///
    /// Context may name tasks that run later; those are skipped until they
    /// have produced output.
    pub fn available_context<'a>(
        &'a self,
        task_id: &str,
        is_done: impl Fn(&str) -> bool,
    ) -> Vec<&'a str> {
        self.task(task_id)
            .map(|task| {
                task.context
                    .iter()
                    .map(String::as_str)
                    .filter(|id| is_done(id))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Parse and validate a crew from YAML.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, CrewError> {
        let crew: CrewDefinition = serde_yaml::from_str(yaml)?;
        crew.validate()?;
        Ok(crew)
    }

    /// Read, parse and validate a crew file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, CrewError> {
        let yaml = std::fs::read_to_string(path).map_err(|source| CrewError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let crew = Self::from_yaml_str(&yaml)?;
        tracing::info!(path = %path.display(), tasks = crew.tasks.len(), "loaded crew definition");
        Ok(crew)
    }

    pub fn to_yaml_string(&self) -> Result<String, CrewError> {
        Ok(serde_yaml::to_string(self)?)
    }
}
