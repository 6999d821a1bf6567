// ABOUTME: Core library for startup-validate: chart request building, crew wiring and run reports.
// ABOUTME: Pure domain code shared by the agent runtime and the CLI.

pub mod chart;
pub mod crew;
pub mod report;

pub use chart::{ChartBuildError, ChartRequestBuilder, ChartSpec, RequestDescriptor, Series};
pub use crew::{AgentDefinition, AgentRole, CrewDefinition, CrewError, TaskDefinition};
pub use report::{CrewReport, TaskOutput};
