// ABOUTME: Entry point for the startup-validate binary.
// ABOUTME: Parses CLI arguments, initializes tracing, and runs the crew, the chart builder or the crew dump.

mod config;

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};

use startup_validate_agent::{CrewRunner, build_registry, create_runtime};
use startup_validate_core::chart::builder::ERROR_PREFIX;
use startup_validate_core::chart::{ChartRequestBuilder, ChartSpec};
use startup_validate_core::crew::CrewDefinition;

use crate::config::AppConfig;

const DEFAULT_LOG_FILTER: &str =
    "startup_validate=info,startup_validate_agent=info,startup_validate_core=info";

const SAMPLE_IDEA: &str = "AI interviewer that evaluates job candidates via simulated work \
    scenarios and outputs ranked shortlists";

#[derive(Parser)]
#[command(name = "startup-validate")]
#[command(version, about = "Validate a startup idea with a crew of LLM specialists", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the validation crew on an idea and save the result
    Run {
        /// The startup idea to validate (defaults to a sample idea)
        #[arg(long)]
        idea: Option<String>,

        /// Crew definition YAML (defaults to the built-in crew)
        #[arg(long)]
        crew: Option<PathBuf>,

        /// Model override for the configured provider
        #[arg(long)]
        model: Option<String>,

        /// Result file (defaults to VALIDATE_OUTPUT or res.md)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Write the whole markdown report instead of only the final answer
        #[arg(long)]
        full: bool,

        /// Also write the full run report as JSON
        #[arg(long)]
        json: Option<PathBuf>,
    },

    /// Build a QuickChart URL from a JSON chart spec
    Chart {
        /// JSON file with chart arguments (reads stdin when omitted)
        #[arg(long)]
        spec: Option<PathBuf>,
    },

    /// Print the crew wiring as YAML
    Crew {
        /// Crew definition YAML to validate (defaults to the built-in crew)
        #[arg(long)]
        crew: Option<PathBuf>,
    },
}

fn load_crew(path: Option<&Path>) -> anyhow::Result<CrewDefinition> {
    match path {
        Some(path) => CrewDefinition::from_yaml_file(path)
            .with_context(|| format!("failed to load crew from {}", path.display())),
        None => Ok(CrewDefinition::startup_validation()),
    }
}

fn write_file(path: &Path, contents: &str) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))
}

async fn run_crew(
    config: AppConfig,
    idea: Option<String>,
    crew_path: Option<PathBuf>,
    model: Option<String>,
    output: Option<PathBuf>,
    full: bool,
    json: Option<PathBuf>,
) -> anyhow::Result<()> {
    let mut crew = load_crew(crew_path.as_deref())?;
    if let Some(rpm) = config.max_rpm {
        crew.max_rpm = rpm;
    }

    let mut provider = config.provider.clone();
    if model.is_some() {
        provider.model = model;
    }
    let runtime = create_runtime(&provider)?;

    let chart_builder = ChartRequestBuilder::with_base_url(config.quickchart_base_url.clone());
    let registry = Arc::new(build_registry(chart_builder).await);

    let idea = idea.unwrap_or_else(|| SAMPLE_IDEA.to_string());
    let report = CrewRunner::new(crew, runtime, registry)
        .run(&idea)
        .await
        .context("an error occurred while running the crew")?;

    let output = output.unwrap_or(config.output);
    let contents = if full {
        report.to_markdown()
    } else {
        report.final_output().unwrap_or_default().to_string()
    };
    write_file(&output, &contents)?;

    if let Some(json_path) = json {
        let body = serde_json::to_string_pretty(&report)?;
        write_file(&json_path, &body)?;
        tracing::info!(path = %json_path.display(), "wrote run report");
    }

    println!("Result saved to {}", output.display());
    Ok(())
}

/// Build the chart URL for a raw JSON argument object, or the flattened error text.
fn chart_output(builder: &ChartRequestBuilder, raw: &str) -> Result<String, String> {
    let args: serde_json::Value =
        serde_json::from_str(raw).map_err(|e| format!("{}: invalid JSON: {}", ERROR_PREFIX, e))?;
    let spec = ChartSpec::from_args(&args).map_err(|e| format!("{}: {}", ERROR_PREFIX, e))?;
    builder
        .build(&spec)
        .map(|request| request.url())
        .map_err(|e| format!("{}: {}", ERROR_PREFIX, e))
}

/// Prints the chart URL, or the error text with a failing exit status.
fn chart(config: &AppConfig, spec_path: Option<PathBuf>) -> anyhow::Result<ExitCode> {
    let raw = match spec_path {
        Some(path) => std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?,
        None => {
            let mut buf = String::new();
            std::io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read chart spec from stdin")?;
            buf
        }
    };

    let builder = ChartRequestBuilder::with_base_url(config.quickchart_base_url.clone());
    match chart_output(&builder, &raw) {
        Ok(url) => {
            println!("{}", url);
            Ok(ExitCode::SUCCESS)
        }
        Err(message) => {
            println!("{}", message);
            Ok(ExitCode::FAILURE)
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = AppConfig::from_env()?;

    match cli.command {
        Commands::Run {
            idea,
            crew,
            model,
            output,
            full,
            json,
        } => {
            run_crew(config, idea, crew, model, output, full, json).await?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Chart { spec } => chart(&config, spec),
        Commands::Crew { crew } => {
            let crew = load_crew(crew.as_deref())?;
            print!("{}", crew.to_yaml_string()?);
            Ok(ExitCode::SUCCESS)
        }
    }
}
