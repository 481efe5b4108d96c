//! Command-line interface for asyncflow.
//!
//! Provides commands for running the built-in scenarios, running pipelines
//! from YAML files, listing scenarios, and showing the configuration.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use crate::config;
use crate::core::{Orchestrator, Pipeline};
use crate::domain::RunReport;
use crate::scenarios::{FailurePlan, Scenario};

pub mod render;

/// asyncflow - Simulated async task orchestration
#[derive(Parser, Debug)]
#[command(name = "asyncflow")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a built-in scenario
    Run {
        /// Scenario to run
        #[arg(value_enum)]
        scenario: ScenarioArg,

        /// Make tasks whose name contains this text fail (repeatable)
        #[arg(short, long)]
        fail: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Run a pipeline defined in a YAML file
    File {
        /// Path to the pipeline file
        path: PathBuf,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// List the built-in scenarios
    List,

    /// Show the resolved configuration
    Config,
}

/// Scenario names accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ScenarioArg {
    #[value(name = "form-validation", alias = "form")]
    FormValidation,
    #[value(name = "order-processing", alias = "order")]
    OrderProcessing,
    #[value(name = "service-integration", alias = "services")]
    ServiceIntegration,
}

impl From<ScenarioArg> for Scenario {
    fn from(arg: ScenarioArg) -> Self {
        match arg {
            ScenarioArg::FormValidation => Scenario::FormValidation,
            ScenarioArg::OrderProcessing => Scenario::OrderProcessing,
            ScenarioArg::ServiceIntegration => Scenario::ServiceIntegration,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Run {
                scenario,
                fail,
                json,
            } => run_scenario(scenario.into(), FailurePlan::new(&fail), json).await,
            Commands::File { path, json } => run_file(&path, json).await,
            Commands::List => list_scenarios(),
            Commands::Config => show_config(),
        }
    }
}

/// Run a built-in scenario
async fn run_scenario(scenario: Scenario, failures: FailurePlan, json: bool) -> Result<()> {
    let pipeline = scenario.pipeline(&failures);
    execute_pipeline(&pipeline, json).await
}

/// Run a pipeline file
async fn run_file(path: &Path, json: bool) -> Result<()> {
    let pipeline = Pipeline::from_file(path)?;
    execute_pipeline(&pipeline, json).await
}

async fn execute_pipeline(pipeline: &Pipeline, json: bool) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config::config()?);

    if !json {
        eprintln!("[start] {}", pipeline.name);
        if !pipeline.description.is_empty() {
            eprintln!("        {}", pipeline.description);
        }
    }

    let report = orchestrator.run_pipeline(pipeline).await?;
    print_report(&report, json)?;

    if !report.is_success() {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &RunReport, json: bool) -> Result<()> {
    if json {
        let text = serde_json::to_string_pretty(report).context("Failed to serialize report")?;
        println!("{}", text);
    } else {
        print!("{}", render::render_report(report));
    }
    Ok(())
}

/// List the built-in scenarios
fn list_scenarios() -> Result<()> {
    println!("{:<22} {:<8} {:<50}", "SCENARIO", "TASKS", "DESCRIPTION");
    println!("{}", "-".repeat(80));

    for scenario in Scenario::ALL {
        let pipeline = scenario.pipeline(&FailurePlan::none());
        let derived = pipeline.stages.len()
            - pipeline.stages.iter().filter(|s| s.spec().is_some()).count();
        println!(
            "{:<22} {:<8} {:<50}",
            scenario.id(),
            pipeline.static_task_count() + derived,
            pipeline.description
        );
    }

    Ok(())
}

/// Show the resolved configuration
fn show_config() -> Result<()> {
    let config = config::config()?;

    println!("Time scale:  {}", config.time_scale);
    match &config.config_file {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: (none, using defaults)"),
    }
    println!("Override:    {}", config::TIME_SCALE_ENV);

    Ok(())
}
