//! asyncflow - Simulated async task orchestration
//!
//! Demonstrates how independent asynchronous operations compose: parallel
//! groups joined with fail-fast semantics, sequential stages where later
//! steps consume values produced by earlier ones, and mixtures of both.
//! All work is simulated with timers; every task has a fixed latency and a
//! predetermined outcome, so runs are deterministic apart from timing.
//!
//! # Modules
//!
//! - `core`: Orchestration logic (Orchestrator, Pipeline, TaskSimulator)
//! - `domain`: Data structures (Task, TaskResult, RunReport, errors)
//! - `scenarios`: Built-in demonstration pipelines
//! - `cli`: Command-line interface and report rendering
//!
//! # Usage
//!
//! ```bash
//! # Run a built-in scenario
//! asyncflow run order-processing
//!
//! # Make a task fail to watch the pipeline stop early
//! asyncflow run service-integration --fail history
//!
//! # Run a pipeline from a YAML file
//! asyncflow file pipelines/demo.yaml --json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod scenarios;

// Re-export main types at crate root for convenience
pub use crate::core::{Orchestrator, Pipeline, RunClock, Stage, StageContext, StageSpec};
pub use domain::{Outcome, RunError, RunReport, RunState, Task, TaskError, TaskResult, TaskStatus};
pub use scenarios::{FailurePlan, Scenario};
