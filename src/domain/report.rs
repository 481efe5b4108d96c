//! Run reports.
//!
//! A RunReport is the terminal value of one pipeline run. It is assembled
//! by the orchestrator once the run ends and never mutated afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::{RunError, TaskError};
use super::result::TaskResult;

/// Outcome of one pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunReport {
    /// Unique identifier for this run
    pub id: Uuid,

    /// Name of the pipeline that was executed
    pub pipeline_name: String,

    /// Final state of the run
    pub state: RunState,

    /// Results in stage order, declaration order within a group.
    /// On failure the last entry is the failed task.
    pub results: Vec<TaskResult>,

    /// Number of stages that fully resolved
    pub stages_completed: usize,

    /// Wall-clock start of the run
    pub started_at: DateTime<Utc>,

    /// Time from run start to completion or failure
    pub elapsed_ms: u64,
}

impl RunReport {
    pub fn is_success(&self) -> bool {
        matches!(self.state, RunState::Completed)
    }

    /// The error that stopped the run, if it failed
    pub fn error(&self) -> Option<&RunError> {
        match &self.state {
            RunState::Failed { error } => Some(error),
            RunState::Completed => None,
        }
    }

    /// The failing task's error, if the run was stopped by a task
    pub fn task_error(&self) -> Option<&TaskError> {
        self.error().and_then(RunError::task_error)
    }

    /// Find a result by task name
    pub fn result(&self, name: &str) -> Option<&TaskResult> {
        self.results.iter().find(|r| r.name == name)
    }

    /// Results of tasks that completed
    pub fn completed(&self) -> impl Iterator<Item = &TaskResult> {
        self.results.iter().filter(|r| r.is_completed())
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_ms as f64 / 1000.0
    }
}

/// Final state of a pipeline run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "status")]
pub enum RunState {
    /// Every stage completed
    Completed,

    /// A stage failed; later stages never started
    Failed { error: RunError },
}
