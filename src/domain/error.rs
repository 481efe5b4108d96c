//! Failure signals raised while running tasks and pipelines.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Raised when a task's predetermined outcome is failure
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{task_name}: {reason}")]
pub struct TaskError {
    /// Name of the failing task
    pub task_name: String,

    /// Reason given by the task
    pub reason: String,
}

impl TaskError {
    pub fn new(task_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            task_name: task_name.into(),
            reason: reason.into(),
        }
    }
}

/// Reason a pipeline run stopped early
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum RunError {
    /// A task failed
    #[error("task {0}")]
    Task(TaskError),

    /// A stage could not read the values it depends on
    #[error("stage {stage} could not resolve its inputs: {reason}")]
    Dependency { stage: usize, reason: String },

    /// A derived stage produced no tasks
    #[error("stage {stage} resolved to an empty group")]
    EmptyStage { stage: usize },

    /// A stage produced a task whose name an earlier task already used
    #[error("stage {stage} produced task '{name}' whose name is already in use")]
    DuplicateTask { stage: usize, name: String },
}

impl RunError {
    /// The task error behind this failure, if any
    pub fn task_error(&self) -> Option<&TaskError> {
        match self {
            RunError::Task(e) => Some(e),
            _ => None,
        }
    }
}

impl From<TaskError> for RunError {
    fn from(e: TaskError) -> Self {
        RunError::Task(e)
    }
}
