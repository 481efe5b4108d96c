//! Results produced by executed tasks.
//!
//! Each executed task produces exactly one result, at the moment its
//! simulated duration elapses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result of a single executed task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskResult {
    /// Name of the task that produced this result
    pub name: String,

    /// Final status
    pub status: TaskStatus,

    /// Payload for completed tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payload: Option<Value>,

    /// Seconds since the run started, when the task resolved
    pub elapsed_seconds: f64,

    /// Declared duration of the task
    pub duration_ms: u64,
}

impl TaskResult {
    /// Result for a task that completed with `payload`
    pub fn completed(name: String, payload: Value, elapsed_seconds: f64, duration_ms: u64) -> Self {
        Self {
            name,
            status: TaskStatus::Completed,
            payload: Some(payload),
            elapsed_seconds,
            duration_ms,
        }
    }

    /// Result for a task that failed
    pub fn failed(name: String, elapsed_seconds: f64, duration_ms: u64) -> Self {
        Self {
            name,
            status: TaskStatus::Failed,
            payload: None,
            elapsed_seconds,
            duration_ms,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == TaskStatus::Completed
    }

    /// Look up a payload field by `/`-separated path.
    ///
    /// An empty path returns the whole payload.
    pub fn field(&self, path: &str) -> Option<&Value> {
        let payload = self.payload.as_ref()?;
        let path = path.trim_matches('/');
        if path.is_empty() {
            return Some(payload);
        }
        payload.pointer(&format!("/{}", path))
    }
}

/// Status of an executed task
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    Completed,
    Failed,
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Completed => write!(f, "completed"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}
