//! Simulated tasks.
//!
//! A task is declared once, before a pipeline runs, and never mutated:
//! its duration and outcome are fixed at construction time.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A unit of simulated asynchronous work
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    /// Task name (unique within a pipeline)
    pub name: String,

    /// Simulated latency in milliseconds
    pub duration_ms: u64,

    /// Predetermined outcome
    pub outcome: Outcome,
}

impl Task {
    /// Create a task with an explicit outcome
    pub fn new(name: impl Into<String>, duration_ms: u64, outcome: Outcome) -> Self {
        Self {
            name: name.into(),
            duration_ms,
            outcome,
        }
    }

    /// Create a task that succeeds with `payload`
    pub fn succeed(name: impl Into<String>, duration_ms: u64, payload: Value) -> Self {
        Self::new(name, duration_ms, Outcome::Success(payload))
    }

    /// Create a task that fails with `reason`
    pub fn fail(name: impl Into<String>, duration_ms: u64, reason: impl Into<String>) -> Self {
        Self::new(name, duration_ms, Outcome::Failure(reason.into()))
    }

    /// Declared latency
    pub fn duration(&self) -> Duration {
        Duration::from_millis(self.duration_ms)
    }

    /// Whether this task is configured to fail
    pub fn is_failing(&self) -> bool {
        matches!(self.outcome, Outcome::Failure(_))
    }

    /// Same task, switched to fail with `reason` after the same duration
    pub fn into_failing(self, reason: impl Into<String>) -> Self {
        Self {
            outcome: Outcome::Failure(reason.into()),
            ..self
        }
    }
}

/// Predetermined result of a task
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Resolve with a payload
    Success(Value),

    /// Fail with a reason
    Failure(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_task_constructors() {
        let ok = Task::succeed("lookup", 1200, json!({ "found": true }));
        assert_eq!(ok.duration(), Duration::from_millis(1200));
        assert!(!ok.is_failing());

        let bad = Task::fail("lookup", 300, "timeout");
        assert!(bad.is_failing());
        assert_eq!(bad.outcome, Outcome::Failure("timeout".to_string()));
    }

    #[test]
    fn test_into_failing_keeps_name_and_duration() {
        let task = Task::succeed("stock", 1500, json!(null)).into_failing("offline");

        assert_eq!(task.name, "stock");
        assert_eq!(task.duration_ms, 1500);
        assert!(task.is_failing());
    }
}
