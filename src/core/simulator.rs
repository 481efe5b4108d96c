//! Task runners.
//!
//! `TaskRunner` is the seam the orchestrator executes tasks through.
//! `TaskSimulator` is the only production implementation: it waits for the
//! task's declared duration on the tokio timer and then resolves with the
//! task's predetermined outcome.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::domain::{Outcome, Task, TaskError, TaskResult};

use super::clock::RunClock;

/// Trait for anything that can execute a task
#[async_trait]
pub trait TaskRunner: Send + Sync {
    /// Human-readable runner name
    fn name(&self) -> &str;

    /// Execute a task, timestamping its result on `clock`
    async fn run(&self, task: &Task, clock: &RunClock) -> Result<TaskResult, TaskError>;
}

/// Runs tasks by sleeping for their declared duration
#[derive(Debug, Clone)]
pub struct TaskSimulator {
    /// Multiplier applied to every declared duration
    time_scale: f64,
}

impl Default for TaskSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskSimulator {
    /// Create a simulator that honours declared durations exactly
    pub fn new() -> Self {
        Self { time_scale: 1.0 }
    }

    /// Create a simulator that scales every duration by `time_scale`.
    ///
    /// Negative or non-finite scales are treated as 1.0.
    pub fn with_time_scale(time_scale: f64) -> Self {
        let time_scale = if time_scale.is_finite() && time_scale >= 0.0 {
            time_scale
        } else {
            1.0
        };
        Self { time_scale }
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    /// Actual sleep for a task after scaling, saturating at `Duration::MAX`
    pub fn delay_for(&self, task: &Task) -> Duration {
        Duration::try_from_secs_f64(task.duration().as_secs_f64() * self.time_scale)
            .unwrap_or(Duration::MAX)
    }
}

#[async_trait]
impl TaskRunner for TaskSimulator {
    fn name(&self) -> &str {
        "simulator"
    }

    async fn run(&self, task: &Task, clock: &RunClock) -> Result<TaskResult, TaskError> {
        debug!(
            task = %task.name,
            at = clock.elapsed_seconds(),
            duration_ms = task.duration_ms,
            "Task started"
        );

        tokio::time::sleep(self.delay_for(task)).await;

        match &task.outcome {
            Outcome::Success(payload) => Ok(TaskResult::completed(
                task.name.clone(),
                payload.clone(),
                clock.elapsed_seconds(),
                task.duration_ms,
            )),
            Outcome::Failure(reason) => Err(TaskError::new(task.name.clone(), reason.clone())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_huge_time_scale_saturates() {
        let task = Task::succeed("history", 2500, json!(null));

        assert_eq!(
            TaskSimulator::with_time_scale(1e20).delay_for(&task),
            Duration::MAX
        );
        assert_eq!(
            TaskSimulator::with_time_scale(f64::MAX).delay_for(&task),
            Duration::MAX
        );
        assert_eq!(
            TaskSimulator::with_time_scale(0.5).delay_for(&task),
            Duration::from_millis(1250)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_success_after_duration() {
        let simulator = TaskSimulator::new();
        let clock = RunClock::start();
        let task = Task::succeed("email", 1800, json!({ "status": "OK" }));

        let result = simulator.run(&task, &clock).await.unwrap();

        assert!((1800..1820).contains(&clock.elapsed_ms()));
        assert_eq!(result.name, "email");
        assert_eq!(result.payload, Some(json!({ "status": "OK" })));
        assert!((result.elapsed_seconds - 1.8).abs() < 0.02);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failure_after_duration() {
        let simulator = TaskSimulator::new();
        let clock = RunClock::start();
        let task = Task::fail("stock", 1500, "inventory system is not responding");

        let err = simulator.run(&task, &clock).await.unwrap_err();

        assert!((1500..1520).contains(&clock.elapsed_ms()));
        assert_eq!(err, TaskError::new("stock", "inventory system is not responding"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_time_scale() {
        let simulator = TaskSimulator::with_time_scale(0.1);
        let clock = RunClock::start();
        let task = Task::succeed("fast", 2000, json!(null));

        simulator.run(&task, &clock).await.unwrap();

        assert!((200..220).contains(&clock.elapsed_ms()));
    }

    #[test]
    fn test_invalid_time_scale_falls_back() {
        assert_eq!(TaskSimulator::with_time_scale(-2.0).time_scale(), 1.0);
        assert_eq!(TaskSimulator::with_time_scale(f64::NAN).time_scale(), 1.0);
        assert_eq!(TaskSimulator::with_time_scale(0.0).time_scale(), 0.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_same_task_same_outcome() {
        let simulator = TaskSimulator::new();
        let task = Task::succeed("history", 2500, json!({ "purchases": 15 }));

        let first = simulator.run(&task, &RunClock::start()).await.unwrap();
        let second = simulator.run(&task, &RunClock::start()).await.unwrap();

        assert_eq!(first.payload, second.payload);
        assert_eq!(first.status, second.status);
    }
}
