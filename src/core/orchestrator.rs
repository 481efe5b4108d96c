//! Main orchestrator for pipeline execution.
//!
//! Runs the stages of a pipeline strictly in order. Group stages start all
//! of their tasks together and join them with fail-fast semantics: the
//! first failure ends the group, while siblings that are already running
//! keep going in the background and their results are discarded.

use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, instrument};
use uuid::Uuid;

use crate::config::ResolvedConfig;
use crate::domain::{RunError, RunReport, RunState, Task, TaskError, TaskResult};

use super::clock::RunClock;
use super::pipeline::{Pipeline, StageContext, StageSpec};
use super::simulator::{TaskRunner, TaskSimulator};

/// Main pipeline orchestrator
#[derive(Clone)]
pub struct Orchestrator {
    /// Runner every task is executed through
    runner: Arc<dyn TaskRunner>,
}

impl Default for Orchestrator {
    fn default() -> Self {
        Self::new()
    }
}

impl Orchestrator {
    /// Create an orchestrator backed by the task simulator
    pub fn new() -> Self {
        Self::with_runner(Arc::new(TaskSimulator::new()))
    }

    /// Create an orchestrator with a custom runner
    pub fn with_runner(runner: Arc<dyn TaskRunner>) -> Self {
        Self { runner }
    }

    /// Create an orchestrator using the configured time scale
    pub fn from_config(config: &ResolvedConfig) -> Self {
        Self::with_runner(Arc::new(TaskSimulator::with_time_scale(config.time_scale)))
    }

    pub fn runner_name(&self) -> &str {
        self.runner.name()
    }

    /// Execute a single task
    pub async fn run_task(&self, task: &Task, clock: &RunClock) -> Result<TaskResult, TaskError> {
        self.runner.run(task, clock).await
    }

    /// Execute a group of tasks in parallel.
    ///
    /// Returns one result per task, in declaration order, once every task
    /// has completed. Returns the first failure observed as soon as it
    /// happens; the remaining tasks are not cancelled.
    pub async fn run_group(
        &self,
        tasks: &[Task],
        clock: &RunClock,
    ) -> Result<Vec<TaskResult>, TaskError> {
        debug!(tasks = tasks.len(), at = clock.elapsed_seconds(), "Starting group");

        let (tx, mut rx) = mpsc::unbounded_channel();

        for (idx, task) in tasks.iter().enumerate() {
            let tx = tx.clone();
            let runner = Arc::clone(&self.runner);
            let task = task.clone();
            let clock = *clock;

            // Detached: dropping the handle lets the task outlive the group
            tokio::spawn(async move {
                let result = runner.run(&task, &clock).await;
                if tx.send((idx, result)).is_err() {
                    debug!(task = %task.name, "Group already resolved, result discarded");
                }
            });
        }
        drop(tx);

        let mut slots: Vec<Option<TaskResult>> = vec![None; tasks.len()];
        let mut remaining = tasks.len();

        while remaining > 0 {
            match rx.recv().await {
                Some((idx, Ok(result))) => {
                    debug!(task = %result.name, at = result.elapsed_seconds, "Task completed");
                    slots[idx] = Some(result);
                    remaining -= 1;
                }
                Some((_, Err(e))) => {
                    error!(task = %e.task_name, reason = %e.reason, "Task failed, abandoning group");
                    return Err(e);
                }
                None => {
                    // Every sender is gone but some slot is empty: a runner panicked
                    let idx = slots.iter().position(Option::is_none).unwrap_or_default();
                    return Err(TaskError::new(
                        tasks[idx].name.clone(),
                        "task terminated without producing a result",
                    ));
                }
            }
        }

        Ok(slots.into_iter().flatten().collect())
    }

    /// Execute a pipeline, stage by stage.
    ///
    /// Task failures end the run and are recorded in the returned report;
    /// the outer error is reserved for invalid pipeline definitions.
    #[instrument(skip(self, pipeline), fields(pipeline = %pipeline.name))]
    pub async fn run_pipeline(&self, pipeline: &Pipeline) -> Result<RunReport> {
        pipeline.validate()?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let clock = RunClock::start();
        info!(%run_id, stages = pipeline.stages.len(), "Starting pipeline execution");

        let mut results: Vec<TaskResult> = Vec::new();
        let mut stages_completed = 0;
        let mut failure: Option<RunError> = None;

        for (stage_idx, stage) in pipeline.stages.iter().enumerate() {
            let spec = match stage.resolve(&StageContext::new(stage_idx, &results)) {
                Ok(spec) => spec,
                Err(e) => {
                    error!(stage = stage_idx, error = %e, "Stage could not be resolved");
                    failure = Some(e);
                    break;
                }
            };

            info!(
                stage = stage_idx,
                label = %stage.label(),
                at = clock.elapsed_seconds(),
                "Stage started"
            );

            let outcome = match &spec {
                // Single tasks go through the group join so a runner panic still yields a report
                StageSpec::Task(task) => self.run_group(std::slice::from_ref(task), &clock).await,
                StageSpec::Group(tasks) => self.run_group(tasks, &clock).await,
            };

            match outcome {
                Ok(stage_results) => {
                    results.extend(stage_results);
                    stages_completed += 1;
                }
                Err(e) => {
                    let duration_ms = spec
                        .tasks()
                        .iter()
                        .find(|t| t.name == e.task_name)
                        .map(|t| t.duration_ms)
                        .unwrap_or_default();
                    results.push(TaskResult::failed(
                        e.task_name.clone(),
                        clock.elapsed_seconds(),
                        duration_ms,
                    ));
                    failure = Some(RunError::Task(e));
                    break;
                }
            }
        }

        let elapsed_ms = clock.elapsed_ms();
        let state = match failure {
            Some(error) => {
                error!(%error, elapsed_ms, "Run failed");
                RunState::Failed { error }
            }
            None => {
                info!(%run_id, elapsed_ms, "Run completed successfully");
                RunState::Completed
            }
        };

        Ok(RunReport {
            id: run_id,
            pipeline_name: pipeline.name.clone(),
            state,
            results,
            stages_completed,
            started_at,
            elapsed_ms,
        })
    }
}
