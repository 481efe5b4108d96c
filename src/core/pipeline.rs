//! Pipeline definitions and loading.
//!
//! A pipeline is an ordered list of stages. Each stage is either a single
//! task or a parallel group of tasks. Stages can be declared in code, with
//! closures that derive tasks from earlier results, or in YAML, with
//! `${task/field}` placeholders that are filled from earlier results.

use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::{Outcome, RunError, Task, TaskResult};

/// Builds a stage from the results of earlier stages
pub type StageBuilder =
    Arc<dyn for<'a> Fn(&StageContext<'a>) -> Result<StageSpec, RunError> + Send + Sync>;

/// A complete pipeline definition
#[derive(Debug, Clone)]
pub struct Pipeline {
    /// Pipeline name
    pub name: String,

    /// Human-readable description
    pub description: String,

    /// Ordered list of stages to execute
    pub stages: Vec<Stage>,
}

impl Pipeline {
    /// Create an empty pipeline
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: String::new(),
            stages: Vec::new(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Append a stage
    pub fn then(mut self, stage: Stage) -> Self {
        self.stages.push(stage);
        self
    }

    /// Append a single-task stage
    pub fn task(self, task: Task) -> Self {
        self.then(Stage::task(task))
    }

    /// Append a parallel group stage
    pub fn group(self, tasks: Vec<Task>) -> Self {
        self.then(Stage::group(tasks))
    }

    /// Append a stage built from earlier results
    pub fn derived<F>(self, label: impl Into<String>, build: F) -> Self
    where
        F: for<'a> Fn(&StageContext<'a>) -> Result<StageSpec, RunError> + Send + Sync + 'static,
    {
        self.then(Stage::derived(label, build))
    }

    /// Load a pipeline from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline file: {}", path.display()))?;

        Self::from_yaml(&content)
    }

    /// Parse a pipeline from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let file: PipelineFile =
            serde_yaml::from_str(content).context("Failed to parse pipeline YAML")?;
        file.try_into()
    }

    /// Validate the pipeline definition
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            anyhow::bail!("Pipeline name cannot be empty");
        }

        if self.stages.is_empty() {
            anyhow::bail!("Pipeline must have at least one stage");
        }

        // task name -> stage index, for tasks whose names are known up front
        let mut declared: HashMap<&str, usize> = HashMap::new();

        for (i, stage) in self.stages.iter().enumerate() {
            let Some(spec) = stage.spec() else {
                continue;
            };

            if spec.tasks().is_empty() {
                anyhow::bail!("Stage {} is an empty group", i);
            }

            for task in spec.tasks() {
                if task.name.is_empty() {
                    anyhow::bail!("Stage {} has a task with an empty name", i);
                }
                if declared.insert(task.name.as_str(), i).is_some() {
                    anyhow::bail!("Task name '{}' is declared more than once", task.name);
                }
            }
        }

        for (i, stage) in self.stages.iter().enumerate() {
            let Stage::Templated(spec) = stage else {
                continue;
            };

            // Names produced by derived stages are only known at run time
            let derived_before = self.stages[..i]
                .iter()
                .any(|s| matches!(s, Stage::Derived { .. }));

            for reference in spec.tasks().iter().flat_map(task_references) {
                match declared.get(reference.task.as_str()) {
                    Some(&idx) if idx >= i => {
                        anyhow::bail!(
                            "Stage {} references task '{}' from stage {} (only earlier stages may be referenced)",
                            i,
                            reference.task,
                            idx
                        );
                    }
                    None if !derived_before => {
                        anyhow::bail!(
                            "Stage {} references non-existent task '{}'",
                            i,
                            reference.task
                        );
                    }
                    _ => {}
                }
            }
        }

        Ok(())
    }

    /// Total number of tasks with names known before the run
    pub fn static_task_count(&self) -> usize {
        self.stages
            .iter()
            .filter_map(Stage::spec)
            .map(|spec| spec.tasks().len())
            .sum()
    }
}

/// Concrete shape of a stage: one task or a parallel group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StageSpec {
    Task(Task),
    Group(Vec<Task>),
}

impl StageSpec {
    /// Tasks of this stage in declaration order
    pub fn tasks(&self) -> &[Task] {
        match self {
            StageSpec::Task(task) => std::slice::from_ref(task),
            StageSpec::Group(tasks) => tasks,
        }
    }

    fn map_tasks<F>(&self, mut f: F) -> Result<Self, RunError>
    where
        F: FnMut(&Task) -> Result<Task, RunError>,
    {
        Ok(match self {
            StageSpec::Task(task) => StageSpec::Task(f(task)?),
            StageSpec::Group(tasks) => {
                StageSpec::Group(tasks.iter().map(f).collect::<Result<_, _>>()?)
            }
        })
    }
}

/// One sequential step of a pipeline
#[derive(Clone)]
pub enum Stage {
    /// Fixed tasks
    Static(StageSpec),

    /// Tasks whose names and payload strings carry `${task/field}` placeholders
    Templated(StageSpec),

    /// Tasks computed from earlier results
    Derived { label: String, build: StageBuilder },
}

impl Stage {
    pub fn task(task: Task) -> Self {
        Stage::Static(StageSpec::Task(task))
    }

    pub fn group(tasks: Vec<Task>) -> Self {
        Stage::Static(StageSpec::Group(tasks))
    }

    pub fn derived<F>(label: impl Into<String>, build: F) -> Self
    where
        F: for<'a> Fn(&StageContext<'a>) -> Result<StageSpec, RunError> + Send + Sync + 'static,
    {
        Stage::Derived {
            label: label.into(),
            build: Arc::new(build),
        }
    }

    /// The declared tasks, when they are known before the run
    pub fn spec(&self) -> Option<&StageSpec> {
        match self {
            Stage::Static(spec) | Stage::Templated(spec) => Some(spec),
            Stage::Derived { .. } => None,
        }
    }

    /// Short description used in logs
    pub fn label(&self) -> String {
        match self {
            Stage::Static(spec) | Stage::Templated(spec) => match spec {
                StageSpec::Task(task) => task.name.clone(),
                StageSpec::Group(tasks) => format!("group of {}", tasks.len()),
            },
            Stage::Derived { label, .. } => label.clone(),
        }
    }

    /// Produce the concrete tasks for this stage
    pub fn resolve(&self, ctx: &StageContext<'_>) -> Result<StageSpec, RunError> {
        let spec = match self {
            Stage::Static(spec) => spec.clone(),
            Stage::Templated(spec) => spec.map_tasks(|task| render_task(task, ctx))?,
            Stage::Derived { build, .. } => build(ctx)?,
        };

        if spec.tasks().is_empty() {
            return Err(RunError::EmptyStage { stage: ctx.stage });
        }

        // Results are looked up by name, so a name may only be produced once per run
        let tasks = spec.tasks();
        for (idx, task) in tasks.iter().enumerate() {
            let earlier_in_stage = tasks[..idx].iter().any(|t| t.name == task.name);
            if earlier_in_stage || ctx.results.iter().any(|r| r.name == task.name) {
                return Err(RunError::DuplicateTask {
                    stage: ctx.stage,
                    name: task.name.clone(),
                });
            }
        }

        Ok(spec)
    }
}

impl fmt::Debug for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Static(spec) => f.debug_tuple("Static").field(spec).finish(),
            Stage::Templated(spec) => f.debug_tuple("Templated").field(spec).finish(),
            Stage::Derived { label, .. } => {
                f.debug_struct("Derived").field("label", label).finish_non_exhaustive()
            }
        }
    }
}

/// Read-only view of earlier results, handed to stages that depend on them
#[derive(Debug, Clone, Copy)]
pub struct StageContext<'a> {
    /// Index of the stage being resolved
    pub stage: usize,

    /// Results of all earlier stages
    pub results: &'a [TaskResult],
}

impl<'a> StageContext<'a> {
    pub fn new(stage: usize, results: &'a [TaskResult]) -> Self {
        Self { stage, results }
    }

    /// Result of an earlier task
    pub fn result(&self, task: &str) -> Result<&'a TaskResult, RunError> {
        self.results
            .iter()
            .find(|r| r.name == task)
            .ok_or_else(|| self.dependency(format!("no result for task '{}'", task)))
    }

    /// Payload field of an earlier task, by `/`-separated path
    pub fn field(&self, task: &str, path: &str) -> Result<&'a Value, RunError> {
        self.result(task)?
            .field(path)
            .ok_or_else(|| self.dependency(format!("task '{}' has no field '{}'", task, path)))
    }

    pub fn u64(&self, task: &str, path: &str) -> Result<u64, RunError> {
        self.field(task, path)?.as_u64().ok_or_else(|| {
            self.dependency(format!("field '{}' of task '{}' is not an integer", path, task))
        })
    }

    pub fn str(&self, task: &str, path: &str) -> Result<&'a str, RunError> {
        self.field(task, path)?.as_str().ok_or_else(|| {
            self.dependency(format!("field '{}' of task '{}' is not a string", path, task))
        })
    }

    fn dependency(&self, reason: String) -> RunError {
        RunError::Dependency {
            stage: self.stage,
            reason,
        }
    }
}

// ============================================================================
// Placeholders
// ============================================================================

/// A `${task/path}` reference
#[derive(Debug, Clone, PartialEq, Eq)]
struct Reference {
    task: String,
    path: String,
}

/// Split a string into its placeholder references, with their byte spans
fn scan_references(s: &str) -> Vec<(std::ops::Range<usize>, Reference)> {
    let mut found = Vec::new();
    let mut offset = 0;

    while let Some(start) = s[offset..].find("${") {
        let start = offset + start;
        let Some(len) = s[start..].find('}') else {
            break;
        };
        let end = start + len + 1;
        let inner = &s[start + 2..end - 1];
        let (task, path) = inner.split_once('/').unwrap_or((inner, ""));
        found.push((
            start..end,
            Reference {
                task: task.trim().to_string(),
                path: path.trim().to_string(),
            },
        ));
        offset = end;
    }

    found
}

fn value_references(value: &Value, out: &mut Vec<Reference>) {
    match value {
        Value::String(s) => out.extend(scan_references(s).into_iter().map(|(_, r)| r)),
        Value::Array(items) => items.iter().for_each(|v| value_references(v, out)),
        Value::Object(map) => map.values().for_each(|v| value_references(v, out)),
        _ => {}
    }
}

fn task_references(task: &Task) -> Vec<Reference> {
    let mut refs: Vec<Reference> = scan_references(&task.name)
        .into_iter()
        .map(|(_, r)| r)
        .collect();
    if let Outcome::Success(payload) = &task.outcome {
        value_references(payload, &mut refs);
    }
    refs
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Fill the placeholders of a string.
///
/// A string that is exactly one placeholder becomes the referenced value;
/// otherwise each placeholder is replaced by the value's display text.
fn render_str(s: &str, ctx: &StageContext<'_>) -> Result<Value, RunError> {
    let refs = scan_references(s);
    if refs.is_empty() {
        return Ok(Value::String(s.to_string()));
    }

    if let [(span, reference)] = refs.as_slice() {
        if span.start == 0 && span.end == s.len() {
            return ctx.field(&reference.task, &reference.path).cloned();
        }
    }

    let mut out = String::with_capacity(s.len());
    let mut last = 0;
    for (span, reference) in refs {
        out.push_str(&s[last..span.start]);
        out.push_str(&display_value(ctx.field(&reference.task, &reference.path)?));
        last = span.end;
    }
    out.push_str(&s[last..]);

    Ok(Value::String(out))
}

fn render_value(value: &Value, ctx: &StageContext<'_>) -> Result<Value, RunError> {
    Ok(match value {
        Value::String(s) => render_str(s, ctx)?,
        Value::Array(items) => Value::Array(
            items
                .iter()
                .map(|v| render_value(v, ctx))
                .collect::<Result<_, _>>()?,
        ),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| Ok((k.clone(), render_value(v, ctx)?)))
                .collect::<Result<_, RunError>>()?,
        ),
        other => other.clone(),
    })
}

fn render_task(task: &Task, ctx: &StageContext<'_>) -> Result<Task, RunError> {
    let name = display_value(&render_str(&task.name, ctx)?);
    let outcome = match &task.outcome {
        Outcome::Success(payload) => {
            Outcome::Success(render_value(payload, ctx)?)
        }
        failure => failure.clone(),
    };

    Ok(Task::new(name, task.duration_ms, outcome))
}

// ============================================================================
// YAML schema
// ============================================================================

/// Pipeline file schema (matches YAML structure)
#[derive(Debug, Clone, Deserialize)]
struct PipelineFile {
    name: String,
    #[serde(default)]
    description: String,
    stages: Vec<StageDef>,
}

/// Supports two YAML forms:
/// - Single task: `- task: { name: a, duration_ms: 100 }`
/// - Parallel group: `- group: [ ... ]`
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
enum StageDef {
    Task { task: TaskDef },
    Group { group: Vec<TaskDef> },
}

/// A task as written in YAML: `payload` for success, `fail` for failure
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
struct TaskDef {
    name: String,
    duration_ms: u64,
    #[serde(default)]
    payload: Option<Value>,
    #[serde(default)]
    fail: Option<String>,
}

impl TryFrom<TaskDef> for Task {
    type Error = anyhow::Error;

    fn try_from(def: TaskDef) -> Result<Self> {
        match (def.payload, def.fail) {
            (Some(_), Some(_)) => anyhow::bail!(
                "Task '{}' declares both 'payload' and 'fail'",
                def.name
            ),
            (None, Some(reason)) => Ok(Task::fail(def.name, def.duration_ms, reason)),
            (payload, None) => Ok(Task::succeed(
                def.name,
                def.duration_ms,
                payload.unwrap_or(Value::Null),
            )),
        }
    }
}

impl TryFrom<PipelineFile> for Pipeline {
    type Error = anyhow::Error;

    fn try_from(file: PipelineFile) -> Result<Self> {
        let mut stages = Vec::with_capacity(file.stages.len());

        for def in file.stages {
            let spec = match def {
                StageDef::Task { task } => StageSpec::Task(task.try_into()?),
                StageDef::Group { group } => StageSpec::Group(
                    group
                        .into_iter()
                        .map(Task::try_from)
                        .collect::<Result<_>>()?,
                ),
            };
            if spec.tasks().iter().any(|t| !task_references(t).is_empty()) {
                stages.push(Stage::Templated(spec));
            } else {
                stages.push(Stage::Static(spec));
            }
        }

        Ok(Pipeline {
            name: file.name,
            description: file.description,
            stages,
        })
    }
}
