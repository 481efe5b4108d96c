//! Built-in demonstration pipelines.
//!
//! Each scenario is a fixed pipeline with sample data:
//! - `form`: three independent checks joined in one parallel group
//! - `order`: sequential steps around a parallel group, with a final step
//!   that depends on the computed costs
//! - `services`: a parallel fan-out followed by a step derived from two of
//!   its results

pub mod form;
pub mod order;
pub mod services;

use std::fmt;
use std::str::FromStr;

use crate::core::Pipeline;
use crate::domain::Task;

/// A built-in demonstration pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scenario {
    FormValidation,
    OrderProcessing,
    ServiceIntegration,
}

impl Scenario {
    pub const ALL: [Scenario; 3] = [
        Scenario::FormValidation,
        Scenario::OrderProcessing,
        Scenario::ServiceIntegration,
    ];

    /// Stable identifier, also the pipeline name
    pub fn id(&self) -> &'static str {
        match self {
            Scenario::FormValidation => form::PIPELINE_NAME,
            Scenario::OrderProcessing => order::PIPELINE_NAME,
            Scenario::ServiceIntegration => services::PIPELINE_NAME,
        }
    }

    /// Build the pipeline, applying any injected failures
    pub fn pipeline(&self, failures: &FailurePlan) -> Pipeline {
        match self {
            Scenario::FormValidation => form::pipeline(failures),
            Scenario::OrderProcessing => order::pipeline(failures),
            Scenario::ServiceIntegration => services::pipeline(failures),
        }
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id())
    }
}

impl FromStr for Scenario {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Scenario::ALL
            .into_iter()
            .find(|scenario| scenario.id() == s)
            .ok_or_else(|| anyhow::anyhow!("Unknown scenario: {}", s))
    }
}

/// Which tasks of a scenario should fail instead of succeeding.
///
/// A task is targeted when its name contains one of the patterns,
/// ignoring case.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FailurePlan {
    patterns: Vec<String>,
}

impl FailurePlan {
    /// No injected failures
    pub fn none() -> Self {
        Self::default()
    }

    pub fn new<I, S>(patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            patterns: patterns
                .into_iter()
                .map(|p| p.as_ref().trim().to_lowercase())
                .filter(|p| !p.is_empty())
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    pub fn targets(&self, task_name: &str) -> bool {
        let name = task_name.to_lowercase();
        self.patterns.iter().any(|p| name.contains(p.as_str()))
    }

    /// Switch `task` to fail with `reason` if it is targeted
    pub fn apply(&self, task: Task, reason: &str) -> Task {
        if self.targets(&task.name) {
            task.into_failing(reason)
        } else {
            task
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_scenario_ids_round_trip() {
        for scenario in Scenario::ALL {
            assert_eq!(scenario.id().parse::<Scenario>().unwrap(), scenario);
        }
        assert!("unknown".parse::<Scenario>().is_err());
    }

    #[test]
    fn test_every_scenario_is_valid() {
        for scenario in Scenario::ALL {
            let pipeline = scenario.pipeline(&FailurePlan::none());
            assert_eq!(pipeline.name, scenario.id());
            assert!(pipeline.validate().is_ok(), "{} is invalid", scenario);
        }
    }

    #[test]
    fn test_failure_plan_matching() {
        let plan = FailurePlan::new(["  Stock ", ""]);

        assert!(!plan.is_empty());
        assert!(plan.targets("1 Validate stock"));
        assert!(!plan.targets("Calculate final costs"));

        let task = plan.apply(Task::succeed("Validate STOCK", 10, json!(null)), "offline");
        assert!(task.is_failing());

        assert!(FailurePlan::none().is_empty());
    }
}
