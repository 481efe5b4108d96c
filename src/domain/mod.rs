//! Domain types for the asyncflow orchestrator.
//!
//! This module contains the core data structures:
//! - Task: Simulated unit of work with a fixed outcome
//! - TaskResult: What an executed task produced
//! - RunReport: Terminal outcome of a pipeline run
//! - Errors: TaskError and RunError

pub mod error;
pub mod report;
pub mod result;
pub mod task;

// Re-export commonly used types
pub use error::{RunError, TaskError};
pub use report::{RunReport, RunState};
pub use result::{TaskResult, TaskStatus};
pub use task::{Outcome, Task};
