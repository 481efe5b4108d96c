//! Core orchestration logic.
//!
//! This module contains:
//! - Clock: Shared elapsed-time source for a run
//! - Simulator: Timer-backed task execution
//! - Pipeline: Stage definitions and loading
//! - Orchestrator: Parallel groups and sequential stages

pub mod clock;
pub mod orchestrator;
pub mod pipeline;
pub mod simulator;

// Re-export commonly used types
pub use clock::RunClock;
pub use orchestrator::Orchestrator;
pub use pipeline::{Pipeline, Stage, StageBuilder, StageContext, StageSpec};
pub use simulator::{TaskRunner, TaskSimulator};
