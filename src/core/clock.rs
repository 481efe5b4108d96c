//! Shared run clock.

use std::time::Duration;

use tokio::time::Instant;

/// Monotonic "time since run start", read by every component of a run.
///
/// Built on the tokio clock so paused test time applies.
#[derive(Debug, Clone, Copy)]
pub struct RunClock {
    started_at: Instant,
}

impl RunClock {
    /// Start a new clock now
    pub fn start() -> Self {
        Self {
            started_at: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started_at.elapsed()
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed().as_secs_f64()
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.elapsed().as_millis() as u64
    }
}
