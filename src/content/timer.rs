// src/content/timer.rs
//! Wall-clock timing of named operations, reported through the log.

use std::time::Duration;
use tokio::time::Instant;

pub struct PerformanceTimer {
    operation: String,
    started: Instant,
}

impl PerformanceTimer {
    pub fn start(operation: impl Into<String>) -> Self {
        let operation = operation.into();
        log::debug!("{} - Started", operation);
        Self {
            operation,
            started: Instant::now(),
        }
    }

    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Logs and returns the time since [`start`](Self::start).
    pub fn end(self) -> Duration {
        let elapsed = self.elapsed();
        log::info!("{} - Completed in {}ms", self.operation, elapsed.as_millis());
        elapsed
    }
}
