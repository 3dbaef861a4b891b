// src/loader/progress.rs
//! Synthetic progress ticks, unrelated to real transfer progress.

use std::time::Duration;
use tokio::task::JoinHandle;

/// Calls `on_tick` every `interval` until dropped.
pub struct ProgressTicker {
    handle: JoinHandle<()>,
}

impl ProgressTicker {
    pub fn spawn<F>(interval: Duration, mut on_tick: F) -> Self
    where
        F: FnMut() + Send + 'static,
    {
        let handle = tokio::spawn(async move {
            let mut ticks = tokio::time::interval(interval);
            // The first tick completes immediately.
            ticks.tick().await;
            loop {
                ticks.tick().await;
                on_tick();
            }
        });
        Self { handle }
    }
}

impl Drop for ProgressTicker {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// One synthetic step: `step` more, never past `ceiling`, never backwards.
pub fn advance(progress: u8, step: u8, ceiling: u8) -> u8 {
    if progress >= ceiling {
        progress
    } else {
        progress.saturating_add(step).min(ceiling)
    }
}
