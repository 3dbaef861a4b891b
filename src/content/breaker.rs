// src/content/breaker.rs
//! Circuit breaker around upstream calls.
//!
//! Two states only. The breaker is open while the failure count is at or
//! above the threshold and the last failure is younger than the reset
//! timeout; otherwise it is closed. There is no half-open probe: the first
//! call after the cooldown simply runs, and its outcome either resets the
//! count or restarts the cooldown.

use crate::error::ContentError;
use parking_lot::Mutex;
use serde::Serialize;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

#[derive(Debug, Default)]
struct BreakerState {
    failure_count: u32,
    last_failure_at: Option<Instant>,
}

/// Observable breaker state, e.g. for a stats endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BreakerSnapshot {
    pub open: bool,
    pub failure_count: u32,
    pub max_failures: u32,
    pub reset_timeout_secs: u64,
}

pub struct CircuitBreaker {
    state: Mutex<BreakerState>,
    max_failures: u32,
    reset_timeout: Duration,
}

impl CircuitBreaker {
    pub fn new(max_failures: u32, reset_timeout: Duration) -> Self {
        Self {
            state: Mutex::new(BreakerState::default()),
            max_failures,
            reset_timeout,
        }
    }

    pub fn is_open(&self) -> bool {
        let state = self.state.lock();
        self.is_open_at(&state, Instant::now())
    }

    fn is_open_at(&self, state: &BreakerState, now: Instant) -> bool {
        match state.last_failure_at {
            Some(at) if state.failure_count >= self.max_failures => {
                now.saturating_duration_since(at) < self.reset_timeout
            }
            _ => false,
        }
    }

    /// Runs `operation` unless the breaker is open, in which case it fails
    /// with [`ContentError::CircuitOpen`] without calling it.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ContentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ContentError>>,
    {
        self.execute_with_fallback(operation, || async { Err(ContentError::CircuitOpen) })
            .await
    }

    /// Like [`execute`](Self::execute), but an open breaker answers with
    /// `fallback()` instead of an error.
    pub async fn execute_with_fallback<F, Fut, G, GFut, T>(
        &self,
        operation: F,
        fallback: G,
    ) -> Result<T, ContentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ContentError>>,
        G: FnOnce() -> GFut,
        GFut: Future<Output = Result<T, ContentError>>,
    {
        if self.is_open() {
            log::debug!("Circuit breaker open; short-circuiting call");
            return fallback().await;
        }

        let result = operation().await;
        match &result {
            Ok(_) => self.record_success(),
            Err(err) => self.record_failure(err),
        }
        result
    }

    fn record_success(&self) {
        let mut state = self.state.lock();
        if state.failure_count > 0 {
            log::info!(
                "Circuit breaker reset after {} failure(s)",
                state.failure_count
            );
        }
        state.failure_count = 0;
    }

    fn record_failure(&self, err: &ContentError) {
        let mut state = self.state.lock();
        state.failure_count += 1;
        state.last_failure_at = Some(Instant::now());

        if state.failure_count >= self.max_failures {
            log::warn!(
                "Circuit breaker opened after {} consecutive failures (last: {}); cooling down for {}s",
                state.failure_count,
                err,
                self.reset_timeout.as_secs()
            );
        } else if err.is_retryable() {
            log::debug!(
                "Upstream failure {}/{}: {}",
                state.failure_count,
                self.max_failures,
                err
            );
        } else {
            log::warn!(
                "Upstream failure {}/{} will not clear on retry: {}",
                state.failure_count,
                self.max_failures,
                err
            );
        }
    }

    pub fn snapshot(&self) -> BreakerSnapshot {
        let state = self.state.lock();
        BreakerSnapshot {
            open: self.is_open_at(&state, Instant::now()),
            failure_count: state.failure_count,
            max_failures: self.max_failures,
            reset_timeout_secs: self.reset_timeout.as_secs(),
        }
    }
}
