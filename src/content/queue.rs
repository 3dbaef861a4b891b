// src/content/queue.rs
//! Bounded-concurrency admission for upstream calls.

use crate::error::{ContentError, NotionErrorCode};
use serde::Serialize;
use std::future::Future;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::Semaphore;

/// Point-in-time view of the queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QueueStats {
    pub queued: usize,
    pub running: usize,
    pub max_concurrent: usize,
}

/// Runs at most `max_concurrent` tasks at once. Waiting tasks are admitted
/// strictly in arrival order as slots free up.
pub struct RequestQueue {
    // tokio's semaphore is fair: permits go to waiters in FIFO order.
    slots: Semaphore,
    max_concurrent: usize,
    queued: AtomicUsize,
    running: AtomicUsize,
}

/// Decrements its counter when dropped, so cancelled tasks are accounted.
struct Tally<'a>(&'a AtomicUsize);

impl<'a> Tally<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for Tally<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl RequestQueue {
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            slots: Semaphore::new(max_concurrent),
            max_concurrent,
            queued: AtomicUsize::new(0),
            running: AtomicUsize::new(0),
        }
    }

    /// Waits for a slot, then runs `task` and hands back its outcome.
    pub async fn enqueue<F, T>(&self, task: F) -> Result<T, ContentError>
    where
        F: Future<Output = Result<T, ContentError>>,
    {
        let permit = {
            let _waiting = Tally::enter(&self.queued);
            self.slots.acquire().await.map_err(|_| {
                ContentError::upstream(NotionErrorCode::Transport, "request queue closed")
            })?
        };

        let _running = Tally::enter(&self.running);
        log::debug!(
            "Queue admitted task ({} running, {} waiting)",
            self.running.load(Ordering::SeqCst),
            self.queued.load(Ordering::SeqCst)
        );
        let outcome = task.await;
        drop(permit);
        outcome
    }

    pub fn stats(&self) -> QueueStats {
        QueueStats {
            queued: self.queued.load(Ordering::SeqCst),
            running: self.running.load(Ordering::SeqCst),
            max_concurrent: self.max_concurrent,
        }
    }
}
