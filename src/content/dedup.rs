// src/content/dedup.rs
//! Collapses concurrent requests for the same key into one computation.
//!
//! The computation runs on its own task, so it settles (and releases
//! whatever it holds, such as a queue slot) even when every caller has
//! stopped waiting for it.

use crate::error::{ContentError, NotionErrorCode};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures::future::{BoxFuture, FutureExt, Shared};
use std::future::Future;
use std::sync::Arc;

type SharedResult<V> = Shared<BoxFuture<'static, Result<V, ContentError>>>;
type Registry<V> = Arc<DashMap<String, SharedResult<V>>>;

/// Removes its key from the registry when dropped, including on panic.
struct Registration<V: Clone> {
    registry: Registry<V>,
    key: String,
}

impl<V: Clone> Drop for Registration<V> {
    fn drop(&mut self) {
        self.registry.remove(&self.key);
    }
}

/// At most one in-flight computation per key; every concurrent caller
/// receives the same outcome, success or error.
pub struct RequestDeduplicator<V>
where
    V: Clone,
{
    in_flight: Registry<V>,
}

impl<V> RequestDeduplicator<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(DashMap::new()),
        }
    }

    /// Joins the computation registered under `key`, or spawns
    /// `factory()` and awaits it. The registration is removed as soon as
    /// the computation settles, whichever way it settles, whether or not
    /// anyone is still waiting. Must be called inside a tokio runtime.
    pub async fn dedup<F, Fut>(&self, key: &str, factory: F) -> Result<V, ContentError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, ContentError>> + Send + 'static,
    {
        let shared = match self.in_flight.entry(key.to_string()) {
            Entry::Occupied(entry) => {
                log::debug!("Joining in-flight request: {}", key);
                entry.get().clone()
            }
            Entry::Vacant(entry) => {
                let registration = Registration {
                    registry: Arc::clone(&self.in_flight),
                    key: key.to_string(),
                };
                let computation = factory();
                // The entry guard is held until insert, so the task's removal
                // cannot run ahead of the registration.
                let task = tokio::spawn(async move {
                    let _registration = registration;
                    computation.await
                });
                let shared = task
                    .map(|joined| {
                        joined.unwrap_or_else(|err| {
                            Err(ContentError::upstream(
                                NotionErrorCode::Transport,
                                format!("fetch task failed: {}", err),
                            ))
                        })
                    })
                    .boxed()
                    .shared();
                entry.insert(shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Number of keys with a computation currently pending.
    pub fn in_flight(&self) -> usize {
        self.in_flight.len()
    }
}

impl<V> Default for RequestDeduplicator<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}
