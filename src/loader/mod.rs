// src/loader/mod.rs
//! Client-side retry and progress controller for one document.
//!
//! States: `Idle` → `Loading` → `Loaded`, or `Failed` once automatic
//! retries are exhausted. `Failed` only moves again through
//! [`ContentLoader::manual_retry`]. Observers follow along through
//! [`ContentLoader::subscribe`].

mod endpoint;
mod progress;

pub use endpoint::{ContentEndpoint, HttpContentEndpoint};
pub use progress::ProgressTicker;

use crate::constants::*;
use crate::error::ContentError;
use crate::model::DocumentDetail;
use crate::types::PageId;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoaderState {
    Idle,
    Loading,
    Loaded,
    Failed,
}

/// Everything a UI needs to draw the loader.
#[derive(Debug, Clone, PartialEq)]
pub struct LoaderSnapshot {
    pub state: LoaderState,
    pub progress: u8,
    pub status: String,
    pub retry_count: u32,
    pub last_error: Option<String>,
    pub content: Option<DocumentDetail>,
}

impl LoaderSnapshot {
    fn idle() -> Self {
        Self {
            state: LoaderState::Idle,
            progress: 0,
            status: "Initializing...".to_string(),
            retry_count: 0,
            last_error: None,
            content: None,
        }
    }

    pub fn has_content(&self) -> bool {
        self.content.as_ref().is_some_and(DocumentDetail::has_body)
    }

    /// Whether the loaded content is missing its body or metadata.
    pub fn is_partial(&self) -> bool {
        self.content.as_ref().is_some_and(|c| c.partial)
    }
}

/// Status line for a retry attempt. A manual retry restarts the count at
/// zero but is still the first retry of the new round.
fn retry_status(retry_count: u32, max_retries: u32) -> String {
    format!("Retrying... ({}/{})", retry_count.max(1), max_retries)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: CLIENT_MAX_RETRIES,
            retry_delay: CLIENT_RETRY_DELAY,
        }
    }
}

pub struct ContentLoader {
    endpoint: Arc<dyn ContentEndpoint>,
    page_id: PageId,
    policy: RetryPolicy,
    snapshot: Arc<watch::Sender<LoaderSnapshot>>,
}

impl ContentLoader {
    pub fn new(endpoint: Arc<dyn ContentEndpoint>, page_id: PageId) -> Self {
        let (snapshot, _) = watch::channel(LoaderSnapshot::idle());
        Self {
            endpoint,
            page_id,
            policy: RetryPolicy::default(),
            snapshot: Arc::new(snapshot),
        }
    }

    pub fn with_policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Starts out `Loaded` with content that was rendered ahead of time.
    pub fn with_initial_content(self, content: DocumentDetail) -> Self {
        self.snapshot.send_modify(|s| {
            s.state = LoaderState::Loaded;
            s.progress = 100;
            s.content = Some(content);
        });
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<LoaderSnapshot> {
        self.snapshot.subscribe()
    }

    pub fn snapshot(&self) -> LoaderSnapshot {
        self.snapshot.borrow().clone()
    }

    pub fn max_retries(&self) -> u32 {
        self.policy.max_retries
    }

    /// Loads the document unless content is already present. Returns the
    /// state it settles in: `Loaded` or `Failed`.
    pub async fn run(&mut self) -> LoaderState {
        let state = self.snapshot.borrow().state;
        if state != LoaderState::Idle {
            return state;
        }
        self.drive(false).await
    }

    /// User-initiated retry: the retry budget starts over.
    pub async fn manual_retry(&mut self) -> LoaderState {
        self.snapshot.send_modify(|s| s.retry_count = 0);
        self.drive(true).await
    }

    async fn drive(&mut self, mut is_retry: bool) -> LoaderState {
        loop {
            match self.attempt(is_retry).await {
                Ok(content) => {
                    self.finish(content).await;
                    return LoaderState::Loaded;
                }
                Err(err) => {
                    log::warn!(
                        "Loading page {} failed: {}",
                        self.page_id.short(),
                        err
                    );
                    let retry_count = self.snapshot.borrow().retry_count;
                    let exhausted = retry_count >= self.policy.max_retries;

                    self.snapshot.send_modify(|s| {
                        s.last_error = Some(err.to_string());
                        s.progress = 0;
                        if exhausted {
                            s.state = LoaderState::Failed;
                            s.status = "Failed to load content".to_string();
                        } else {
                            s.status = format!(
                                "Loading failed. Retrying in {} seconds...",
                                self.policy.retry_delay.as_secs()
                            );
                        }
                    });
                    if exhausted {
                        return LoaderState::Failed;
                    }

                    tokio::time::sleep(self.policy.retry_delay).await;
                    self.snapshot.send_modify(|s| s.retry_count += 1);
                    is_retry = true;
                }
            }
        }
    }

    async fn attempt(&self, is_retry: bool) -> Result<DocumentDetail, ContentError> {
        let max_retries = self.policy.max_retries;
        self.snapshot.send_modify(|s| {
            s.state = LoaderState::Loading;
            s.last_error = None;
            if is_retry {
                s.status = retry_status(s.retry_count, max_retries);
                s.progress = 0;
            } else {
                s.status = "Connecting to Notion...".to_string();
                s.progress = 10;
            }
        });

        let ticker = {
            let snapshot = Arc::clone(&self.snapshot);
            ProgressTicker::spawn(PROGRESS_TICK_INTERVAL, move || {
                snapshot.send_modify(|s| {
                    s.progress =
                        progress::advance(s.progress, PROGRESS_TICK_STEP, PROGRESS_TICK_CEILING)
                });
            })
        };
        self.report(25, "Fetching page data...");

        let response = self.endpoint.fetch_document(&self.page_id, is_retry).await;
        drop(ticker);
        let content = response?;

        self.report(60, "Processing content...");
        if !content.has_body() && !content.partial {
            return Err(ContentError::EmptyContent);
        }
        Ok(content)
    }

    async fn finish(&self, content: DocumentDetail) {
        self.report(90, "Finalizing...");
        tokio::time::sleep(PROGRESS_FINALIZE_DELAY).await;

        if content.partial {
            log::warn!("Page {} loaded with partial content", self.page_id.short());
        }
        self.snapshot.send_modify(|s| {
            s.state = LoaderState::Loaded;
            s.progress = 100;
            s.status = "Content loaded successfully!".to_string();
            s.retry_count = 0;
            s.content = Some(content);
        });
    }

    fn report(&self, progress: u8, status: &str) {
        self.snapshot.send_modify(|s| {
            s.progress = progress;
            s.status = status.to_string();
        });
    }
}
