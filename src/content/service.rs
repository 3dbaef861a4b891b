// src/content/service.rs
//! Document-set and document-detail fetchers.
//!
//! Every read goes cache → de-dup → queue → breaker → timeout → upstream.
//! The cache write happens inside the de-duplicated computation, so all
//! joined callers see the entry once any of them returns.

use super::breaker::{BreakerSnapshot, CircuitBreaker};
use super::cache::TtlCache;
use super::dedup::RequestDeduplicator;
use super::queue::{QueueStats, RequestQueue};
use super::timeout::with_timeout;
use super::timer::PerformanceTimer;
use crate::api::{CollectionQuery, NotionRepository};
use crate::constants::*;
use crate::error::ContentError;
use crate::markdown;
use crate::model::{DocumentDetail, PageObject};
use crate::types::{DatabaseId, PageId};
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

/// Per-operation deadlines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeoutBudgets {
    pub collection_query: Duration,
    pub page_metadata: Duration,
    pub markdown_conversion: Duration,
}

impl Default for TimeoutBudgets {
    fn default() -> Self {
        Self {
            collection_query: COLLECTION_QUERY_TIMEOUT,
            page_metadata: PAGE_METADATA_TIMEOUT,
            markdown_conversion: MARKDOWN_CONVERSION_TIMEOUT,
        }
    }
}

/// Tunables for a [`ContentService`]. Defaults match production.
#[derive(Debug, Clone)]
pub struct ServiceOptions {
    pub query: CollectionQuery,
    pub budgets: TimeoutBudgets,
    pub max_concurrent: usize,
    pub breaker_max_failures: u32,
    pub breaker_reset_timeout: Duration,
}

impl Default for ServiceOptions {
    fn default() -> Self {
        Self {
            query: CollectionQuery::default(),
            budgets: TimeoutBudgets::default(),
            max_concurrent: MAX_CONCURRENT_UPSTREAM_CALLS,
            breaker_max_failures: BREAKER_MAX_FAILURES,
            breaker_reset_timeout: BREAKER_RESET_TIMEOUT,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    pub collection: usize,
    pub documents: usize,
    pub in_flight: usize,
}

/// Cache key for one document's detail.
pub fn document_cache_key(id: &PageId) -> String {
    format!("{}{}", DOCUMENT_CACHE_KEY_PREFIX, id)
}

struct Inner {
    repo: Arc<dyn NotionRepository>,
    database: DatabaseId,
    options: ServiceOptions,
    collection_cache: TtlCache<Vec<PageObject>>,
    document_cache: TtlCache<DocumentDetail>,
    collection_requests: RequestDeduplicator<Vec<PageObject>>,
    document_requests: RequestDeduplicator<DocumentDetail>,
    queue: RequestQueue,
    breaker: CircuitBreaker,
}

/// The content layer: one per process, cheap to clone into handlers.
#[derive(Clone)]
pub struct ContentService {
    inner: Arc<Inner>,
}

impl ContentService {
    pub fn new(repo: Arc<dyn NotionRepository>, database: DatabaseId) -> Self {
        Self::with_options(repo, database, ServiceOptions::default())
    }

    pub fn with_options(
        repo: Arc<dyn NotionRepository>,
        database: DatabaseId,
        options: ServiceOptions,
    ) -> Self {
        let queue = RequestQueue::new(options.max_concurrent);
        let breaker = CircuitBreaker::new(options.breaker_max_failures, options.breaker_reset_timeout);
        Self {
            inner: Arc::new(Inner {
                repo,
                database,
                options,
                collection_cache: TtlCache::new(),
                document_cache: TtlCache::new(),
                collection_requests: RequestDeduplicator::new(),
                document_requests: RequestDeduplicator::new(),
                queue,
                breaker,
            }),
        }
    }

    /// Published posts, newest first. Errors propagate; there is no
    /// empty-list fallback here.
    pub async fn get_collection(&self) -> Result<Vec<PageObject>, ContentError> {
        if let Some(pages) = self.inner.collection_cache.get(COLLECTION_CACHE_KEY) {
            return Ok(pages);
        }

        let inner = Arc::clone(&self.inner);
        self.inner
            .collection_requests
            .dedup(COLLECTION_CACHE_KEY, move || async move {
                let timer = PerformanceTimer::start("Database query");
                let result = inner
                    .queue
                    .enqueue(inner.breaker.execute(|| inner.query_collection()))
                    .await;
                timer.end();

                let pages = result?;
                log::info!("Caching {} posts", pages.len());
                inner
                    .collection_cache
                    .set(COLLECTION_CACHE_KEY, pages.clone(), COLLECTION_CACHE_TTL);
                Ok(pages)
            })
            .await
    }

    /// One post's body and metadata. Sub-fetch failures come back as a
    /// `partial` detail, which is cached like any other.
    pub async fn get_document(&self, id: &PageId) -> Result<DocumentDetail, ContentError> {
        let key = document_cache_key(id);
        if let Some(detail) = self.inner.document_cache.get(&key) {
            return Ok(detail);
        }

        let inner = Arc::clone(&self.inner);
        let id = id.clone();
        let cache_key = key.clone();
        self.inner
            .document_requests
            .dedup(&key, move || async move {
                let timer = PerformanceTimer::start(format!("Page fetch {}", id.short()));
                let result = inner
                    .queue
                    .enqueue(inner.breaker.execute(|| inner.fetch_document(&id)))
                    .await;
                timer.end();

                let detail = result?;
                if detail.partial {
                    log::warn!("Caching partial content for page {}", id.short());
                } else {
                    log::info!("Caching page {}", id.short());
                }
                inner
                    .document_cache
                    .set(cache_key, detail.clone(), DOCUMENT_CACHE_TTL);
                Ok(detail)
            })
            .await
    }

    pub fn clear_caches(&self) {
        self.inner.collection_cache.clear();
        self.inner.document_cache.clear();
        log::info!("Content caches cleared");
    }

    pub fn cache_stats(&self) -> CacheStats {
        CacheStats {
            collection: self.inner.collection_cache.len(),
            documents: self.inner.document_cache.len(),
            in_flight: self.inner.collection_requests.in_flight()
                + self.inner.document_requests.in_flight(),
        }
    }

    pub fn queue_stats(&self) -> QueueStats {
        self.inner.queue.stats()
    }

    pub fn breaker_state(&self) -> BreakerSnapshot {
        self.inner.breaker.snapshot()
    }
}

impl Inner {
    async fn query_collection(&self) -> Result<Vec<PageObject>, ContentError> {
        with_timeout(
            "Database query",
            self.options.budgets.collection_query,
            self.repo.query_database(&self.database, &self.options.query),
        )
        .await
    }

    /// Body and metadata run side by side and settle independently.
    async fn fetch_document(&self, id: &PageId) -> Result<DocumentDetail, ContentError> {
        let body = with_timeout(
            "Markdown conversion",
            self.options.budgets.markdown_conversion,
            self.render_body(id),
        );
        let metadata = with_timeout(
            "Page retrieval",
            self.options.budgets.page_metadata,
            self.repo.retrieve_page(id),
        );
        let (body, metadata) = tokio::join!(body, metadata);

        if let Err(err) = &body {
            log::warn!("Body of page {} unavailable: {}", id.short(), err);
        }
        if let Err(err) = &metadata {
            log::warn!("Metadata of page {} unavailable: {}", id.short(), err);
        }

        Ok(DocumentDetail::from_outcomes(body, metadata))
    }

    async fn render_body(&self, id: &PageId) -> Result<String, ContentError> {
        let blocks = self
            .repo
            .retrieve_block_tree(&id.retag(), MARKDOWN_MAX_DEPTH)
            .await?;
        Ok(markdown::render_blocks(&blocks))
    }
}
