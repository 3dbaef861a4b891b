// src/content/mod.rs
//! The resilience layer between the blog and Notion.
//!
//! Leaf pieces ([`TtlCache`], [`RequestDeduplicator`], [`RequestQueue`],
//! [`CircuitBreaker`], [`with_timeout`], [`PerformanceTimer`]) compose into
//! [`ContentService`], which the HTTP boundary and the cache warmer share.

mod breaker;
mod cache;
mod dedup;
mod queue;
mod service;
mod timeout;
mod timer;
mod warmer;

pub use breaker::{BreakerSnapshot, CircuitBreaker};
pub use cache::TtlCache;
pub use dedup::RequestDeduplicator;
pub use queue::{QueueStats, RequestQueue};
pub use service::{document_cache_key, CacheStats, ContentService, ServiceOptions, TimeoutBudgets};
pub use timeout::with_timeout;
pub use timer::PerformanceTimer;
pub use warmer::{select_warm_targets, warm_cache, WarmReport};
