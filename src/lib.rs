// src/lib.rs
//! notion-blog: the content layer of a Notion-backed portfolio blog.
//!
//! # Public API
//!
//! - **Content service**: `ContentService` (document-set and document-detail
//!   fetchers), `warm_cache`, and the resilience pieces it is built from
//! - **HTTP boundary**: `server::router`, `server::serve`
//! - **Client controller**: `ContentLoader`, `ContentEndpoint`
//! - **Upstream**: `NotionRepository`, `NotionHttpClient`
//! - **Domain model**: `PageObject`, `DocumentDetail`, `BlockObject`, accessors
//! - **Errors**: `ContentError`, `AppError`, `ValidationError`

pub mod api;
pub mod config;
pub mod constants;
pub mod content;
pub mod error;
pub mod loader;
pub mod markdown;
pub mod model;
pub mod server;
pub mod types;

// --- Error Handling ---
pub use crate::error::{AppError, ContentError, NotionErrorCode};
pub use crate::types::ValidationError;

// --- Configuration ---
pub use crate::config::{CommandLineInput, ServerConfig};

// --- Domain Model ---
pub use crate::model::{
    page_date, page_description, page_status, page_tags, page_title, BlockKind, BlockObject,
    DocumentDetail, PageObject, PropertyValue, RichText, Tag,
};

// --- Domain Types ---
pub use crate::types::{ApiKey, BlockId, DatabaseId, PageId};

// --- Upstream ---
pub use crate::api::{CollectionQuery, NotionHttpClient, NotionRepository};

// --- Content Layer ---
pub use crate::content::{
    select_warm_targets, warm_cache, CircuitBreaker, ContentService, RequestDeduplicator,
    RequestQueue, ServiceOptions, TimeoutBudgets, TtlCache, WarmReport,
};

// --- Client Controller ---
pub use crate::loader::{ContentEndpoint, ContentLoader, LoaderSnapshot, LoaderState};
