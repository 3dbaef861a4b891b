// src/constants.rs
//! Operational limits of the content layer.
//!
//! Each constant is named for the thing it bounds. Read together they say
//! how hard this service is willing to lean on the Notion API and how long
//! it is willing to wait for it.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Notion API
// ---------------------------------------------------------------------------

/// Version header sent with every Notion request.
pub const NOTION_API_VERSION: &str = "2022-06-28";

pub const NOTION_API_BASE_URL: &str = "https://api.notion.com/v1";

/// Page size for cursor-paginated block children.
pub const NOTION_API_PAGE_SIZE: u32 = 100;

/// Most posts a collection query returns. Kept small so the query stays fast.
pub const COLLECTION_RESULT_LIMIT: u32 = 25;

/// Transport-level timeout on the reqwest client itself.
pub const NOTION_HTTP_TIMEOUT: Duration = Duration::from_secs(25);

// ---------------------------------------------------------------------------
// Timeout budgets
// ---------------------------------------------------------------------------

pub const COLLECTION_QUERY_TIMEOUT: Duration = Duration::from_secs(10);
pub const PAGE_METADATA_TIMEOUT: Duration = Duration::from_secs(8);
pub const MARKDOWN_CONVERSION_TIMEOUT: Duration = Duration::from_secs(15);

/// Ceiling on a whole request handled by the HTTP boundary.
pub const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(25);

/// Ceiling the browser-side controller waits for one document request.
pub const CLIENT_REQUEST_TIMEOUT: Duration = Duration::from_secs(20);

// ---------------------------------------------------------------------------
// Caching
// ---------------------------------------------------------------------------

pub const COLLECTION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
pub const DOCUMENT_CACHE_TTL: Duration = Duration::from_secs(10 * 60);

pub const COLLECTION_CACHE_KEY: &str = "notion-database";
pub const DOCUMENT_CACHE_KEY_PREFIX: &str = "notion-page-";

// ---------------------------------------------------------------------------
// Upstream protection
// ---------------------------------------------------------------------------

/// Upstream calls allowed in flight at once; the rest wait in FIFO order.
pub const MAX_CONCURRENT_UPSTREAM_CALLS: usize = 3;

/// Consecutive failures that open the circuit breaker.
pub const BREAKER_MAX_FAILURES: u32 = 3;

/// How long an open breaker short-circuits before letting a call through.
pub const BREAKER_RESET_TIMEOUT: Duration = Duration::from_secs(60);

// ---------------------------------------------------------------------------
// Cache warming
// ---------------------------------------------------------------------------

pub const WARM_BATCH_SIZE: usize = 2;
pub const WARM_BATCH_PAUSE: Duration = Duration::from_secs(1);

/// How many of the newest posts get warmed at startup.
pub const DEFAULT_WARM_TARGETS: usize = 10;

// ---------------------------------------------------------------------------
// Markdown conversion
// ---------------------------------------------------------------------------

/// Deepest block nesting fetched when converting a page to markdown.
pub const MARKDOWN_MAX_DEPTH: usize = 8;

/// Estimated characters per block, used to pre-allocate output strings.
pub const CHARS_PER_BLOCK_ESTIMATE: usize = 256;

// ---------------------------------------------------------------------------
// Client controller
// ---------------------------------------------------------------------------

pub const CLIENT_MAX_RETRIES: u32 = 3;
pub const CLIENT_RETRY_DELAY: Duration = Duration::from_secs(3);

pub const PROGRESS_TICK_INTERVAL: Duration = Duration::from_millis(200);
pub const PROGRESS_TICK_STEP: u8 = 5;

/// Synthetic progress stops here until the real response arrives.
pub const PROGRESS_TICK_CEILING: u8 = 70;

/// Pause between "Finalizing..." and the loaded state.
pub const PROGRESS_FINALIZE_DELAY: Duration = Duration::from_millis(300);
