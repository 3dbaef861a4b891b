// src/api/responses.rs
//! Raw response envelopes from the Notion API.

use serde::Deserialize;

/// Cursor-paginated list envelope.
#[derive(Debug, Clone, Deserialize)]
pub struct PaginatedResponse<T> {
    #[serde(default)]
    pub object: String,
    pub results: Vec<T>,
    #[serde(default)]
    pub next_cursor: Option<String>,
    #[serde(default)]
    pub has_more: bool,
}

/// Body of a non-2xx Notion response.
#[derive(Debug, Clone, Deserialize)]
pub struct NotionErrorBody {
    pub status: u16,
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub request_id: Option<String>,
}
