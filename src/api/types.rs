// src/api/types.rs
//! Request and result shapes for the Notion API module.

use crate::constants::COLLECTION_RESULT_LIMIT;
use serde_json::{json, Value};

/// The blog's published-posts query: one select filter, newest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionQuery {
    pub status_property: String,
    pub status_value: String,
    pub page_size: u32,
}

impl Default for CollectionQuery {
    fn default() -> Self {
        Self {
            status_property: "Status".to_string(),
            status_value: "Blogs".to_string(),
            page_size: COLLECTION_RESULT_LIMIT,
        }
    }
}

impl CollectionQuery {
    /// Request body for `POST databases/{id}/query`.
    pub fn to_body(&self) -> Value {
        json!({
            "filter": {
                "property": self.status_property,
                "select": { "equals": self.status_value }
            },
            "sorts": [
                { "timestamp": "created_time", "direction": "descending" }
            ],
            "page_size": self.page_size,
        })
    }
}

/// Everything gathered from a cursor-paginated endpoint.
#[derive(Debug, Clone)]
pub struct PaginationResult<T> {
    pub items: Vec<T>,
    pub pages_fetched: u32,
}
