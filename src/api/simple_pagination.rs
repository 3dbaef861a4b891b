// src/api/simple_pagination.rs
//! Cursor pagination over async closures.

use super::responses::PaginatedResponse;
use super::types::PaginationResult;
use crate::constants::NOTION_API_PAGE_SIZE;
use crate::error::ContentError;
use std::future::Future;

/// Calls `fetch_fn(page_size, cursor)` until the endpoint reports no more
/// results or `max_pages` is reached.
pub async fn fetch_all_pages_simple<T, F, Fut>(
    mut fetch_fn: F,
    max_pages: Option<u32>,
) -> Result<PaginationResult<T>, ContentError>
where
    F: FnMut(u32, Option<String>) -> Fut,
    Fut: Future<Output = Result<PaginatedResponse<T>, ContentError>>,
{
    let mut items = Vec::new();
    let mut cursor = None;
    let mut pages_fetched = 0u32;

    loop {
        if let Some(max) = max_pages {
            if pages_fetched >= max {
                log::debug!("Reached maximum page limit: {}", max);
                break;
            }
        }

        let response = fetch_fn(NOTION_API_PAGE_SIZE, cursor).await?;
        pages_fetched += 1;
        cursor = response.next_cursor;
        items.extend(response.results);

        if !response.has_more || cursor.is_none() {
            break;
        }
    }

    Ok(PaginationResult {
        items,
        pages_fetched,
    })
}
