// src/api/parser.rs
//! Turns raw Notion responses into domain values or typed errors.

use super::client::ApiResponse;
use super::responses::{NotionErrorBody, PaginatedResponse};
use crate::error::{ContentError, NotionErrorCode};
use crate::model::{BlockObject, PageObject};
use reqwest::StatusCode;

/// Longest body excerpt kept in a decode error.
const BODY_PREVIEW_LEN: usize = 500;

/// Parses a success body as `T`, or maps an error body to [`ContentError`].
pub fn parse_api_response<T>(result: ApiResponse<String>) -> Result<T, ContentError>
where
    T: serde::de::DeserializeOwned,
{
    if result.status.is_success() {
        parse_success(&result.data, &result.url)
    } else {
        Err(parse_error(&result.data, result.status, &result.url))
    }
}

fn parse_success<T>(body: &str, url: &str) -> Result<T, ContentError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_str(body).map_err(|e| {
        log::error!("Failed to parse response from {}: {}", url, e);
        ContentError::upstream(
            NotionErrorCode::MalformedResponse,
            format!("{} (body: {})", e, preview(body)),
        )
    })
}

fn parse_error(body: &str, status: StatusCode, url: &str) -> ContentError {
    if let Ok(notion_error) = serde_json::from_str::<NotionErrorBody>(body) {
        log::warn!(
            "Notion API error {} ({}) from {}{}",
            notion_error.status,
            notion_error.code,
            url,
            notion_error
                .request_id
                .as_deref()
                .map(|id| format!(" [request {}]", id))
                .unwrap_or_default()
        );
        return ContentError::upstream(
            NotionErrorCode::from_api_response(&notion_error.code),
            notion_error.message,
        );
    }

    ContentError::upstream(
        NotionErrorCode::from_http_status(status.as_u16()),
        format!("HTTP {} from {}", status, url),
    )
}

fn preview(body: &str) -> &str {
    if body.len() <= BODY_PREVIEW_LEN {
        return body;
    }
    let mut end = BODY_PREVIEW_LEN;
    while !body.is_char_boundary(end) {
        end -= 1;
    }
    &body[..end]
}

pub fn parse_page_response(result: ApiResponse<String>) -> Result<PageObject, ContentError> {
    parse_api_response(result)
}

pub fn parse_pages_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<PageObject>, ContentError> {
    parse_api_response(result)
}

pub fn parse_blocks_pagination(
    result: ApiResponse<String>,
) -> Result<PaginatedResponse<BlockObject>, ContentError> {
    parse_api_response(result)
}
