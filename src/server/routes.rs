// src/server/routes.rs
//! Handlers and wire shapes for the content API.

use crate::constants::API_REQUEST_TIMEOUT;
use crate::content::{BreakerSnapshot, CacheStats, ContentService, PerformanceTimer, QueueStats};
use crate::error::ContentError;
use crate::types::PageId;
use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Query string of `GET /api/content`.
#[derive(Debug, Default, Deserialize)]
pub struct ContentQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub id: Option<String>,
    #[serde(rename = "pageId")]
    pub page_id: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Collection,
    Document,
}

impl ContentKind {
    /// Accepts the current names and the older `database` / `page`.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "collection" | "database" => Some(Self::Collection),
            "document" | "page" => Some(Self::Document),
            _ => None,
        }
    }
}

/// `{ "success": true, "data": … }` or `{ "success": false, "error": … }`.
#[derive(Debug, Serialize)]
struct Envelope<T> {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
struct StatsBody {
    cache: CacheStats,
    queue: QueueStats,
    breaker: BreakerSnapshot,
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
}

fn success<T: Serialize>(data: T) -> Response {
    Json(Envelope {
        success: true,
        data: Some(data),
        error: None,
    })
    .into_response()
}

fn failure(status: StatusCode, message: String) -> Response {
    let body = Envelope::<()> {
        success: false,
        data: None,
        error: Some(message),
    };
    (status, Json(body)).into_response()
}

fn upstream_failure(err: &ContentError) -> Response {
    log::error!("Content API error: {}", err);
    failure(StatusCode::INTERNAL_SERVER_ERROR, error_message(err))
}

/// Client-facing message for a failed fetch.
pub(crate) fn error_message(err: &ContentError) -> String {
    match err {
        ContentError::Timeout { .. } => format!("Request timeout: {}", err),
        ContentError::CircuitOpen => format!("Circuit breaker open: {}", err),
        _ => format!("Notion API error: {}", err),
    }
}

pub async fn get_content(
    State(service): State<ContentService>,
    Query(params): Query<ContentQuery>,
) -> Response {
    let timer = PerformanceTimer::start("Total API request");
    let response = match tokio::time::timeout(API_REQUEST_TIMEOUT, handle_content(&service, params)).await {
        Ok(response) => response,
        Err(_) => upstream_failure(&ContentError::Timeout {
            label: "API request".to_string(),
            timeout: API_REQUEST_TIMEOUT,
        }),
    };
    timer.end();
    response
}

async fn handle_content(service: &ContentService, params: ContentQuery) -> Response {
    let Some(kind) = params.kind.as_deref().and_then(ContentKind::parse) else {
        return failure(StatusCode::BAD_REQUEST, "Invalid request".to_string());
    };

    match kind {
        ContentKind::Collection => match service.get_collection().await {
            Ok(pages) => success(pages),
            Err(err) => upstream_failure(&err),
        },
        ContentKind::Document => {
            let Some(raw_id) = params.id.as_deref().or(params.page_id.as_deref()) else {
                return failure(StatusCode::BAD_REQUEST, "Invalid request".to_string());
            };
            let id = match PageId::parse(raw_id) {
                Ok(id) => id,
                Err(err) => return failure(StatusCode::BAD_REQUEST, err.to_string()),
            };
            match service.get_document(&id).await {
                Ok(detail) => success(detail),
                Err(err) => upstream_failure(&err),
            }
        }
    }
}

pub async fn get_stats(State(service): State<ContentService>) -> impl IntoResponse {
    success(StatsBody {
        cache: service.cache_stats(),
        queue: service.queue_stats(),
        breaker: service.breaker_state(),
    })
}

pub async fn health_check() -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}
