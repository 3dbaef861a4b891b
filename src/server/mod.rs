// src/server/mod.rs
//! HTTP boundary in front of [`ContentService`].

mod routes;

pub use routes::{ContentKind, ContentQuery};

use crate::content::ContentService;
use crate::error::AppError;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use tower_http::cors::CorsLayer;

/// Routes:
///
/// - `GET /api/content?type=collection`
/// - `GET /api/content?type=document&id=<page id>`
/// - `GET /api/content/stats`
/// - `GET /health`
pub fn router(service: ContentService) -> Router {
    Router::new()
        .route("/api/content", get(routes::get_content))
        .route("/api/content/stats", get(routes::get_stats))
        .route("/health", get(routes::health_check))
        .layer(CorsLayer::permissive())
        .with_state(service)
}

/// Binds `addr` and serves until the process is stopped.
pub async fn serve(service: ContentService, addr: SocketAddr) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    log::info!("Content API listening on http://{}", listener.local_addr()?);
    axum::serve(listener, router(service)).await?;
    Ok(())
}
