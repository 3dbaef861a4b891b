// src/loader/endpoint.rs
//! The network seam between the loader and the content API.

use crate::constants::CLIENT_REQUEST_TIMEOUT;
use crate::content::with_timeout;
use crate::error::{AppError, ContentError};
use crate::model::DocumentDetail;
use crate::types::{PageId, ValidationError};
use reqwest::{header, Client};
use serde::Deserialize;

/// Something that can hand the loader one document.
#[async_trait::async_trait]
pub trait ContentEndpoint: Send + Sync {
    /// `bypass_cache` asks intermediaries for a fresh response.
    async fn fetch_document(
        &self,
        id: &PageId,
        bypass_cache: bool,
    ) -> Result<DocumentDetail, ContentError>;
}

#[derive(Debug, Deserialize)]
struct WireEnvelope {
    success: bool,
    #[serde(default)]
    data: Option<DocumentDetail>,
    #[serde(default)]
    error: Option<String>,
}

/// Talks to a running `GET /api/content` server.
#[derive(Clone)]
pub struct HttpContentEndpoint {
    client: Client,
    base_url: String,
}

impl HttpContentEndpoint {
    pub fn new(base_url: &str) -> Result<Self, AppError> {
        url::Url::parse(base_url).map_err(|e| ValidationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn request(&self, id: &PageId, bypass_cache: bool) -> Result<DocumentDetail, ContentError> {
        let url = format!("{}/api/content", self.base_url);
        let mut request = self
            .client
            .get(&url)
            .query(&[("type", "document"), ("id", id.as_str())]);
        if bypass_cache {
            request = request.header(header::CACHE_CONTROL, "no-cache");
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContentError::Network(e.to_string()))?;
        if !response.status().is_success() {
            return Err(ContentError::Network(format!(
                "HTTP error! status: {}",
                response.status().as_u16()
            )));
        }

        let envelope: WireEnvelope = response
            .json()
            .await
            .map_err(|e| ContentError::Network(format!("Unreadable response: {}", e)))?;

        match envelope {
            WireEnvelope {
                success: true,
                data: Some(detail),
                ..
            } => Ok(detail),
            WireEnvelope { error, .. } => Err(ContentError::Network(
                error.unwrap_or_else(|| "Failed to fetch content".to_string()),
            )),
        }
    }
}

#[async_trait::async_trait]
impl ContentEndpoint for HttpContentEndpoint {
    async fn fetch_document(
        &self,
        id: &PageId,
        bypass_cache: bool,
    ) -> Result<DocumentDetail, ContentError> {
        with_timeout(
            "Content request",
            CLIENT_REQUEST_TIMEOUT,
            self.request(id, bypass_cache),
        )
        .await
    }
}
