// src/api/client.rs
//! Thin reqwest wrapper for the Notion API.
//!
//! Handles authentication headers and transport; parsing lives in
//! [`super::parser`].

use super::types::CollectionQuery;
use crate::constants::{NOTION_API_BASE_URL, NOTION_API_VERSION, NOTION_HTTP_TIMEOUT};
use crate::error::{AppError, ContentError};
use crate::model::{BlockObject, PageObject};
use crate::types::{ApiKey, BlockId, DatabaseId, PageId, ValidationError};
use reqwest::{header, Client, Response};
use serde::Serialize;

/// Authenticated HTTP client for `api.notion.com`.
#[derive(Clone)]
pub struct NotionHttpClient {
    client: Client,
    base_url: String,
}

impl NotionHttpClient {
    pub fn new(api_key: &ApiKey) -> Result<Self, AppError> {
        Self::with_base_url(api_key, NOTION_API_BASE_URL)
    }

    /// Points the client at a different API root, e.g. a local mock.
    pub fn with_base_url(api_key: &ApiKey, base_url: &str) -> Result<Self, AppError> {
        url::Url::parse(base_url).map_err(|e| ValidationError::InvalidUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        let client = Client::builder()
            .default_headers(Self::create_headers(api_key)?)
            .timeout(NOTION_HTTP_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn create_headers(api_key: &ApiKey) -> Result<header::HeaderMap, AppError> {
        let mut headers = header::HeaderMap::new();

        let auth_header = format!("Bearer {}", api_key.as_str());
        headers.insert(
            header::AUTHORIZATION,
            header::HeaderValue::from_str(&auth_header).map_err(|e| {
                AppError::MissingConfiguration(format!("Invalid API token format: {}", e))
            })?,
        );
        headers.insert(
            "Notion-Version",
            header::HeaderValue::from_static(NOTION_API_VERSION),
        );
        headers.insert(
            header::CONTENT_TYPE,
            header::HeaderValue::from_static("application/json"),
        );

        Ok(headers)
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}/{}", self.base_url, endpoint)
    }

    pub async fn get(&self, endpoint: &str, query: &[(&str, String)]) -> Result<Response, ContentError> {
        let url = self.url(endpoint);
        log::debug!("GET {}", url);
        Ok(self.client.get(url).query(query).send().await?)
    }

    pub async fn post<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &T,
    ) -> Result<Response, ContentError> {
        let url = self.url(endpoint);
        log::debug!("POST {}", url);
        let response = self.client.post(url).json(body).send().await?;
        log::debug!("POST {} -> {}", endpoint, response.status());
        Ok(response)
    }
}

#[async_trait::async_trait]
impl super::NotionRepository for NotionHttpClient {
    async fn query_database(
        &self,
        database: &DatabaseId,
        query: &CollectionQuery,
    ) -> Result<Vec<PageObject>, ContentError> {
        let endpoint = format!("databases/{}/query", database.to_dashed());
        log::info!(
            "Querying database {} ({} = {}, limit {})",
            database.short(),
            query.status_property,
            query.status_value,
            query.page_size
        );
        let response = self.post(&endpoint, &query.to_body()).await?;
        let result = extract_response_text(response).await?;
        let page = super::parser::parse_pages_pagination(result)?;
        Ok(page.results)
    }

    async fn retrieve_page(&self, id: &PageId) -> Result<PageObject, ContentError> {
        let endpoint = format!("pages/{}", id.to_dashed());
        let response = self.get(&endpoint, &[]).await?;
        let result = extract_response_text(response).await?;
        super::parser::parse_page_response(result)
    }

    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<BlockObject>, ContentError> {
        let endpoint = format!("blocks/{}/children", parent.to_dashed());
        let pagination_result = super::simple_pagination::fetch_all_pages_simple(
            |page_size, cursor| {
                let endpoint = endpoint.clone();
                async move {
                    let mut query = vec![("page_size", page_size.to_string())];
                    if let Some(cursor) = cursor {
                        query.push(("start_cursor", cursor));
                    }
                    let response = self.get(&endpoint, &query).await?;
                    let result = extract_response_text(response).await?;
                    super::parser::parse_blocks_pagination(result)
                }
            },
            None,
        )
        .await?;

        log::debug!(
            "Fetched {} children of {} across {} page(s)",
            pagination_result.items.len(),
            parent.short(),
            pagination_result.pages_fetched
        );
        Ok(pagination_result.items)
    }
}

/// Result of an HTTP operation with response metadata.
#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: reqwest::StatusCode,
    pub url: String,
}

/// Reads the body as text, keeping status and URL for error reporting.
pub async fn extract_response_text(response: Response) -> Result<ApiResponse<String>, ContentError> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response.text().await?;

    Ok(ApiResponse {
        data: text,
        status,
        url,
    })
}
