mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use common::*;
use notion_blog::server::router;
use pretty_assertions::assert_eq;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

async fn get(repo: &Arc<FakeRepository>, uri: &str) -> (StatusCode, Value) {
    get_from(&service_over(repo), uri).await
}

async fn get_from(service: &notion_blog::ContentService, uri: &str) -> (StatusCode, Value) {
    let response = router(service.clone())
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn test_collection_returns_summaries() {
    let repo = Arc::new(FakeRepository::with_posts(3));

    let (status, body) = get(&repo, "/api/content?type=collection").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let data = body["data"].as_array().unwrap();
    assert_eq!(data.len(), 3);
    assert_eq!(data[0]["id"], page_id(3).as_str());
    assert_eq!(data[0]["properties"]["Name"]["type"], "title");
}

#[tokio::test]
async fn test_document_returns_body_metadata_and_partial_flag() {
    let repo = Arc::new(FakeRepository::with_posts(2));
    let uri = format!("/api/content?type=document&id={}", page_id(2).to_dashed());

    let (status, body) = get(&repo, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["body"], "Body of post 2");
    assert_eq!(body["data"]["partial"], false);
    assert_eq!(body["data"]["metadata"]["id"], page_id(2).as_str());
}

#[tokio::test]
async fn test_legacy_parameter_names_are_accepted() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    let service = service_over(&repo);

    let uri = format!("/api/content?type=page&pageId={}", page_id(1));
    let (status, body) = get_from(&service, &uri).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["body"], "Body of post 1");

    let (status, _) = get_from(&service, "/api/content?type=database").await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_partial_documents_are_still_successful() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    repo.fail_body_of(&page_id(1));
    let uri = format!("/api/content?type=document&id={}", page_id(1));

    let (status, body) = get(&repo, &uri).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["body"], "");
    assert_eq!(body["data"]["partial"], true);
}

#[tokio::test]
async fn test_bad_requests_are_rejected() {
    let repo = Arc::new(FakeRepository::with_posts(1));

    for uri in [
        "/api/content",
        "/api/content?type=everything",
        "/api/content?type=document",
        "/api/content?type=document&id=not-a-notion-id",
    ] {
        let (status, body) = get(&repo, uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert_eq!(body["success"], false, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
    assert_eq!(FakeRepository::count(&repo.query_calls), 0);
    assert_eq!(FakeRepository::count(&repo.page_calls), 0);
}

#[tokio::test]
async fn test_upstream_failures_become_500() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    repo.set(&repo.fail_query, true);
    let service = service_over(&repo);

    let (status, body) = get_from(&service, "/api/content?type=collection").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(
        body["error"],
        "Notion API error: Notion API returned an error (service_unavailable): database unavailable"
    );

    get_from(&service, "/api/content?type=collection").await;
    get_from(&service, "/api/content?type=collection").await;

    let (status, body) = get_from(&service, "/api/content?type=collection").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["error"],
        "Circuit breaker open: Circuit breaker is open"
    );
}

#[tokio::test]
async fn test_stats_report_cache_queue_and_breaker() {
    let repo = Arc::new(FakeRepository::with_posts(2));
    let service = service_over(&repo);
    service.get_document(&page_id(1)).await.unwrap();

    let (status, body) = get_from(&service, "/api/content/stats").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["cache"]["documents"], 1);
    assert_eq!(body["data"]["cache"]["collection"], 0);
    assert_eq!(body["data"]["queue"]["max_concurrent"], 3);
    assert_eq!(body["data"]["breaker"]["open"], false);
}

#[tokio::test]
async fn test_health_check() {
    let repo = Arc::new(FakeRepository::with_posts(0));

    let (status, body) = get(&repo, "/health").await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
