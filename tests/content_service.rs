mod common;

use common::*;
use futures::future::join_all;
use notion_blog::content::document_cache_key;
use notion_blog::{ContentError, ContentService, NotionErrorCode, ServiceOptions, TimeoutBudgets};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn test_concurrent_document_requests_share_one_fetch() {
    let repo = Arc::new(FakeRepository::with_posts(3).with_latency(Duration::from_millis(50)));
    let service = service_over(&repo);
    let id = page_id(1);

    let results = join_all((0..10).map(|_| service.get_document(&id))).await;

    assert!(results.iter().all(|r| r.is_ok()));
    assert_eq!(FakeRepository::count(&repo.page_calls), 1);
    assert_eq!(FakeRepository::count(&repo.children_calls), 1);
    assert_eq!(service.cache_stats().in_flight, 0);
}

#[tokio::test]
async fn test_document_detail_renders_body_and_metadata() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    let service = service_over(&repo);

    let detail = service.get_document(&page_id(1)).await.unwrap();

    assert_eq!(detail.body, "Body of post 1");
    assert!(!detail.partial);
    assert_eq!(
        notion_blog::page_title(detail.metadata.as_ref().unwrap()),
        "Post 1"
    );
}

#[tokio::test]
async fn test_nested_blocks_are_fetched_for_the_body() {
    let mut parent = paragraph("Intro");
    parent.has_children = true;
    let parent_id = parent.id.as_str().to_string();

    let repo = Arc::new(
        FakeRepository::with_posts(1)
            .with_children(page_id(1).as_str(), vec![parent])
            .with_children(&parent_id, vec![paragraph("Nested")]),
    );
    let service = service_over(&repo);

    let detail = service.get_document(&page_id(1)).await.unwrap();

    assert_eq!(detail.body, "Intro\n    Nested");
    assert_eq!(FakeRepository::count(&repo.children_calls), 2);
}

#[tokio::test]
async fn test_partial_detail_is_returned_and_cached() {
    let repo = Arc::new(FakeRepository::with_posts(2));
    repo.fail_body_of(&page_id(1));
    let service = service_over(&repo);

    let detail = service.get_document(&page_id(1)).await.unwrap();
    assert_eq!(detail.body, "");
    assert!(detail.metadata.is_some());
    assert!(detail.partial);

    let again = service.get_document(&page_id(1)).await.unwrap();
    assert_eq!(again, detail);
    assert_eq!(FakeRepository::count(&repo.page_calls), 1);
    assert_eq!(FakeRepository::count(&repo.children_calls), 1);
    assert_eq!(service.cache_stats().documents, 1);
}

#[tokio::test]
async fn test_both_halves_failing_still_yields_partial_detail() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    repo.set(&repo.fail_pages, true);
    repo.set(&repo.fail_children, true);
    let service = service_over(&repo);

    let detail = service.get_document(&page_id(1)).await.unwrap();

    assert_eq!(detail.body, "");
    assert_eq!(detail.metadata, None);
    assert!(detail.partial);
}

#[tokio::test(start_paused = true)]
async fn test_slow_metadata_times_out_into_partial_detail() {
    let repo = Arc::new(
        FakeRepository::with_posts(1).with_metadata_latency(Duration::from_secs(30)),
    );
    let service = service_over(&repo);

    let detail = service.get_document(&page_id(1)).await.unwrap();

    assert_eq!(detail.body, "Body of post 1");
    assert_eq!(detail.metadata, None);
    assert!(detail.partial);
}

#[tokio::test(start_paused = true)]
async fn test_collection_is_cached_for_five_minutes() {
    let repo = Arc::new(FakeRepository::with_posts(3));
    let service = service_over(&repo);

    let first = service.get_collection().await.unwrap();
    let second = service.get_collection().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(first[0].id, page_id(3));
    assert_eq!(FakeRepository::count(&repo.query_calls), 1);

    tokio::time::advance(Duration::from_secs(5 * 60 + 1)).await;
    service.get_collection().await.unwrap();
    assert_eq!(FakeRepository::count(&repo.query_calls), 2);
}

#[tokio::test(start_paused = true)]
async fn test_document_cache_outlives_collection_cache() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    let service = service_over(&repo);

    service.get_document(&page_id(1)).await.unwrap();
    tokio::time::advance(Duration::from_secs(9 * 60)).await;
    service.get_document(&page_id(1)).await.unwrap();
    assert_eq!(FakeRepository::count(&repo.page_calls), 1);

    tokio::time::advance(Duration::from_secs(61)).await;
    service.get_document(&page_id(1)).await.unwrap();
    assert_eq!(FakeRepository::count(&repo.page_calls), 2);
}

#[tokio::test]
async fn test_collection_failure_propagates_and_is_not_cached() {
    let repo = Arc::new(FakeRepository::with_posts(2));
    repo.set(&repo.fail_query, true);
    let service = service_over(&repo);

    let err = service.get_collection().await.unwrap_err();
    assert!(matches!(
        err,
        ContentError::Upstream {
            code: NotionErrorCode::ServiceUnavailable,
            ..
        }
    ));
    assert_eq!(service.cache_stats().collection, 0);

    repo.set(&repo.fail_query, false);
    assert_eq!(service.get_collection().await.unwrap().len(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_breaker_opens_after_three_failures_and_recovers() {
    let repo = Arc::new(FakeRepository::with_posts(2));
    repo.set(&repo.fail_query, true);
    let service = service_over(&repo);

    for _ in 0..3 {
        assert!(matches!(
            service.get_collection().await,
            Err(ContentError::Upstream { .. })
        ));
    }
    assert!(service.breaker_state().open);

    assert_eq!(
        service.get_collection().await.unwrap_err(),
        ContentError::CircuitOpen
    );
    assert_eq!(
        service.get_document(&page_id(1)).await.unwrap_err(),
        ContentError::CircuitOpen
    );
    assert_eq!(FakeRepository::count(&repo.query_calls), 3);
    assert_eq!(FakeRepository::count(&repo.page_calls), 0);

    repo.set(&repo.fail_query, false);
    tokio::time::advance(Duration::from_secs(60)).await;

    assert_eq!(service.get_collection().await.unwrap().len(), 2);
    assert_eq!(service.breaker_state().failure_count, 0);
}

#[tokio::test(start_paused = true)]
async fn test_upstream_concurrency_is_bounded_by_the_queue() {
    let repo = Arc::new(FakeRepository::with_posts(10).with_latency(Duration::from_millis(100)));
    let service = service_over(&repo);
    let ids: Vec<_> = (1..=10).map(page_id).collect();

    let results = join_all(ids.iter().map(|id| service.get_document(id))).await;

    assert!(results.iter().all(|r| r.as_ref().is_ok_and(|d| !d.partial)));
    assert_eq!(FakeRepository::count(&repo.page_calls), 10);
    assert_eq!(FakeRepository::count(&repo.peak_page_calls), 3);
    assert_eq!(service.queue_stats().running, 0);
    assert_eq!(service.queue_stats().queued, 0);
}

#[tokio::test(start_paused = true)]
async fn test_custom_budgets_apply() {
    let repo = Arc::new(FakeRepository::with_posts(1).with_latency(Duration::from_secs(2)));
    let options = ServiceOptions {
        budgets: TimeoutBudgets {
            collection_query: Duration::from_secs(1),
            ..TimeoutBudgets::default()
        },
        ..ServiceOptions::default()
    };
    let service = ContentService::with_options(repo.clone(), database_id(), options);

    let err = service.get_collection().await.unwrap_err();
    assert!(err.is_timeout());
    assert_eq!(err.to_string(), "Database query timed out after 1000ms");
}

#[tokio::test]
async fn test_clear_caches_forces_refetch() {
    let repo = Arc::new(FakeRepository::with_posts(1));
    let service = service_over(&repo);

    service.get_collection().await.unwrap();
    service.get_document(&page_id(1)).await.unwrap();
    let stats = service.cache_stats();
    assert_eq!((stats.collection, stats.documents), (1, 1));

    service.clear_caches();
    assert_eq!(service.cache_stats().documents, 0);

    service.get_document(&page_id(1)).await.unwrap();
    assert_eq!(FakeRepository::count(&repo.page_calls), 2);
}

#[test]
fn test_document_cache_keys_are_per_page() {
    assert_eq!(
        document_cache_key(&page_id(1)),
        "notion-page-00000000000000000000000000000001"
    );
}

#[tokio::test(start_paused = true)]
async fn test_abandoned_fetches_still_finish_and_free_the_queue() {
    let repo = Arc::new(FakeRepository::with_posts(4).with_latency(Duration::from_secs(2)));
    let service = service_over(&repo);

    for n in 1..=3 {
        let gave_up =
            tokio::time::timeout(Duration::from_millis(100), service.get_document(&page_id(n)))
                .await;
        assert!(gave_up.is_err());
    }

    tokio::time::sleep(Duration::from_secs(60)).await;
    assert_eq!(service.queue_stats().running, 0);
    let stats = service.cache_stats();
    assert_eq!((stats.documents, stats.in_flight), (3, 0));

    let collection =
        tokio::time::timeout(Duration::from_secs(30), service.get_collection()).await;
    assert_eq!(collection.unwrap().unwrap().len(), 4);

    // The abandoned fetches completed in time, so their cached details are whole.
    let detail = service.get_document(&page_id(2)).await.unwrap();
    assert!(!detail.partial);
    assert_eq!(detail.body, "Body of post 2");
    assert_eq!(FakeRepository::count(&repo.page_calls), 3);
}
