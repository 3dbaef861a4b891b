// src/content/warmer.rs
//! Pre-populates the detail cache ahead of user navigation.

use super::service::ContentService;
use super::timer::PerformanceTimer;
use crate::constants::{WARM_BATCH_PAUSE, WARM_BATCH_SIZE};
use crate::model::PageObject;
use crate::types::PageId;
use futures::future::join_all;
use serde::Serialize;

/// What a warming pass achieved. Failures are counted, never returned.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct WarmReport {
    pub collection_warmed: bool,
    pub succeeded: usize,
    pub failed: usize,
}

/// The newest `limit` posts, in collection order.
pub fn select_warm_targets(pages: &[PageObject], limit: usize) -> Vec<PageId> {
    pages.iter().take(limit).map(|page| page.id.clone()).collect()
}

/// Fetches the collection alongside the given documents. Documents go in
/// sequential batches of [`WARM_BATCH_SIZE`] with a pause between batches;
/// within a batch they run concurrently.
pub async fn warm_cache(service: &ContentService, ids: &[PageId]) -> WarmReport {
    let timer = PerformanceTimer::start(format!("Cache warming ({} pages)", ids.len()));

    let collection = async {
        match service.get_collection().await {
            Ok(pages) => {
                log::debug!("Collection warmed with {} posts", pages.len());
                true
            }
            Err(err) => {
                log::warn!("Collection warming failed: {}", err);
                false
            }
        }
    };

    let documents = async {
        let batches: Vec<&[PageId]> = ids.chunks(WARM_BATCH_SIZE).collect();
        let mut succeeded = 0;
        let mut failed = 0;

        for (index, batch) in batches.iter().enumerate() {
            log::debug!("Processing batch {}/{}", index + 1, batches.len());
            let batch_timer = PerformanceTimer::start(format!("Batch {}", index + 1));

            let outcomes = join_all(batch.iter().map(|id| service.get_document(id))).await;
            for (id, outcome) in batch.iter().zip(outcomes) {
                match outcome {
                    Ok(_) => succeeded += 1,
                    Err(err) => {
                        log::warn!("Page {} warming failed: {}", id.short(), err);
                        failed += 1;
                    }
                }
            }
            batch_timer.end();

            if index + 1 < batches.len() {
                tokio::time::sleep(WARM_BATCH_PAUSE).await;
            }
        }

        (succeeded, failed)
    };

    let (collection_warmed, (succeeded, failed)) = tokio::join!(collection, documents);
    timer.end();

    let stats = service.cache_stats();
    log::info!(
        "Cache warming complete: {} successful, {} failed",
        succeeded,
        failed
    );
    log::info!(
        "Post-warming cache stats: {} collection, {} documents, {} in flight",
        stats.collection,
        stats.documents,
        stats.in_flight
    );

    WarmReport {
        collection_warmed,
        succeeded,
        failed,
    }
}
