// src/content/timeout.rs
//! Deadline wrapper for upstream operations.

use crate::error::ContentError;
use std::future::Future;
use std::time::Duration;

/// Races `operation` against `budget`. On expiry the operation is dropped
/// and a [`ContentError::Timeout`] carrying `label` is returned.
pub async fn with_timeout<F, T>(label: &str, budget: Duration, operation: F) -> Result<T, ContentError>
where
    F: Future<Output = Result<T, ContentError>>,
{
    match tokio::time::timeout(budget, operation).await {
        Ok(outcome) => outcome,
        Err(_) => {
            log::warn!("{} exceeded its {}ms budget", label, budget.as_millis());
            Err(ContentError::Timeout {
                label: label.to_string(),
                timeout: budget,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn passes_through_results_within_budget() {
        let result = with_timeout("Quick", Duration::from_secs(1), async { Ok(3) }).await;
        assert_eq!(result, Ok(3));

        let failed: Result<(), _> = with_timeout("Quick", Duration::from_secs(1), async {
            Err(ContentError::EmptyContent)
        })
        .await;
        assert_eq!(failed, Err(ContentError::EmptyContent));
    }

    #[tokio::test(start_paused = true)]
    async fn fails_with_label_when_budget_is_exceeded() {
        let result: Result<(), _> = with_timeout("Page retrieval", Duration::from_secs(8), async {
            tokio::time::sleep(Duration::from_secs(30)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_timeout());
        assert_eq!(err.to_string(), "Page retrieval timed out after 8000ms");
    }
}
