// src/api/mod.rs
//! Notion API interaction: the ability to read the blog's content.
//!
//! Everything above this module talks to [`NotionRepository`], never to
//! HTTP directly, so caching and resilience can be tested against an
//! in-memory fake.

pub mod client;
pub mod parser;
mod responses;
mod simple_pagination;
mod types;

use crate::error::ContentError;
use crate::model::{BlockObject, PageObject};
use crate::types::{BlockId, DatabaseId, PageId};
use futures::future::{BoxFuture, FutureExt};

pub use client::NotionHttpClient;
pub use responses::{NotionErrorBody, PaginatedResponse};
pub use simple_pagination::fetch_all_pages_simple;
pub use types::{CollectionQuery, PaginationResult};

/// The ability to retrieve blog content from a Notion workspace.
#[async_trait::async_trait]
pub trait NotionRepository: Send + Sync {
    /// Runs a filtered, sorted query against a database. One request; the
    /// query's page size bounds the result.
    async fn query_database(
        &self,
        database: &DatabaseId,
        query: &CollectionQuery,
    ) -> Result<Vec<PageObject>, ContentError>;

    async fn retrieve_page(&self, id: &PageId) -> Result<PageObject, ContentError>;

    /// All direct children of a block or page, across every cursor page.
    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<BlockObject>, ContentError>;

    /// Fetches `root`'s children and, recursively, theirs, down to
    /// `max_depth` levels. Child pages are not descended into.
    async fn retrieve_block_tree(
        &self,
        root: &BlockId,
        max_depth: usize,
    ) -> Result<Vec<BlockObject>, ContentError> {
        fetch_tree(self, root.clone(), max_depth).await
    }
}

fn fetch_tree<'a, R>(
    repo: &'a R,
    parent: BlockId,
    depth_remaining: usize,
) -> BoxFuture<'a, Result<Vec<BlockObject>, ContentError>>
where
    R: NotionRepository + ?Sized,
{
    async move {
        let mut blocks = repo.retrieve_children(&parent).await?;
        if depth_remaining <= 1 {
            if blocks.iter().any(BlockObject::wants_children) {
                log::debug!(
                    "Depth limit reached under block {}; nested content omitted",
                    parent.short()
                );
            }
            return Ok(blocks);
        }

        // Siblings are fetched one at a time.
        for block in blocks.iter_mut().filter(|b| b.wants_children()) {
            block.children = fetch_tree(repo, block.id.clone(), depth_remaining - 1).await?;
        }
        Ok(blocks)
    }
    .boxed()
}
