// Shared fixtures: an in-memory Notion workspace with switches for
// latency and failures.
#![allow(dead_code)]

use chrono::{TimeZone, Utc};
use indexmap::IndexMap;
use notion_blog::api::{CollectionQuery, NotionRepository};
use notion_blog::model::blocks::TextPayload;
use notion_blog::model::PropertyValue;
use notion_blog::{
    BlockId, BlockKind, BlockObject, ContentError, ContentService, DatabaseId, NotionErrorCode,
    PageId, PageObject, RichText,
};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

pub fn page_id(n: u32) -> PageId {
    PageId::parse(&format!("{:032x}", n)).unwrap()
}

pub fn database_id() -> DatabaseId {
    DatabaseId::parse("d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0").unwrap()
}

pub fn page(n: u32, title: &str) -> PageObject {
    let mut properties = IndexMap::new();
    properties.insert(
        "Name".to_string(),
        PropertyValue::Title {
            title: vec![RichText::plain(title)],
        },
    );
    PageObject {
        id: page_id(n),
        created_time: Utc.with_ymd_and_hms(2024, 1, n.clamp(1, 28), 9, 0, 0).unwrap(),
        last_edited_time: Utc.with_ymd_and_hms(2024, 2, 1, 9, 0, 0).unwrap(),
        url: None,
        archived: false,
        properties,
    }
}

pub fn paragraph(text: &str) -> BlockObject {
    BlockObject::new(BlockKind::Paragraph {
        paragraph: TextPayload::plain(text),
    })
}

fn unavailable(what: &str) -> ContentError {
    ContentError::upstream(
        NotionErrorCode::ServiceUnavailable,
        format!("{} unavailable", what),
    )
}

/// In-memory stand-in for the Notion API.
#[derive(Default)]
pub struct FakeRepository {
    pages: Vec<PageObject>,
    children: HashMap<String, Vec<BlockObject>>,
    latency: Duration,
    metadata_latency: Duration,

    pub query_calls: AtomicUsize,
    pub page_calls: AtomicUsize,
    pub children_calls: AtomicUsize,

    pub fail_query: AtomicBool,
    pub fail_pages: AtomicBool,
    pub fail_children: AtomicBool,
    missing_bodies: Mutex<HashSet<String>>,

    active_page_calls: AtomicUsize,
    pub peak_page_calls: AtomicUsize,
    pub page_call_log: Mutex<Vec<(PageId, Instant)>>,
}

impl FakeRepository {
    /// `n` posts, each with a one-paragraph body.
    pub fn with_posts(n: u32) -> Self {
        let mut repo = Self::default();
        for i in 1..=n {
            let post = page(i, &format!("Post {}", i));
            repo.children.insert(
                post.id.as_str().to_string(),
                vec![paragraph(&format!("Body of post {}", i))],
            );
            repo.pages.push(post);
        }
        repo
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Extra delay on metadata retrieval only.
    pub fn with_metadata_latency(mut self, latency: Duration) -> Self {
        self.metadata_latency = latency;
        self
    }

    pub fn with_children(mut self, parent: &str, blocks: Vec<BlockObject>) -> Self {
        self.children.insert(parent.to_string(), blocks);
        self
    }

    pub fn fail_body_of(&self, id: &PageId) {
        self.missing_bodies.lock().insert(id.as_str().to_string());
    }

    pub fn set(&self, switch: &AtomicBool, on: bool) {
        switch.store(on, Ordering::SeqCst);
    }

    pub fn count(counter: &AtomicUsize) -> usize {
        counter.load(Ordering::SeqCst)
    }

    async fn delay(&self, extra: Duration) {
        let total = self.latency + extra;
        if !total.is_zero() {
            tokio::time::sleep(total).await;
        }
    }
}

#[async_trait::async_trait]
impl NotionRepository for FakeRepository {
    async fn query_database(
        &self,
        _database: &DatabaseId,
        query: &CollectionQuery,
    ) -> Result<Vec<PageObject>, ContentError> {
        self.query_calls.fetch_add(1, Ordering::SeqCst);
        self.delay(Duration::ZERO).await;
        if self.fail_query.load(Ordering::SeqCst) {
            return Err(unavailable("database"));
        }
        let mut pages = self.pages.clone();
        pages.sort_by(|a, b| b.created_time.cmp(&a.created_time));
        pages.truncate(query.page_size as usize);
        Ok(pages)
    }

    async fn retrieve_page(&self, id: &PageId) -> Result<PageObject, ContentError> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.page_call_log.lock().push((id.clone(), Instant::now()));
        let active = self.active_page_calls.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_page_calls.fetch_max(active, Ordering::SeqCst);

        self.delay(self.metadata_latency).await;
        self.active_page_calls.fetch_sub(1, Ordering::SeqCst);

        if self.fail_pages.load(Ordering::SeqCst) {
            return Err(unavailable("page"));
        }
        self.pages
            .iter()
            .find(|p| &p.id == id)
            .cloned()
            .ok_or_else(|| ContentError::upstream(NotionErrorCode::ObjectNotFound, "no such page"))
    }

    async fn retrieve_children(&self, parent: &BlockId) -> Result<Vec<BlockObject>, ContentError> {
        self.children_calls.fetch_add(1, Ordering::SeqCst);
        self.delay(Duration::ZERO).await;
        if self.fail_children.load(Ordering::SeqCst)
            || self.missing_bodies.lock().contains(parent.as_str())
        {
            return Err(unavailable("blocks"));
        }
        Ok(self.children.get(parent.as_str()).cloned().unwrap_or_default())
    }
}

pub fn service_over(repo: &Arc<FakeRepository>) -> ContentService {
    ContentService::new(repo.clone(), database_id())
}
