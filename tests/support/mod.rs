//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use site_counts::application::repos::{
    ContentRepo, ContentTypeFilter, ItemPage, ItemQuery, RepoError, StatusCounts,
};
use site_counts::application::site_counts::SiteCountsQueries;
use site_counts::cache::{CacheConfig, CountsCache, ManualClock, MemoryTransientStore};
use site_counts::domain::entities::{ContentTypeLabels, ContentTypeRecord, ItemStub};
use site_counts::domain::types::ContentStatus;
use time::macros::datetime;

/// Content store whose tag/category matches are supplied up front.
#[derive(Default)]
pub struct StubContent {
    types: Vec<ContentTypeRecord>,
    published: Mutex<HashMap<String, u64>>,
    matches: Mutex<Vec<ItemStub>>,
    failing: AtomicBool,
    pub type_listings: AtomicUsize,
    pub item_queries: AtomicUsize,
}

impl StubContent {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_type(mut self, slug: &str, plural: &str, singular: &str, published: u64) -> Self {
        self.types.push(ContentTypeRecord {
            slug: slug.to_string(),
            public: true,
            labels: ContentTypeLabels {
                name: Some(plural.to_string()),
                singular_name: Some(singular.to_string()),
            },
        });
        self.set_published(slug, published);
        self
    }

    pub fn with_matches(self, ids: impl IntoIterator<Item = i64>) -> Self {
        self.set_matches(ids);
        self
    }

    pub fn set_published(&self, slug: &str, count: u64) {
        self.published
            .lock()
            .expect("published lock")
            .insert(slug.to_string(), count);
    }

    pub fn set_matches(&self, ids: impl IntoIterator<Item = i64>) {
        *self.matches.lock().expect("matches lock") = ids
            .into_iter()
            .map(|id| ItemStub {
                id,
                title: format!("Item {id}"),
            })
            .collect();
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn type_listings(&self) -> usize {
        self.type_listings.load(Ordering::SeqCst)
    }

    pub fn item_queries(&self) -> usize {
        self.item_queries.load(Ordering::SeqCst)
    }

    fn check(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            Err(RepoError::from_persistence("content store offline"))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl ContentRepo for StubContent {
    async fn list_content_types(
        &self,
        filter: &ContentTypeFilter,
    ) -> Result<Vec<ContentTypeRecord>, RepoError> {
        self.check()?;
        self.type_listings.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .types
            .iter()
            .filter(|record| filter.public.is_none_or(|public| record.public == public))
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, type_slug: &str) -> Result<StatusCounts, RepoError> {
        self.check()?;
        let published = self.published.lock().expect("published lock");
        let count = published.get(type_slug).copied().ok_or(RepoError::NotFound)?;
        Ok([(ContentStatus::Publish, count)].into_iter().collect())
    }

    async fn query_items(&self, query: &ItemQuery) -> Result<ItemPage, RepoError> {
        self.check()?;
        self.item_queries.fetch_add(1, Ordering::SeqCst);
        let matches = self.matches.lock().expect("matches lock");
        Ok(ItemPage {
            items: matches.iter().take(query.limit as usize).cloned().collect(),
            total: None,
        })
    }
}

pub struct Harness {
    pub content: Arc<StubContent>,
    pub clock: Arc<ManualClock>,
    pub store: Arc<MemoryTransientStore>,
    pub cache: Arc<CountsCache>,
}

/// Memory-backed cache over `content`, with a clock pinned to a weekday morning.
pub fn harness(content: StubContent) -> Harness {
    let content = Arc::new(content);
    let clock = Arc::new(ManualClock::new(datetime!(2024-05-06 10:00 UTC)));
    let store = Arc::new(MemoryTransientStore::with_clock(clock.clone()));
    let cache = Arc::new(CountsCache::new(
        store.clone(),
        SiteCountsQueries::new(content.clone()),
        &CacheConfig::default(),
    ));

    Harness {
        content,
        clock,
        store,
        cache,
    }
}

/// The product catalogue used by most scenarios.
pub fn catalogue() -> StubContent {
    StubContent::new()
        .with_type("post", "posts", "post", 1)
        .with_type("page", "pages", "page", 0)
        .with_type("product", "products", "product", 5)
}
