//! In-memory content repository for unit tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::application::repos::{
    ContentRepo, ContentTypeFilter, ItemPage, ItemQuery, RepoError, StatusCounts,
};
use crate::domain::entities::{ContentItemRecord, ContentTypeLabels, ContentTypeRecord, ItemStub};
use crate::domain::types::ContentStatus;

pub(crate) fn content_type(slug: &str, name: &str, singular_name: &str) -> ContentTypeRecord {
    ContentTypeRecord {
        slug: slug.to_string(),
        public: true,
        labels: ContentTypeLabels {
            name: Some(name.to_string()),
            singular_name: Some(singular_name.to_string()),
        },
    }
}

pub(crate) fn item(
    id: i64,
    content_type: &str,
    status: ContentStatus,
    created_at: OffsetDateTime,
) -> ContentItemRecord {
    ContentItemRecord {
        id,
        content_type: content_type.to_string(),
        title: format!("Item {id}"),
        status,
        created_at,
    }
}

struct StoredItem {
    record: ContentItemRecord,
    tags: Vec<String>,
    categories: Vec<String>,
}

#[derive(Default)]
pub(crate) struct FakeContentRepo {
    types: Vec<ContentTypeRecord>,
    counts: Mutex<HashMap<String, HashMap<ContentStatus, u64>>>,
    uncounted: Vec<String>,
    items: Mutex<Vec<StoredItem>>,
    failing: AtomicBool,
    type_queries: AtomicUsize,
    item_queries: AtomicUsize,
    last_total: Mutex<Option<u64>>,
}

impl FakeContentRepo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_type(mut self, record: ContentTypeRecord) -> Self {
        self.types.push(record);
        self
    }

    pub(crate) fn with_published(self, slug: &str, count: u64) -> Self {
        self.with_status_count(slug, ContentStatus::Publish, count)
    }

    pub(crate) fn with_status_count(self, slug: &str, status: ContentStatus, count: u64) -> Self {
        self.set_status_count(slug, status, count);
        self
    }

    pub(crate) fn without_counts_for(mut self, slug: &str) -> Self {
        self.uncounted.push(slug.to_string());
        self
    }

    pub(crate) fn with_item(
        self,
        record: ContentItemRecord,
        tags: &[&str],
        categories: &[&str],
    ) -> Self {
        self.add_item(record, tags, categories);
        self
    }

    pub(crate) fn failing(self) -> Self {
        self.set_failing(true);
        self
    }

    pub(crate) fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub(crate) fn set_status_count(&self, slug: &str, status: ContentStatus, count: u64) {
        self.counts
            .lock()
            .expect("counts lock")
            .entry(slug.to_string())
            .or_default()
            .insert(status, count);
    }

    pub(crate) fn add_item(&self, record: ContentItemRecord, tags: &[&str], categories: &[&str]) {
        self.items.lock().expect("items lock").push(StoredItem {
            record,
            tags: tags.iter().map(|tag| tag.to_string()).collect(),
            categories: categories.iter().map(|cat| cat.to_string()).collect(),
        });
    }

    pub(crate) fn type_queries(&self) -> usize {
        self.type_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn item_queries(&self) -> usize {
        self.item_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn last_total(&self) -> Option<u64> {
        *self.last_total.lock().expect("total lock")
    }

    fn check_failing(&self) -> Result<(), RepoError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(RepoError::from_persistence("connection refused"));
        }
        Ok(())
    }
}

#[async_trait]
impl ContentRepo for FakeContentRepo {
    async fn list_content_types(
        &self,
        filter: &ContentTypeFilter,
    ) -> Result<Vec<ContentTypeRecord>, RepoError> {
        self.type_queries.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;
        Ok(self
            .types
            .iter()
            .filter(|record| filter.public.is_none_or(|public| record.public == public))
            .cloned()
            .collect())
    }

    async fn count_by_status(&self, type_slug: &str) -> Result<StatusCounts, RepoError> {
        self.check_failing()?;
        if self.uncounted.iter().any(|slug| slug == type_slug) {
            return Err(RepoError::NotFound);
        }
        let counts = self.counts.lock().expect("counts lock");
        Ok(counts
            .get(type_slug)
            .map(|by_status| StatusCounts::new(by_status.clone()))
            .unwrap_or_default())
    }

    async fn query_items(&self, query: &ItemQuery) -> Result<ItemPage, RepoError> {
        self.item_queries.fetch_add(1, Ordering::SeqCst);
        self.check_failing()?;

        let items = self.items.lock().expect("items lock");
        let mut matching: Vec<&StoredItem> = items
            .iter()
            .filter(|stored| query.types.contains(&stored.record.content_type))
            .filter(|stored| query.statuses.matches(stored.record.status))
            .filter(|stored| {
                query
                    .tag_slug
                    .as_ref()
                    .is_none_or(|tag| stored.tags.contains(tag))
            })
            .filter(|stored| {
                query
                    .category_slug
                    .as_ref()
                    .is_none_or(|category| stored.categories.contains(category))
            })
            .filter(|stored| {
                query
                    .hour_window
                    .is_none_or(|window| window.contains(stored.record.created_at.hour()))
            })
            .collect();

        matching.sort_by(|a, b| {
            b.record
                .created_at
                .cmp(&a.record.created_at)
                .then(b.record.id.cmp(&a.record.id))
        });

        let total = (!query.skip_total_count).then_some(matching.len() as u64);
        *self.last_total.lock().expect("total lock") = total;

        Ok(ItemPage {
            items: matching
                .into_iter()
                .take(query.limit as usize)
                .map(|stored| ItemStub {
                    id: stored.record.id,
                    title: stored.record.title.clone(),
                })
                .collect(),
            total,
        })
    }
}
