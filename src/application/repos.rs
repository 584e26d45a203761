//! Repository traits describing persistence adapters.

use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::entities::{ContentTypeRecord, ItemStub};
use crate::domain::types::{ContentStatus, HourWindow, StatusFilter};

#[derive(Debug, Error)]
pub enum RepoError {
    #[error("persistence error: {0}")]
    Persistence(String),
    #[error("resource not found")]
    NotFound,
    #[error("invalid input: {message}")]
    InvalidInput { message: String },
    #[error("database timeout")]
    Timeout,
}

impl RepoError {
    pub fn from_persistence(err: impl std::fmt::Display) -> Self {
        Self::Persistence(err.to_string())
    }
}

#[derive(Debug, Clone, Default)]
pub struct ContentTypeFilter {
    pub public: Option<bool>,
}

impl ContentTypeFilter {
    pub fn public_only() -> Self {
        Self { public: Some(true) }
    }
}

/// Filtered item lookup.
#[derive(Debug, Clone)]
pub struct ItemQuery {
    pub types: Vec<String>,
    pub statuses: StatusFilter,
    pub tag_slug: Option<String>,
    pub category_slug: Option<String>,
    pub hour_window: Option<HourWindow>,
    pub limit: u32,
    /// Skip computing the total number of matching rows.
    pub skip_total_count: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemPage {
    pub items: Vec<ItemStub>,
    /// `None` when the query skipped total-row counting.
    pub total: Option<u64>,
}

/// Per-status item counts for one content type.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusCounts {
    counts: HashMap<ContentStatus, u64>,
}

impl StatusCounts {
    pub fn new(counts: HashMap<ContentStatus, u64>) -> Self {
        Self { counts }
    }

    pub fn get(&self, status: ContentStatus) -> u64 {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    pub fn published(&self) -> u64 {
        self.get(ContentStatus::Publish)
    }
}

impl FromIterator<(ContentStatus, u64)> for StatusCounts {
    fn from_iter<I: IntoIterator<Item = (ContentStatus, u64)>>(iter: I) -> Self {
        Self {
            counts: iter.into_iter().collect(),
        }
    }
}

#[async_trait]
pub trait ContentRepo: Send + Sync {
    /// Content types in their declared order.
    async fn list_content_types(
        &self,
        filter: &ContentTypeFilter,
    ) -> Result<Vec<ContentTypeRecord>, RepoError>;

    /// Item counts grouped by status. Unknown types yield `RepoError::NotFound`.
    async fn count_by_status(&self, type_slug: &str) -> Result<StatusCounts, RepoError>;

    async fn query_items(&self, query: &ItemQuery) -> Result<ItemPage, RepoError>;
}
