//! Domain entities mirrored from persistent storage and cached aggregates.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use crate::domain::types::ContentStatus;

/// Display names for a content type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ContentTypeLabels {
    /// Plural name, e.g. "Posts".
    pub name: Option<String>,
    /// Singular name, e.g. "Post".
    pub singular_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentTypeRecord {
    pub slug: String,
    pub public: bool,
    pub labels: ContentTypeLabels,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentItemRecord {
    pub id: i64,
    pub content_type: String,
    pub title: String,
    pub status: ContentStatus,
    pub created_at: OffsetDateTime,
}

/// Minimal projection of a content item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemStub {
    pub id: i64,
    pub title: String,
}

/// Published-item count for one content type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TypeCount {
    pub count: u64,
    pub label: String,
}

/// Items matching the tag/category window, after exclusion.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CatTagResult {
    pub count: usize,
    pub items: Vec<ItemStub>,
}

impl CatTagResult {
    /// Build a result from a raw item set, dropping the item with `exclude_id`.
    ///
    /// `count` always equals `items.len()`.
    pub fn excluding(raw: &[ItemStub], exclude_id: i64) -> Self {
        let items: Vec<ItemStub> = raw
            .iter()
            .filter(|item| item.id != exclude_id)
            .cloned()
            .collect();
        Self {
            count: items.len(),
            items,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}
