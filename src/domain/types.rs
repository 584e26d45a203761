//! Shared domain enumerations aligned with persisted database enums.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a content item (mirrors Postgres enum `content_status`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "content_status", rename_all = "snake_case")]
pub enum ContentStatus {
    Publish,
    Future,
    Draft,
    Pending,
    Private,
    Trash,
    AutoDraft,
    Inherit,
}

impl ContentStatus {
    pub const ALL: [ContentStatus; 8] = [
        ContentStatus::Publish,
        ContentStatus::Future,
        ContentStatus::Draft,
        ContentStatus::Pending,
        ContentStatus::Private,
        ContentStatus::Trash,
        ContentStatus::AutoDraft,
        ContentStatus::Inherit,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ContentStatus::Publish => "publish",
            ContentStatus::Future => "future",
            ContentStatus::Draft => "draft",
            ContentStatus::Pending => "pending",
            ContentStatus::Private => "private",
            ContentStatus::Trash => "trash",
            ContentStatus::AutoDraft => "auto_draft",
            ContentStatus::Inherit => "inherit",
        }
    }

    /// Statuses hidden from `any` queries.
    pub fn excluded_from_any(self) -> bool {
        matches!(self, ContentStatus::Trash | ContentStatus::AutoDraft)
    }
}

/// Status predicate applied by item queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StatusFilter {
    /// Every status except trashed and auto-draft items.
    Any,
    Only(Vec<ContentStatus>),
}

impl StatusFilter {
    pub fn matches(&self, status: ContentStatus) -> bool {
        match self {
            StatusFilter::Any => !status.excluded_from_any(),
            StatusFilter::Only(statuses) => statuses.contains(&status),
        }
    }

    /// Concrete statuses selected by this filter, in declaration order.
    pub fn statuses(&self) -> Vec<ContentStatus> {
        ContentStatus::ALL
            .into_iter()
            .filter(|status| self.matches(*status))
            .collect()
    }
}

/// Taxonomy a term belongs to (mirrors Postgres enum `term_taxonomy`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(type_name = "term_taxonomy", rename_all = "snake_case")]
pub enum Taxonomy {
    Category,
    PostTag,
}

/// Inclusive hour-of-day range applied to an item's creation time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HourWindow {
    pub start_hour: u8,
    pub end_hour: u8,
}

impl HourWindow {
    pub const BUSINESS_HOURS: HourWindow = HourWindow {
        start_hour: 9,
        end_hour: 17,
    };

    pub fn contains(&self, hour: u8) -> bool {
        hour >= self.start_hour && hour <= self.end_hour
    }
}
