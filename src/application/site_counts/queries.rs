use std::sync::Arc;

use tracing::{debug, warn};

use crate::application::repos::{ContentRepo, ContentTypeFilter, ItemQuery, RepoError};
use crate::domain::entities::{ContentTypeRecord, ItemStub, TypeCount};
use crate::domain::types::{HourWindow, StatusFilter};

use super::SiteCountsError;

const SOURCE: &str = "application::site_counts::SiteCountsQueries";

pub const CAT_TAG_TYPES: [&str; 2] = ["post", "page"];
pub const CAT_TAG_TAG: &str = "foo";
pub const CAT_TAG_CATEGORY: &str = "baz";
pub const CAT_TAG_LIMIT: u32 = 5;

/// Read queries behind the two cached aggregates.
#[derive(Clone)]
pub struct SiteCountsQueries {
    content: Arc<dyn ContentRepo>,
}

impl SiteCountsQueries {
    pub fn new(content: Arc<dyn ContentRepo>) -> Self {
        Self { content }
    }

    /// Published counts for every public content type, in declared order.
    ///
    /// Types with missing label or count data are logged and skipped.
    pub async fn count_by_type(&self) -> Result<Vec<TypeCount>, SiteCountsError> {
        let types = self
            .content
            .list_content_types(&ContentTypeFilter::public_only())
            .await?;

        let mut counts = Vec::with_capacity(types.len());
        for content_type in &types {
            match self.type_count(content_type).await {
                Ok(count) => counts.push(count),
                Err(err @ SiteCountsError::MissingTypeMetadata { .. }) => {
                    warn!(
                        target = SOURCE,
                        type_slug = %content_type.slug,
                        error = %err,
                        "Skipping content type without metadata"
                    );
                }
                Err(err) => return Err(err),
            }
        }

        debug!(
            target = SOURCE,
            types = types.len(),
            counted = counts.len(),
            "Computed per-type published counts"
        );
        Ok(counts)
    }

    async fn type_count(
        &self,
        content_type: &ContentTypeRecord,
    ) -> Result<TypeCount, SiteCountsError> {
        let stats = match self.content.count_by_status(&content_type.slug).await {
            Ok(stats) => stats,
            Err(RepoError::NotFound) => {
                return Err(SiteCountsError::missing_metadata(
                    &content_type.slug,
                    "status counts",
                ));
            }
            Err(err) => return Err(err.into()),
        };

        let count = stats.published();
        let label = type_label(content_type, count)?;
        Ok(TypeCount { count, label })
    }

    /// The fixed tag/category/business-hours lookup.
    pub fn cat_tag_query() -> ItemQuery {
        ItemQuery {
            types: CAT_TAG_TYPES.iter().map(|slug| slug.to_string()).collect(),
            statuses: StatusFilter::Any,
            tag_slug: Some(CAT_TAG_TAG.to_string()),
            category_slug: Some(CAT_TAG_CATEGORY.to_string()),
            hour_window: Some(HourWindow::BUSINESS_HOURS),
            limit: CAT_TAG_LIMIT,
            skip_total_count: true,
        }
    }

    /// Up to five matching items in the store's default order.
    pub async fn query_cat_tag(&self) -> Result<Vec<ItemStub>, SiteCountsError> {
        let page = self.content.query_items(&Self::cat_tag_query()).await?;
        debug!(
            target = SOURCE,
            items = page.items.len(),
            "Queried tag/category shortlist"
        );
        Ok(page.items)
    }
}

/// Plural name when more than one item is published, singular otherwise.
fn type_label(content_type: &ContentTypeRecord, count: u64) -> Result<String, SiteCountsError> {
    let (label, field) = if count > 1 {
        (content_type.labels.name.as_deref(), "plural label")
    } else {
        (content_type.labels.singular_name.as_deref(), "singular label")
    };

    label
        .map(str::trim)
        .filter(|label| !label.is_empty())
        .map(str::to_string)
        .ok_or_else(|| SiteCountsError::missing_metadata(&content_type.slug, field))
}

#[cfg(test)]
mod tests {
    use time::macros::datetime;

    use super::*;
    use crate::application::site_counts::testing::{FakeContentRepo, content_type, item};
    use crate::domain::types::ContentStatus;

    #[tokio::test]
    async fn labels_follow_published_count() {
        let repo = FakeContentRepo::new()
            .with_type(content_type("post", "Posts", "Post"))
            .with_type(content_type("page", "Pages", "Page"))
            .with_type(content_type("product", "Products", "Product"))
            .with_published("post", 1)
            .with_published("product", 5);
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let counts = queries.count_by_type().await.expect("counts");

        assert_eq!(
            counts,
            vec![
                TypeCount {
                    count: 1,
                    label: "Post".to_string()
                },
                TypeCount {
                    count: 0,
                    label: "Page".to_string()
                },
                TypeCount {
                    count: 5,
                    label: "Products".to_string()
                },
            ]
        );
    }

    #[tokio::test]
    async fn private_types_are_not_counted() {
        let mut hidden = content_type("revision", "Revisions", "Revision");
        hidden.public = false;
        let repo = FakeContentRepo::new()
            .with_type(content_type("post", "Posts", "Post"))
            .with_type(hidden)
            .with_published("revision", 9);
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let counts = queries.count_by_type().await.expect("counts");
        assert_eq!(counts.len(), 1);
        assert_eq!(counts[0].label, "Post");
    }

    #[tokio::test]
    async fn drafts_do_not_contribute_to_counts() {
        let repo = FakeContentRepo::new()
            .with_type(content_type("post", "Posts", "Post"))
            .with_status_count("post", ContentStatus::Draft, 4)
            .with_published("post", 2);
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let counts = queries.count_by_type().await.expect("counts");
        assert_eq!(counts[0].count, 2);
    }

    #[tokio::test]
    async fn types_missing_labels_are_skipped() {
        let mut unlabeled = content_type("event", "Events", "Event");
        unlabeled.labels.name = None;
        let repo = FakeContentRepo::new()
            .with_type(unlabeled)
            .with_type(content_type("post", "Posts", "Post"))
            .with_published("event", 3);
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let counts = queries.count_by_type().await.expect("counts");
        assert_eq!(
            counts,
            vec![TypeCount {
                count: 0,
                label: "Post".to_string()
            }]
        );
    }

    #[tokio::test]
    async fn types_without_counts_are_skipped() {
        let repo = FakeContentRepo::new()
            .with_type(content_type("post", "Posts", "Post"))
            .with_type(content_type("ghost", "Ghosts", "Ghost"))
            .without_counts_for("ghost");
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let counts = queries.count_by_type().await.expect("counts");
        assert_eq!(counts.len(), 1);
    }

    #[tokio::test]
    async fn count_failures_propagate() {
        let repo = FakeContentRepo::new()
            .with_type(content_type("post", "Posts", "Post"))
            .failing();
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let err = queries.count_by_type().await.expect_err("query error");
        assert!(matches!(err, SiteCountsError::Query(_)));
    }

    #[tokio::test]
    async fn cat_tag_query_applies_every_filter() {
        let repo = FakeContentRepo::new()
            .with_item(item(1, "post", ContentStatus::Publish, datetime!(2024-05-01 10:00 UTC)), &["foo"], &["baz"])
            .with_item(item(2, "page", ContentStatus::Draft, datetime!(2024-05-01 17:30 UTC)), &["foo"], &["baz"])
            .with_item(item(3, "post", ContentStatus::Publish, datetime!(2024-05-01 08:59 UTC)), &["foo"], &["baz"])
            .with_item(item(4, "post", ContentStatus::Publish, datetime!(2024-05-01 18:00 UTC)), &["foo"], &["baz"])
            .with_item(item(5, "post", ContentStatus::Trash, datetime!(2024-05-01 12:00 UTC)), &["foo"], &["baz"])
            .with_item(item(6, "product", ContentStatus::Publish, datetime!(2024-05-01 12:00 UTC)), &["foo"], &["baz"])
            .with_item(item(7, "post", ContentStatus::Publish, datetime!(2024-05-01 12:00 UTC)), &["foo"], &[])
            .with_item(item(8, "post", ContentStatus::Publish, datetime!(2024-05-01 12:00 UTC)), &[], &["baz"]);
        let queries = SiteCountsQueries::new(Arc::new(repo));

        let items = queries.query_cat_tag().await.expect("items");
        let ids: Vec<i64> = items.iter().map(|item| item.id).collect();
        assert_eq!(ids, vec![2, 1]);
    }

    #[tokio::test]
    async fn cat_tag_query_is_limited_to_five() {
        let mut repo = FakeContentRepo::new();
        for id in 1..=8 {
            repo = repo.with_item(
                item(id, "post", ContentStatus::Publish, datetime!(2024-05-01 12:00 UTC)),
                &["foo"],
                &["baz"],
            );
        }
        let repo = Arc::new(repo);
        let queries = SiteCountsQueries::new(repo.clone());

        let items = queries.query_cat_tag().await.expect("items");
        assert_eq!(items.len(), 5);
        assert_eq!(repo.last_total(), None);
    }

    #[tokio::test]
    async fn cat_tag_query_with_no_matches_is_empty() {
        let queries = SiteCountsQueries::new(Arc::new(FakeContentRepo::new()));
        let items = queries.query_cat_tag().await.expect("items");
        assert!(items.is_empty());
    }
}
