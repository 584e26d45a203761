use async_trait::async_trait;
use sqlx::{Postgres, QueryBuilder};

use crate::{
    application::repos::{
        ContentRepo, ContentTypeFilter, ItemPage, ItemQuery, RepoError, StatusCounts,
    },
    domain::{
        entities::{ContentTypeLabels, ContentTypeRecord, ItemStub},
        types::{ContentStatus, Taxonomy},
    },
};

use super::{PostgresRepositories, map_sqlx_error};

const ITEM_HOUR_EXPR: &str = "EXTRACT(HOUR FROM i.created_at AT TIME ZONE 'UTC')";

#[derive(sqlx::FromRow)]
struct ContentTypeRow {
    slug: String,
    is_public: bool,
    name: Option<String>,
    singular_name: Option<String>,
}

impl From<ContentTypeRow> for ContentTypeRecord {
    fn from(row: ContentTypeRow) -> Self {
        Self {
            slug: row.slug,
            public: row.is_public,
            labels: ContentTypeLabels {
                name: row.name,
                singular_name: row.singular_name,
            },
        }
    }
}

#[derive(sqlx::FromRow)]
struct ItemStubRow {
    id: i64,
    title: String,
}

impl From<ItemStubRow> for ItemStub {
    fn from(row: ItemStubRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
        }
    }
}

impl PostgresRepositories {
    fn push_term_filter(qb: &mut QueryBuilder<'_, Postgres>, taxonomy: Taxonomy, slug: &str) {
        qb.push(
            " AND EXISTS (SELECT 1 FROM content_item_terms it INNER JOIN terms t ON t.id = it.term_id WHERE it.item_id = i.id AND t.taxonomy = ",
        );
        qb.push_bind(taxonomy);
        qb.push(" AND t.slug = ");
        qb.push_bind(slug.to_string());
        qb.push(")");
    }

    fn apply_item_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ItemQuery) {
        qb.push(" WHERE i.content_type = ANY(");
        qb.push_bind(query.types.clone());
        qb.push(")");

        let statuses: Vec<String> = query
            .statuses
            .statuses()
            .into_iter()
            .map(|status| status.as_str().to_string())
            .collect();
        qb.push(" AND i.status::text = ANY(");
        qb.push_bind(statuses);
        qb.push(")");

        if let Some(tag) = query.tag_slug.as_deref() {
            Self::push_term_filter(qb, Taxonomy::PostTag, tag);
        }

        if let Some(category) = query.category_slug.as_deref() {
            Self::push_term_filter(qb, Taxonomy::Category, category);
        }

        if let Some(window) = query.hour_window {
            qb.push(" AND ");
            qb.push(ITEM_HOUR_EXPR);
            qb.push(" >= ");
            qb.push_bind(i32::from(window.start_hour));
            qb.push(" AND ");
            qb.push(ITEM_HOUR_EXPR);
            qb.push(" <= ");
            qb.push_bind(i32::from(window.end_hour));
        }
    }

    async fn count_items(&self, query: &ItemQuery) -> Result<u64, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM content_items i");
        Self::apply_item_filters(&mut qb, query);

        let total = qb
            .build_query_scalar::<i64>()
            .fetch_one(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Self::convert_count(total)
    }
}

#[async_trait]
impl ContentRepo for PostgresRepositories {
    async fn list_content_types(
        &self,
        filter: &ContentTypeFilter,
    ) -> Result<Vec<ContentTypeRecord>, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new(
            "SELECT slug, is_public, name, singular_name FROM content_types",
        );
        if let Some(public) = filter.public {
            qb.push(" WHERE is_public = ");
            qb.push_bind(public);
        }
        qb.push(" ORDER BY sort_order, slug");

        let rows = qb
            .build_query_as::<ContentTypeRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        Ok(rows.into_iter().map(ContentTypeRecord::from).collect())
    }

    async fn count_by_status(&self, type_slug: &str) -> Result<StatusCounts, RepoError> {
        let known: bool =
            sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM content_types WHERE slug = $1)")
                .bind(type_slug)
                .fetch_one(self.pool())
                .await
                .map_err(map_sqlx_error)?;
        if !known {
            return Err(RepoError::NotFound);
        }

        let rows: Vec<(ContentStatus, i64)> = sqlx::query_as(
            r#"
            SELECT status, COUNT(*)
            FROM content_items
            WHERE content_type = $1
            GROUP BY status
            "#,
        )
        .bind(type_slug)
        .fetch_all(self.pool())
        .await
        .map_err(map_sqlx_error)?;

        rows.into_iter()
            .map(|(status, count)| Ok((status, Self::convert_count(count)?)))
            .collect()
    }

    async fn query_items(&self, query: &ItemQuery) -> Result<ItemPage, RepoError> {
        let mut qb = QueryBuilder::<Postgres>::new("SELECT i.id, i.title FROM content_items i");
        Self::apply_item_filters(&mut qb, query);
        qb.push(" ORDER BY i.created_at DESC, i.id DESC LIMIT ");
        qb.push_bind(i64::from(query.limit));

        let rows = qb
            .build_query_as::<ItemStubRow>()
            .fetch_all(self.pool())
            .await
            .map_err(map_sqlx_error)?;

        let total = if query.skip_total_count {
            None
        } else {
            Some(self.count_items(query).await?)
        };

        Ok(ItemPage {
            items: rows.into_iter().map(ItemStub::from).collect(),
            total,
        })
    }
}
