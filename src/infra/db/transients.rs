use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tracing::debug;

use crate::cache::{TransientError, TransientStore};

use super::PostgresRepositories;

/// Transient store backed by the `transients` table, shared by every process
/// connected to the same database.
#[derive(Clone)]
pub struct PgTransientStore {
    repos: PostgresRepositories,
}

impl PgTransientStore {
    pub fn new(repos: PostgresRepositories) -> Self {
        Self { repos }
    }

    /// Delete every expired row, returning how many were removed.
    pub async fn purge_expired(&self) -> Result<u64, TransientError> {
        let result = sqlx::query("DELETE FROM transients WHERE expires_at <= now()")
            .execute(self.repos.pool())
            .await
            .map_err(TransientError::unavailable)?;
        debug!(
            target = "infra::db::transients",
            removed = result.rows_affected(),
            "Purged expired transients"
        );
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl TransientStore for PgTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, TransientError> {
        sqlx::query_scalar::<_, Value>(
            "SELECT value FROM transients WHERE key = $1 AND expires_at > now()",
        )
        .bind(key)
        .fetch_optional(self.repos.pool())
        .await
        .map_err(TransientError::unavailable)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), TransientError> {
        sqlx::query(
            r#"
            INSERT INTO transients (key, value, expires_at)
            VALUES ($1, $2, now() + make_interval(secs => $3))
            ON CONFLICT (key) DO UPDATE
            SET value = EXCLUDED.value, expires_at = EXCLUDED.expires_at
            "#,
        )
        .bind(key)
        .bind(value)
        .bind(ttl.as_secs_f64())
        .execute(self.repos.pool())
        .await
        .map(|_| ())
        .map_err(TransientError::unavailable)
    }

    async fn invalidate(&self, key: &str) -> Result<(), TransientError> {
        sqlx::query("DELETE FROM transients WHERE key = $1")
            .bind(key)
            .execute(self.repos.pool())
            .await
            .map(|_| ())
            .map_err(TransientError::unavailable)
    }
}
