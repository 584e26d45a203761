//! Read-through cache over the two block aggregates.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use serde::{Serialize, de::DeserializeOwned};
use tracing::{debug, info, warn};

use crate::application::site_counts::{SiteCountsError, SiteCountsQueries};
use crate::domain::entities::{CatTagResult, ItemStub, TypeCount};

use super::config::CacheConfig;
use super::keys::TransientKey;
use super::store::TransientStore;

const SOURCE: &str = "cache::counts";
const METRIC_HIT: &str = "site_counts_transient_hit_total";
const METRIC_MISS: &str = "site_counts_transient_miss_total";
const METRIC_REBUILD: &str = "site_counts_transient_rebuild_total";
const METRIC_UNAVAILABLE: &str = "site_counts_transient_unavailable_total";

/// Serves `posts_by_type` and `posts_by_cat_tag` from a transient store,
/// recomputing through [`SiteCountsQueries`] on miss, expiry or force.
///
/// Backend failures degrade to recomputation; query failures propagate.
pub struct CountsCache {
    store: Option<Arc<dyn TransientStore>>,
    queries: SiteCountsQueries,
    ttl: Duration,
    namespace: String,
}

impl CountsCache {
    /// Create a cache over `store`. A disabled config bypasses the store.
    pub fn new(
        store: Arc<dyn TransientStore>,
        queries: SiteCountsQueries,
        config: &CacheConfig,
    ) -> Self {
        Self {
            store: config.enabled.then_some(store),
            queries,
            ttl: config.ttl(),
            namespace: config.namespace.clone(),
        }
    }

    /// A cache that never stores anything; every lookup recomputes.
    pub fn uncached(queries: SiteCountsQueries) -> Self {
        let config = CacheConfig::default();
        Self {
            store: None,
            queries,
            ttl: config.ttl(),
            namespace: config.namespace,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Published counts per public type, cached for the TTL.
    pub async fn get_type_counts(&self, force: bool) -> Result<Vec<TypeCount>, SiteCountsError> {
        let key = TransientKey::PostsByType;
        if !force {
            if let Some(cached) = self.read::<Vec<TypeCount>>(key).await {
                return Ok(cached);
            }
        }

        let fresh = self.queries.count_by_type().await?;
        self.write(key, &fresh, force).await;
        Ok(fresh)
    }

    /// The tag/category shortlist without `exclude_id`.
    ///
    /// The raw set is cached before exclusion so a single entry serves every
    /// rendered item.
    pub async fn get_cat_tag_result(
        &self,
        exclude_id: i64,
        force: bool,
    ) -> Result<CatTagResult, SiteCountsError> {
        let key = TransientKey::PostsByCatTag;
        let cached = if force {
            None
        } else {
            self.read::<Vec<ItemStub>>(key).await
        };

        let raw = match cached {
            Some(raw) => raw,
            None => {
                let fresh = self.queries.query_cat_tag().await?;
                self.write(key, &fresh, force).await;
                fresh
            }
        };

        Ok(CatTagResult::excluding(&raw, exclude_id))
    }

    async fn read<T: DeserializeOwned>(&self, key: TransientKey) -> Option<T> {
        let store = self.store.as_ref()?;
        let storage_key = key.storage_key(&self.namespace);

        match store.get(&storage_key).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(decoded) => {
                    counter!(METRIC_HIT, "key" => key.name()).increment(1);
                    debug!(target = SOURCE, key = key.name(), "Transient hit");
                    Some(decoded)
                }
                Err(err) => {
                    counter!(METRIC_MISS, "key" => key.name()).increment(1);
                    warn!(
                        target = SOURCE,
                        key = key.name(),
                        error = %err,
                        "Discarding undecodable transient"
                    );
                    None
                }
            },
            Ok(None) => {
                counter!(METRIC_MISS, "key" => key.name()).increment(1);
                debug!(target = SOURCE, key = key.name(), "Transient miss");
                None
            }
            Err(err) => {
                counter!(METRIC_UNAVAILABLE, "key" => key.name(), "op" => "get").increment(1);
                warn!(
                    target = SOURCE,
                    key = key.name(),
                    error = %err,
                    "Transient backend unavailable; recomputing"
                );
                None
            }
        }
    }

    async fn write<T: Serialize>(&self, key: TransientKey, value: &T, forced: bool) {
        counter!(METRIC_REBUILD, "key" => key.name()).increment(1);
        let Some(store) = self.store.as_ref() else {
            return;
        };

        let encoded = match serde_json::to_value(value) {
            Ok(encoded) => encoded,
            Err(err) => {
                warn!(
                    target = SOURCE,
                    key = key.name(),
                    error = %err,
                    "Failed to encode transient"
                );
                return;
            }
        };

        let storage_key = key.storage_key(&self.namespace);
        match store.set(&storage_key, encoded, self.ttl).await {
            Ok(()) => {
                info!(
                    target = SOURCE,
                    key = key.name(),
                    forced,
                    ttl_seconds = self.ttl.as_secs(),
                    "Transient rebuilt"
                );
            }
            Err(err) => {
                counter!(METRIC_UNAVAILABLE, "key" => key.name(), "op" => "set").increment(1);
                warn!(
                    target = SOURCE,
                    key = key.name(),
                    error = %err,
                    "Transient backend unavailable; value not cached"
                );
            }
        }
    }
}
