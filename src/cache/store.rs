//! Transient storage.
//!
//! A transient is a JSON value stored under a string key until its TTL
//! elapses. Expired entries read as absent.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use time::OffsetDateTime;

use super::clock::{Clock, SystemClock};
use super::lock::{rw_read, rw_write};

const SOURCE: &str = "cache::store";

#[derive(Debug, Error)]
pub enum TransientError {
    #[error("transient backend unavailable: {0}")]
    Unavailable(String),
}

impl TransientError {
    pub fn unavailable(err: impl std::fmt::Display) -> Self {
        Self::Unavailable(err.to_string())
    }
}

#[async_trait]
pub trait TransientStore: Send + Sync {
    /// The stored value, or `None` when absent or expired.
    async fn get(&self, key: &str) -> Result<Option<Value>, TransientError>;

    /// Replace the value under `key`, expiring after `ttl`.
    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), TransientError>;

    async fn invalidate(&self, key: &str) -> Result<(), TransientError>;
}

#[derive(Debug, Clone)]
struct CacheEntry {
    value: Value,
    expires_at: OffsetDateTime,
}

/// In-process transient store.
pub struct MemoryTransientStore {
    entries: RwLock<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryTransientStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryTransientStore {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
        }
    }

    /// Number of live (unexpired) entries.
    pub fn len(&self) -> usize {
        let now = self.clock.now();
        rw_read(&self.entries, SOURCE, "len")
            .values()
            .filter(|entry| entry.expires_at > now)
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Expiry of the entry under `key`, if present.
    pub fn expires_at(&self, key: &str) -> Option<OffsetDateTime> {
        rw_read(&self.entries, SOURCE, "expires_at")
            .get(key)
            .map(|entry| entry.expires_at)
    }
}

#[async_trait]
impl TransientStore for MemoryTransientStore {
    async fn get(&self, key: &str) -> Result<Option<Value>, TransientError> {
        let now = self.clock.now();
        {
            let entries = rw_read(&self.entries, SOURCE, "get");
            match entries.get(key) {
                Some(entry) if entry.expires_at > now => return Ok(Some(entry.value.clone())),
                Some(_) => {}
                None => return Ok(None),
            }
        }

        // Expired entries are evicted on read.
        let mut entries = rw_write(&self.entries, SOURCE, "get.evict_expired");
        if entries
            .get(key)
            .is_some_and(|entry| entry.expires_at <= now)
        {
            entries.remove(key);
        }
        Ok(None)
    }

    async fn set(&self, key: &str, value: Value, ttl: Duration) -> Result<(), TransientError> {
        let expires_at = time::Duration::try_from(ttl)
            .ok()
            .and_then(|ttl| self.clock.now().checked_add(ttl))
            .ok_or_else(|| {
                TransientError::unavailable(format!(
                    "ttl of {}s overflows the expiry timestamp",
                    ttl.as_secs()
                ))
            })?;
        rw_write(&self.entries, SOURCE, "set")
            .insert(key.to_string(), CacheEntry { value, expires_at });
        Ok(())
    }

    async fn invalidate(&self, key: &str) -> Result<(), TransientError> {
        rw_write(&self.entries, SOURCE, "invalidate").remove(key);
        Ok(())
    }
}
