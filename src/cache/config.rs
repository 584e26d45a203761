//! Cache configuration.
//!
//! Controls the transient backend and TTL via `site-counts.toml`.

use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_TTL_SECONDS: u64 = 30 * 60;
/// Longest accepted TTL (one year).
pub const MAX_TTL_SECONDS: u64 = 365 * 24 * 60 * 60;
pub const DEFAULT_NAMESPACE: &str = "site-counts";

/// Where transients are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheBackend {
    /// Process-local map; lost on restart.
    #[default]
    Memory,
    /// Postgres `transients` table, shared by every process.
    Database,
}

impl CacheBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Memory => "memory",
            Self::Database => "database",
        }
    }
}

impl FromStr for CacheBackend {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "memory" => Ok(Self::Memory),
            "database" => Ok(Self::Database),
            other => Err(format!("expected `memory` or `database`, got `{other}`")),
        }
    }
}

/// Cache configuration, resolved from validated settings.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Serve aggregates from the transient store.
    pub enabled: bool,
    /// Transient backend.
    pub backend: CacheBackend,
    /// Time-to-live for each aggregate.
    pub ttl_seconds: u64,
    /// Prefix applied to every transient key.
    pub namespace: String,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            backend: CacheBackend::Memory,
            ttl_seconds: DEFAULT_TTL_SECONDS,
            namespace: DEFAULT_NAMESPACE.to_string(),
        }
    }
}

impl From<&crate::config::CacheSettings> for CacheConfig {
    fn from(settings: &crate::config::CacheSettings) -> Self {
        Self {
            enabled: settings.enabled,
            backend: settings.backend,
            ttl_seconds: settings.ttl.as_secs(),
            namespace: settings.namespace.clone(),
        }
    }
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_values() {
        let config = CacheConfig::default();
        assert!(config.enabled);
        assert_eq!(config.backend, CacheBackend::Memory);
        assert_eq!(config.ttl_seconds, 1800);
        assert_eq!(config.ttl(), Duration::from_secs(1800));
        assert_eq!(config.namespace, "site-counts");
    }

    #[test]
    fn backend_parses_known_names() {
        assert_eq!("database".parse::<CacheBackend>(), Ok(CacheBackend::Database));
        assert_eq!("memory".parse::<CacheBackend>(), Ok(CacheBackend::Memory));
        assert!("redis".parse::<CacheBackend>().is_err());
    }
}
