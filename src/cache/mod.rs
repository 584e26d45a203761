//! Site Counts Cache
//!
//! Read-through transient cache for the two block aggregates:
//!
//! - **posts_by_type**: published counts per public content type
//! - **posts_by_cat_tag**: the raw tag/category shortlist (exclusion is
//!   applied on read, so one entry serves every rendered item)
//!
//! ## Configuration
//!
//! Cache behavior is controlled via `site-counts.toml`:
//!
//! ```toml
//! [cache]
//! enabled = true
//! backend = "memory"   # or "database"
//! ttl_seconds = 1800
//! namespace = "site-counts"
//! ```

mod clock;
mod config;
mod counts;
mod keys;
mod lock;
mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{
    CacheBackend, CacheConfig, DEFAULT_NAMESPACE, DEFAULT_TTL_SECONDS, MAX_TTL_SECONDS,
};
pub use counts::CountsCache;
pub use keys::TransientKey;
pub use store::{MemoryTransientStore, TransientError, TransientStore};
