//! Transient key definitions.

/// The fixed identifiers of the cached aggregates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransientKey {
    /// Published counts per public content type.
    PostsByType,
    /// Raw tag/category shortlist, before exclusion.
    PostsByCatTag,
}

impl TransientKey {
    pub fn name(self) -> &'static str {
        match self {
            TransientKey::PostsByType => "posts_by_type",
            TransientKey::PostsByCatTag => "posts_by_cat_tag",
        }
    }

    /// Backend key, prefixed with the configured namespace.
    pub fn storage_key(self, namespace: &str) -> String {
        if namespace.is_empty() {
            return self.name().to_string();
        }
        format!("{namespace}_{}", self.name())
    }
}
