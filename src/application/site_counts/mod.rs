//! The site counts block: per-type published counts and the tag/category
//! shortlist, served through a transient cache.

mod block;
mod queries;
#[cfg(test)]
pub(crate) mod testing;

pub use block::{BlockAttributes, ContentSaved, SiteCountsBlock};
pub use queries::{
    CAT_TAG_CATEGORY, CAT_TAG_LIMIT, CAT_TAG_TAG, CAT_TAG_TYPES, SiteCountsQueries,
};

use thiserror::Error;

use crate::application::repos::RepoError;

#[derive(Debug, Error)]
pub enum SiteCountsError {
    #[error("content query failed: {0}")]
    Query(#[from] RepoError),
    #[error("content type `{type_slug}` is missing its {field}")]
    MissingTypeMetadata {
        type_slug: String,
        field: &'static str,
    },
}

impl SiteCountsError {
    pub fn missing_metadata(type_slug: impl Into<String>, field: &'static str) -> Self {
        Self::MissingTypeMetadata {
            type_slug: type_slug.into(),
            field,
        }
    }
}
