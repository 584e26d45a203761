use std::sync::Arc;

use serde::Deserialize;
use tracing::{info, instrument};

use crate::cache::CountsCache;
use crate::presentation::views::SiteCountsView;

use super::SiteCountsError;

const SOURCE: &str = "application::site_counts::SiteCountsBlock";

/// Editor-supplied block attributes.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BlockAttributes {
    #[serde(default, alias = "className")]
    pub class_name: Option<String>,
}

impl BlockAttributes {
    /// The class attribute to emit, if any non-blank value was supplied.
    pub fn class_attribute(&self) -> Option<String> {
        self.class_name
            .as_deref()
            .map(str::trim)
            .filter(|class| !class.is_empty())
            .map(str::to_string)
    }
}

/// Content-save notification from the host. Its fields are informational;
/// every save triggers the same rebuild.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ContentSaved {
    #[serde(default)]
    pub item_id: Option<i64>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub update: bool,
}

/// Composes the block view and keeps its transients warm.
#[derive(Clone)]
pub struct SiteCountsBlock {
    cache: Arc<CountsCache>,
}

impl SiteCountsBlock {
    pub fn new(cache: Arc<CountsCache>) -> Self {
        Self { cache }
    }

    /// Assemble the block for the item currently being viewed.
    #[instrument(skip(self, attributes))]
    pub async fn view(
        &self,
        current_id: i64,
        attributes: &BlockAttributes,
    ) -> Result<SiteCountsView, SiteCountsError> {
        let type_counts = self.cache.get_type_counts(false).await?;
        let cat_tag = self.cache.get_cat_tag_result(current_id, false).await?;

        Ok(SiteCountsView::build(
            &type_counts,
            current_id,
            &cat_tag,
            attributes.class_attribute(),
        ))
    }

    /// Eagerly rebuild both transients after any content save.
    #[instrument(skip_all)]
    pub async fn on_content_saved(&self, event: &ContentSaved) -> Result<(), SiteCountsError> {
        self.cache.get_type_counts(true).await?;
        self.cache.get_cat_tag_result(0, true).await?;

        info!(
            target = SOURCE,
            item_id = ?event.item_id,
            content_type = event.content_type.as_deref().unwrap_or(""),
            update = event.update,
            "Rebuilt site counts transients after content save"
        );
        Ok(())
    }
}
