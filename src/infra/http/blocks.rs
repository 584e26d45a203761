use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::debug;

use crate::{
    application::{
        error::HttpError,
        site_counts::{BlockAttributes, ContentSaved},
    },
    presentation::views::{SiteCountsTemplate, render_template_response},
};

use super::HttpState;

#[derive(Debug, Deserialize)]
pub(super) struct BlockQuery {
    post_id: i64,
    #[serde(default, alias = "className")]
    class_name: Option<String>,
}

pub(super) async fn site_counts_block(
    State(state): State<HttpState>,
    Query(query): Query<BlockQuery>,
) -> Response {
    let attributes = BlockAttributes {
        class_name: query.class_name,
    };

    match state.block.view(query.post_id, &attributes).await {
        Ok(view) => render_template_response(SiteCountsTemplate { view }, StatusCode::OK),
        Err(err) => HttpError::from(err).into_response(),
    }
}

pub(super) async fn content_saved(State(state): State<HttpState>, body: Bytes) -> Response {
    let event = parse_save_event(&body);

    match state.block.on_content_saved(&event).await {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => HttpError::from(err).into_response(),
    }
}

/// Hook payloads are informational; anything unparseable becomes the default event.
fn parse_save_event(body: &[u8]) -> ContentSaved {
    if body.iter().all(u8::is_ascii_whitespace) {
        return ContentSaved::default();
    }

    serde_json::from_slice(body).unwrap_or_else(|err| {
        debug!(
            target = "infra::http::blocks::content_saved",
            error = %err,
            "Ignoring unparseable save payload"
        );
        ContentSaved::default()
    })
}
