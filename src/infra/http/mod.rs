mod blocks;
mod middleware;

use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use sqlx::Error as SqlxError;

use crate::application::error::ErrorReport;
use crate::application::site_counts::SiteCountsBlock;
use crate::infra::db::PostgresRepositories;

use middleware::{log_responses, set_request_context};

#[derive(Clone)]
pub struct HttpState {
    pub block: Arc<SiteCountsBlock>,
    pub db: Arc<PostgresRepositories>,
}

pub fn build_router(state: HttpState) -> Router {
    Router::new()
        .route("/blocks/site-counts", get(blocks::site_counts_block))
        .route("/hooks/content-saved", post(blocks::content_saved))
        .route("/_health/db", get(db_health))
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
        .with_state(state)
}

async fn db_health(State(state): State<HttpState>) -> Response {
    db_health_response(state.db.health_check().await)
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}
