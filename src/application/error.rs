use std::error::Error as StdError;
use std::iter;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    application::{repos::RepoError, site_counts::SiteCountsError},
    config::LoadError,
    infra::error::InfraError,
};

/// Diagnostic attached to error responses for the response-logging middleware.
///
/// `messages` holds the error followed by each of its sources, outermost first.
#[derive(Debug, Clone)]
pub struct ErrorReport {
    pub source: &'static str,
    pub status: StatusCode,
    pub messages: Vec<String>,
}

impl ErrorReport {
    pub fn from_error(source: &'static str, status: StatusCode, error: &dyn StdError) -> Self {
        let messages = iter::once(error.to_string())
            .chain(iter::successors(error.source(), |&err| err.source()).map(ToString::to_string))
            .collect();
        Self {
            source,
            status,
            messages,
        }
    }

    pub fn attach(self, response: &mut Response) {
        response.extensions_mut().insert(self);
    }
}

/// An error response: a fixed public message plus a private [`ErrorReport`].
#[derive(Debug)]
pub struct HttpError {
    public_message: &'static str,
    report: ErrorReport,
}

impl HttpError {
    pub fn from_error(
        source: &'static str,
        status: StatusCode,
        public_message: &'static str,
        error: &dyn StdError,
    ) -> Self {
        Self {
            public_message,
            report: ErrorReport::from_error(source, status, error),
        }
    }

    pub fn status(&self) -> StatusCode {
        self.report.status
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let mut response = (self.report.status, self.public_message).into_response();
        self.report.attach(&mut response);
        response
    }
}

impl From<SiteCountsError> for HttpError {
    fn from(error: SiteCountsError) -> Self {
        const SOURCE: &str = "application::error::site_counts_error_to_http_error";
        match &error {
            SiteCountsError::Query(RepoError::Timeout) => HttpError::from_error(
                SOURCE,
                StatusCode::SERVICE_UNAVAILABLE,
                "Content store timed out",
                &error,
            ),
            SiteCountsError::Query(RepoError::Persistence(_)) => HttpError::from_error(
                SOURCE,
                StatusCode::SERVICE_UNAVAILABLE,
                "Content store unavailable",
                &error,
            ),
            SiteCountsError::Query(_) | SiteCountsError::MissingTypeMetadata { .. } => {
                HttpError::from_error(
                    SOURCE,
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    &error,
                )
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Infra(#[from] InfraError),
    #[error(transparent)]
    Config(#[from] LoadError),
    #[error(transparent)]
    SiteCounts(#[from] SiteCountsError),
    #[error("unexpected error: {0}")]
    Unexpected(String),
}

impl AppError {
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::Unexpected(message.into())
    }
}
