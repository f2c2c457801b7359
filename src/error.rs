//! Errors surfaced to callers as HTTP responses.
//!
//! Every variant is handled where it is detected and turned into a plain-text
//! response. Upstream error detail goes to the logs only.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

/// Transport-level failure talking to the upstream.
#[derive(Debug, Error)]
#[error("upstream request failed: {source}")]
pub struct UpstreamError {
    #[source]
    source: Box<dyn std::error::Error + Send + Sync>,
}

impl UpstreamError {
    pub fn new(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self {
            source: source.into(),
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(e: reqwest::Error) -> Self {
        Self::new(e)
    }
}

#[derive(Debug, Error)]
pub enum ProxyError {
    /// No valid credentials on a private path.
    #[error("not authorized")]
    AuthorizationDenied,

    /// The outbound URL scheme is not http or https.
    #[error("unsupported protocol scheme {0}")]
    UnsupportedScheme(String),

    #[error(transparent)]
    UpstreamUnreachable(#[from] UpstreamError),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::AuthorizationDenied => StatusCode::UNAUTHORIZED,
            ProxyError::UnsupportedScheme(_) => StatusCode::BAD_REQUEST,
            ProxyError::UpstreamUnreachable(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let message = match &self {
            ProxyError::UpstreamUnreachable(_) => "Server Error".to_string(),
            other => other.to_string(),
        };
        (self.status(), message).into_response()
    }
}
