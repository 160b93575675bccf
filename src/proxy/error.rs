//! Per-request proxy failures and their HTTP mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::BoxError;
use thiserror::Error;

/// Anything that stops a request from being relayed.
///
/// None of these are retried. Upstream failures before response headers
/// arrive always surface as `502 Bad Gateway`.
#[derive(Debug, Error)]
pub enum ProxyError {
    #[error("failed to read request body: {0}")]
    BodyRead(BoxError),

    #[error("request body exceeds {limit} bytes")]
    PayloadTooLarge { limit: usize },

    #[error("failed to build upstream request: {0}")]
    BuildRequest(#[from] axum::http::Error),

    #[error("upstream request failed: {0}")]
    Upstream(#[from] hyper_util::client::legacy::Error),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::BodyRead(_) => StatusCode::BAD_REQUEST,
            ProxyError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ProxyError::BuildRequest(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ProxyError::Upstream(_) => StatusCode::BAD_GATEWAY,
        }
    }

    fn public_message(&self) -> &'static str {
        match self {
            ProxyError::BodyRead(_) => "Failed to read request body",
            ProxyError::PayloadTooLarge { .. } => "Request body too large",
            ProxyError::BuildRequest(_) => "Failed to build upstream request",
            ProxyError::Upstream(_) => "Upstream request failed",
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        (self.status(), self.public_message()).into_response()
    }
}
