//! Service error taxonomy.
//!
//! Handlers return [`AppError`] directly; the `IntoResponse` impl maps each
//! variant to a transport status code and a JSON `{ "error": ... }` body, so
//! route code can use `?` all the way down.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

/// Maximum number of characters of an upstream body kept for diagnostics.
const SNIPPET_LIMIT: usize = 200;

#[derive(Debug, Error)]
pub enum AppError {
    /// Missing or malformed request input. Never retried.
    #[error("{0}")]
    Validation(String),

    /// Non-success response from the panel. Carries the upstream status and
    /// a truncated body snippet.
    #[error("HTTP {status} from upstream: {snippet}")]
    Upstream { status: u16, snippet: String },

    /// Transport-level failure: connect, DNS, timeout.
    #[error("upstream request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Response assembly failure inside our own handler.
    #[error("internal error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Build an upstream error from a status code and response body, keeping
    /// at most [`SNIPPET_LIMIT`] characters of the body.
    pub fn upstream(status: u16, body: &str) -> Self {
        Self::Upstream {
            status,
            snippet: body.chars().take(SNIPPET_LIMIT).collect(),
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::Validation(_) => StatusCode::BAD_REQUEST,
            Self::Upstream { .. } => StatusCode::BAD_GATEWAY,
            Self::Network(e) if e.is_timeout() => StatusCode::GATEWAY_TIMEOUT,
            Self::Network(_) => StatusCode::BAD_GATEWAY,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<axum::http::Error> for AppError {
    fn from(err: axum::http::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!("{}", self);
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}
