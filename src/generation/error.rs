//! Client-facing errors of the generation proxy.

use axum::{
    extract::rejection::BytesRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::resilience::DeadlineElapsed;

pub const MISSING_CREDENTIAL_MESSAGE: &str = "Authorization header is required";
pub const REQUEST_REJECTED_MESSAGE: &str = "Recipe generation request could not be read";
pub const BACKEND_FAILURE_MESSAGE: &str = "Recipe generation failed";
pub const TIMEOUT_MESSAGE: &str =
    "Recipe generation timed out. Please try again with a simpler request.";
pub const INTERNAL_FAULT_MESSAGE: &str = "Internal server error during recipe generation";

/// Why the proxy could not relay a successful generation.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    #[error("authorization header missing or empty")]
    MissingCredential,

    #[error("request body rejected with status {status}: {detail}")]
    RequestRejected { status: StatusCode, detail: String },

    #[error("backend rejected generation with status {status}")]
    BackendFailure { status: StatusCode, detail: String },

    #[error("backend did not respond in time")]
    Timeout,

    #[error("internal fault: {0}")]
    InternalFault(String),
}

impl ProxyError {
    pub fn status(&self) -> StatusCode {
        match self {
            ProxyError::MissingCredential => StatusCode::UNAUTHORIZED,
            ProxyError::RequestRejected { status, .. } => *status,
            ProxyError::BackendFailure { status, .. } => *status,
            ProxyError::Timeout => StatusCode::GATEWAY_TIMEOUT,
            ProxyError::InternalFault(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Terminal state label used for metrics and logs.
    pub fn outcome(&self) -> &'static str {
        match self {
            ProxyError::MissingCredential | ProxyError::RequestRejected { .. } => "rejected",
            ProxyError::BackendFailure { .. } => "backend_failed",
            ProxyError::Timeout => "timed_out",
            ProxyError::InternalFault(_) => "faulted",
        }
    }
}

impl From<DeadlineElapsed> for ProxyError {
    fn from(elapsed: DeadlineElapsed) -> Self {
        tracing::warn!(deadline = ?elapsed.0, "Backend generation call abandoned");
        ProxyError::Timeout
    }
}

impl From<BytesRejection> for ProxyError {
    fn from(rejection: BytesRejection) -> Self {
        ProxyError::RequestRejected {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<reqwest::Error> for ProxyError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            ProxyError::Timeout
        } else {
            ProxyError::InternalFault(e.to_string())
        }
    }
}

impl IntoResponse for ProxyError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ProxyError::MissingCredential => json!({ "error": MISSING_CREDENTIAL_MESSAGE }),
            ProxyError::RequestRejected { detail, .. } => {
                json!({ "error": REQUEST_REJECTED_MESSAGE, "details": detail })
            }
            ProxyError::BackendFailure { detail, .. } => {
                json!({ "error": BACKEND_FAILURE_MESSAGE, "details": detail })
            }
            ProxyError::Timeout => json!({ "error": TIMEOUT_MESSAGE }),
            ProxyError::InternalFault(detail) => {
                tracing::error!(error = %detail, "Recipe generation error");
                json!({ "error": INTERNAL_FAULT_MESSAGE })
            }
        };
        (status, Json(body)).into_response()
    }
}
