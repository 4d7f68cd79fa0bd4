//! HTTP error types for the gateway.
//!
//! Only failures the gateway itself decides on are errors; a non-2xx answer
//! from the backend is relayed as-is and never passes through here. Every
//! variant renders as `{"errorCode", "message", "status"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use faultrix_core::UpstreamError;

/// Error returned from gateway and proxy handlers.
#[derive(Debug, thiserror::Error)]
pub enum GatewayError {
    /// No session cookie on a call that needs one.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The inbound request could not be read or forwarded.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// The proxy does not relay this method.
    #[error("method not allowed: {0}")]
    MethodNotAllowed(String),

    /// The backend could not be reached.
    #[error("proxy error: {0}")]
    Proxy(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// JSON error response body.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    error_code: &'static str,
    message: String,
    status: u16,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match self {
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            Self::MethodNotAllowed(msg) => {
                (StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED", msg)
            }
            Self::Proxy(msg) => {
                tracing::warn!(error = %msg, "backend unreachable");
                (
                    StatusCode::BAD_GATEWAY,
                    "PROXY_ERROR",
                    "failed to reach backend".to_owned(),
                )
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "gateway internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "internal server error".to_owned(),
                )
            }
        };

        let body = ErrorBody {
            error_code,
            message,
            status: status.as_u16(),
        };

        (status, axum::Json(body)).into_response()
    }
}

impl From<UpstreamError> for GatewayError {
    fn from(err: UpstreamError) -> Self {
        match err {
            UpstreamError::InvalidUrl { .. } => Self::BadRequest(err.to_string()),
            UpstreamError::Timeout { .. } | UpstreamError::Transport { .. } => {
                Self::Proxy(err.to_string())
            }
            UpstreamError::Client(_) => Self::Internal(err.to_string()),
        }
    }
}
