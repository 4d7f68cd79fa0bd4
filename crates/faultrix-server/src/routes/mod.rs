//! HTTP route handlers.
//!
//! - [`gateway`]: `/auth-gateway/*`: register, login, logout, session.
//! - [`proxy`]: `/proxy/*`: authenticated relay to the backend.
//! - [`health`]: `/healthz`.

pub mod gateway;
pub mod health;
pub mod proxy;

use axum::body::{Body, Bytes};
use axum::http::header::{CONTENT_TYPE, SET_COOKIE};
use axum::http::HeaderValue;
use axum::response::Response;

use faultrix_core::{JSON_CONTENT_TYPE, UpstreamResponse};

use crate::error::GatewayError;

/// Read an inbound body up to `limit` bytes.
async fn read_body(body: Body, limit: usize) -> Result<Bytes, GatewayError> {
    axum::body::to_bytes(body, limit).await.map_err(|e| {
        GatewayError::BadRequest(format!(
            "request body could not be read (limit {limit} bytes): {e}"
        ))
    })
}

/// Turn a backend response into a browser response without touching the body.
fn relay(upstream: UpstreamResponse) -> Response {
    let content_type = upstream
        .content_type
        .as_deref()
        .and_then(|ct| HeaderValue::from_str(ct).ok())
        .unwrap_or_else(|| HeaderValue::from_static(JSON_CONTENT_TYPE));

    let mut response = Response::new(Body::from(upstream.body));
    *response.status_mut() = upstream.status;
    response.headers_mut().insert(CONTENT_TYPE, content_type);
    response
}

/// Append a `Set-Cookie` header.
fn with_cookie(mut response: Response, set_cookie: &str) -> Result<Response, GatewayError> {
    let value = HeaderValue::from_str(set_cookie)
        .map_err(|e| GatewayError::Internal(format!("unrepresentable session cookie: {e}")))?;
    response.headers_mut().append(SET_COOKIE, value);
    Ok(response)
}
