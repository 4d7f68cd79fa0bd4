//! Auth gateway routes: `/auth-gateway/*`
//!
//! No session is required here. These handlers talk to the backend's
//! `auth/register` and `auth/login` endpoints without a credential header and
//! turn a successful answer into a session cookie. The raw key reaches the browser exactly once,
//! in the registration response, so the user can copy it. Login responses
//! have it removed, and the session check only ever returns org metadata.

use std::sync::Arc;

use axum::body::{Body, Bytes};
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use faultrix_core::{SessionCredential, UpstreamHeaders, UpstreamRequest};

use super::{read_body, relay, with_cookie};
use crate::error::GatewayError;
use crate::state::AppState;

const REGISTER_PATH: &str = "auth/register";
const LOGIN_PATH: &str = "auth/login";

/// Build the `/auth-gateway` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/session", get(session))
}

// ── Types ────────────────────────────────────────────────────────────

/// The part of a login body the gateway needs to read.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LoginRequest {
    api_key: Option<String>,
}

/// Non-sensitive organization metadata returned by a key check.
#[derive(Debug, Default, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrgMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub org_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub plan: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_rules: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub authenticated: bool,
    #[serde(flatten)]
    pub org: Option<OrgMetadata>,
}

// ── Handlers ─────────────────────────────────────────────────────────

/// `POST /auth-gateway/register`: create an organization and start a session.
///
/// The body is forwarded untouched. On success the returned key becomes the
/// session cookie and the JSON is relayed with the key still in it.
async fn register(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Response, GatewayError> {
    let body = read_body(body, state.config.max_body_bytes).await?;
    let upstream = state
        .upstream
        .send(
            UpstreamRequest::new(Method::POST, REGISTER_PATH, UpstreamHeaders::anonymous())
                .with_body(body),
        )
        .await?;

    if !upstream.status.is_success() {
        return Ok(relay(upstream));
    }

    let Some(payload) = parse_object(&upstream.body) else {
        warn!(
            status = upstream.status.as_u16(),
            "registration response is not a JSON object; relaying raw"
        );
        return Ok(relay(upstream));
    };

    let Some(credential) = payload
        .get("apiKey")
        .and_then(Value::as_str)
        .and_then(SessionCredential::new)
    else {
        warn!("registration response carried no usable api key; no session issued");
        return Ok(relay(upstream));
    };

    info!(
        slug = payload.get("slug").and_then(serde_json::Value::as_str).unwrap_or(""),
        "organization registered, session issued"
    );
    let set_cookie = state.cookies.issue(&credential);
    with_cookie(relay(upstream), &set_cookie)
}

/// `POST /auth-gateway/login`: validate a key and start a session.
///
/// The cookie is set to the key the browser submitted; the `apiKey` field is
/// removed from the JSON before it is returned.
async fn login(
    State(state): State<Arc<AppState>>,
    body: Body,
) -> Result<Response, GatewayError> {
    let body = read_body(body, state.config.max_body_bytes).await?;
    let submitted = serde_json::from_slice::<LoginRequest>(&body)
        .ok()
        .and_then(|req| req.api_key)
        .and_then(SessionCredential::new);

    let upstream = state
        .upstream
        .send(
            UpstreamRequest::new(Method::POST, LOGIN_PATH, UpstreamHeaders::anonymous())
                .with_body(body),
        )
        .await?;

    if !upstream.status.is_success() {
        return Ok(relay(upstream));
    }

    let Some(mut payload) = parse_object(&upstream.body) else {
        warn!(
            status = upstream.status.as_u16(),
            "login response is not a JSON object; relaying raw"
        );
        return Ok(relay(upstream));
    };

    let returned = payload
        .remove("apiKey")
        .and_then(|v| v.as_str().and_then(SessionCredential::new));
    let response = (upstream.status, Json(Value::Object(payload))).into_response();

    match submitted.or(returned) {
        Some(credential) => {
            info!("login accepted, session issued");
            with_cookie(response, &state.cookies.issue(&credential))
        }
        None => {
            warn!("login accepted but no usable api key to store; no session issued");
            Ok(response)
        }
    }
}

/// `POST /auth-gateway/logout`: drop the session cookie.
///
/// Purely local: the key stays valid at the backend until it is revoked there.
async fn logout(State(state): State<Arc<AppState>>) -> Result<Response, GatewayError> {
    let response = Json(serde_json::json!({ "success": true })).into_response();
    with_cookie(response, &state.cookies.clear())
}

/// `GET /auth-gateway/session`: report whether the cookie holds a live key.
///
/// A missing cookie is answered without calling the backend. A key the
/// backend rejects is cleared. An unreachable backend reports
/// unauthenticated but leaves the cookie alone.
async fn session(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Response, GatewayError> {
    let Some(credential) = state.cookies.read(&headers) else {
        return Ok(unauthenticated());
    };

    let check = serde_json::json!({ "apiKey": credential.expose() }).to_string();
    let request = UpstreamRequest::new(Method::POST, LOGIN_PATH, UpstreamHeaders::anonymous())
        .with_body(Bytes::from(check));

    let upstream = match state.upstream.send(request).await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(error = %e, "session check could not reach backend");
            return Ok(unauthenticated());
        }
    };

    if !upstream.status.is_success() {
        info!(
            status = upstream.status.as_u16(),
            "backend rejected session key; clearing cookie"
        );
        return with_cookie(unauthenticated(), &state.cookies.clear());
    }

    match serde_json::from_slice::<OrgMetadata>(&upstream.body) {
        Ok(org) => Ok(Json(SessionResponse {
            authenticated: true,
            org: Some(org),
        })
        .into_response()),
        Err(e) => {
            warn!(error = %e, "session check returned an unreadable body");
            Ok(unauthenticated())
        }
    }
}

// ── Helpers ──────────────────────────────────────────────────────────

fn unauthenticated() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(SessionResponse {
            authenticated: false,
            org: None,
        }),
    )
        .into_response()
}

fn parse_object(body: &[u8]) -> Option<Map<String, Value>> {
    match serde_json::from_slice(body) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}
