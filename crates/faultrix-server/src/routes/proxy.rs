//! Generic reverse proxy: `/proxy/*`
//!
//! Relays every dashboard API call to the backend. The credential comes from
//! the session cookie and nowhere else; the upstream request is assembled
//! from the method, path, query, and body only, so nothing the browser puts
//! in its headers can reach the backend.
//!
//! ```text
//! no cookie ───────────────────────────────▶ 401 UNAUTHORIZED (no upstream call)
//! cookie ──▶ upstream ──┬─ 401 ────────────▶ relay + clear cookie
//!                       ├─ other status ───▶ relay unchanged
//!                       └─ no response ────▶ 502 PROXY_ERROR
//! ```

use std::sync::Arc;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::routing::any;
use axum::Router;
use tracing::info;

use faultrix_core::{UpstreamHeaders, UpstreamRequest};

use super::{read_body, relay, with_cookie};
use crate::error::GatewayError;
use crate::state::AppState;

const PREFIX: &str = "/proxy/";

/// Build the `/proxy` router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/proxy/{*path}", any(forward))
}

/// Whether the browser's body is forwarded for `method`.
fn carries_body(method: &Method) -> bool {
    matches!(*method, Method::POST | Method::PUT | Method::PATCH)
}

/// `{GET,POST,PUT,PATCH,DELETE} /proxy/<path>`: forward to `<backend>/<path>`.
async fn forward(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Body,
) -> Result<Response, GatewayError> {
    if !matches!(
        method,
        Method::GET | Method::POST | Method::PUT | Method::PATCH | Method::DELETE
    ) {
        return Err(GatewayError::MethodNotAllowed(format!(
            "{method} is not relayed"
        )));
    }

    let Some(credential) = state.cookies.read(&headers) else {
        return Err(GatewayError::Unauthorized(
            "no active session; log in first".to_owned(),
        ));
    };

    // Raw path keeps percent-encoding exactly as the browser sent it.
    let path = uri.path().strip_prefix(PREFIX).unwrap_or_default();
    let mut request = UpstreamRequest::new(
        method.clone(),
        path,
        UpstreamHeaders::authenticated(credential),
    )
    .with_query(uri.query());
    if carries_body(&method) {
        request = request.with_body(read_body(body, state.config.max_body_bytes).await?);
    }

    let upstream = state.upstream.send(request).await?;

    if upstream.status == StatusCode::UNAUTHORIZED {
        info!(%method, path, "backend rejected session key; clearing cookie");
        return with_cookie(relay(upstream), &state.cookies.clear());
    }

    Ok(relay(upstream))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::body::to_bytes;
    use axum::http::header::{CONTENT_TYPE, COOKIE, SET_COOKIE};
    use axum::http::Request;
    use faultrix_core::{MockUpstream, UpstreamResponse, CREDENTIAL_HEADER};
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::app::build_router;
    use crate::config::GatewayConfig;

    fn app(mock: &MockUpstream) -> Router {
        let config = GatewayConfig::from_lookup(|_| None);
        build_router(Arc::new(AppState::new(config, Arc::new(mock.clone()))))
    }

    fn with_session(builder: axum::http::request::Builder) -> axum::http::request::Builder {
        builder.header(COOKIE, "fx_session=ck_123")
    }

    fn session_get(uri: &str) -> Request<Body> {
        with_session(Request::get(uri)).body(Body::empty()).unwrap()
    }

    async fn body_bytes(resp: Response) -> Vec<u8> {
        to_bytes(resp.into_body(), 64 * 1024).await.unwrap().to_vec()
    }

    fn rules_backend() -> MockUpstream {
        MockUpstream::new().respond(
            Method::GET,
            "chaos/rules",
            UpstreamResponse::json(StatusCode::OK, &json!([{"id": 1, "target": "payments"}])),
        )
    }

    #[tokio::test]
    async fn no_cookie_is_rejected_without_upstream_call() {
        let mock = rules_backend();
        for method in [Method::GET, Method::POST, Method::PUT, Method::PATCH, Method::DELETE] {
            let resp = app(&mock)
                .oneshot(
                    Request::builder()
                        .method(method)
                        .uri("/proxy/chaos/rules")
                        .body(Body::empty())
                        .unwrap(),
                )
                .await
                .unwrap();

            assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
            let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
            assert_eq!(body["errorCode"], "UNAUTHORIZED");
            assert_eq!(body["status"], 401);
        }
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn empty_cookie_is_rejected() {
        let mock = rules_backend();
        let resp = app(&mock)
            .oneshot(
                Request::get("/proxy/chaos/rules")
                    .header(COOKIE, "fx_session=")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn spoofed_credential_header_never_reaches_backend() {
        let mock = rules_backend();
        let request = with_session(Request::get("/proxy/chaos/rules"))
            .header("X-API-Key", "ck_attacker")
            .header("Authorization", "Bearer stolen")
            .header("X-Forwarded-For", "10.0.0.1")
            .body(Body::empty())
            .unwrap();

        let resp = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let calls = mock.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].header_values(CREDENTIAL_HEADER), vec!["ck_123"]);
        let names: Vec<&str> = calls[0].headers.iter().map(|(n, _)| *n).collect();
        assert_eq!(names, vec!["content-type", CREDENTIAL_HEADER]);
    }

    #[tokio::test]
    async fn path_query_and_body_are_forwarded_verbatim() {
        let mock = MockUpstream::new().respond(
            Method::PUT,
            "chaos/rules/12/schedules/3",
            UpstreamResponse::json(StatusCode::OK, &json!({"id": 3})),
        );
        let payload = r#"{"cron":"0 * * * *","enabled":true}"#;
        let uri = "/proxy/chaos/rules/12/schedules/3?dryRun=true&tz=UTC";
        let request = with_session(Request::put(uri))
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(payload))
            .unwrap();

        let resp = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);

        let call = &mock.calls()[0];
        assert_eq!(call.method, Method::PUT);
        assert_eq!(call.path, "chaos/rules/12/schedules/3");
        assert_eq!(call.query.as_deref(), Some("dryRun=true&tz=UTC"));
        assert_eq!(call.body.as_deref().unwrap(), payload.as_bytes());
    }

    #[tokio::test]
    async fn get_and_delete_do_not_forward_a_body() {
        let mock = MockUpstream::new().respond(
            Method::DELETE,
            "chaos/rules/4",
            UpstreamResponse::new(StatusCode::NO_CONTENT, ""),
        );
        let request = with_session(Request::delete("/proxy/chaos/rules/4"))
            .body(Body::from("ignored"))
            .unwrap();

        let resp = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);
        assert!(mock.calls()[0].body.is_none());
    }

    #[tokio::test]
    async fn upstream_errors_pass_through_unchanged() {
        let raw = br#"{"errorCode":"VALIDATION","message":"target required"}"#;
        let mock = MockUpstream::new().respond(
            Method::POST,
            "chaos/rules",
            UpstreamResponse::new(StatusCode::UNPROCESSABLE_ENTITY, &raw[..]),
        );
        let request = with_session(Request::post("/proxy/chaos/rules"))
            .body(Body::from("{}"))
            .unwrap();

        let resp = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(resp.headers().get(SET_COOKIE).is_none());
        assert_eq!(body_bytes(resp).await, raw.to_vec());
    }

    #[tokio::test]
    async fn repeated_get_is_byte_identical() {
        let mock = rules_backend();
        let mut seen = Vec::new();
        for _ in 0..2 {
            let resp = app(&mock)
                .oneshot(session_get("/proxy/chaos/rules"))
                .await
                .unwrap();
            seen.push((resp.status(), body_bytes(resp).await));
        }
        assert_eq!(seen[0], seen[1]);
        assert_eq!(mock.call_count(), 2);
    }

    #[tokio::test]
    async fn upstream_401_clears_cookie_in_same_response() {
        let mock = MockUpstream::new().respond(
            Method::GET,
            "chaos/events",
            UpstreamResponse::json(
                StatusCode::UNAUTHORIZED,
                &json!({"errorCode": "INVALID_API_KEY"}),
            ),
        );

        let resp = app(&mock)
            .oneshot(session_get("/proxy/chaos/events"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        let set_cookie = resp.headers().get(SET_COOKIE).unwrap().to_str().unwrap().to_owned();
        assert!(set_cookie.starts_with("fx_session=;"));
        assert!(set_cookie.contains("Max-Age=0"));
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["errorCode"], "INVALID_API_KEY");
    }

    #[tokio::test]
    async fn transport_failure_is_502_and_keeps_cookie() {
        let mock = MockUpstream::new().unreachable();

        let resp = app(&mock)
            .oneshot(session_get("/proxy/system/info"))
            .await
            .unwrap();

        assert_eq!(resp.status(), StatusCode::BAD_GATEWAY);
        assert!(resp.headers().get(SET_COOKIE).is_none());
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["errorCode"], "PROXY_ERROR");
        assert_eq!(body["status"], 502);
        assert_eq!(mock.call_count(), 1);
    }

    #[tokio::test]
    async fn oversized_body_is_rejected_before_upstream() {
        let mock = rules_backend();
        let config = GatewayConfig::from_lookup(|key| {
            (key == "FAULTRIX_MAX_BODY_BYTES").then(|| "16".to_owned())
        });
        let app = build_router(Arc::new(AppState::new(config, Arc::new(mock.clone()))));
        let request = with_session(Request::post("/proxy/chaos/rules"))
            .body(Body::from(vec![b'x'; 64]))
            .unwrap();

        let resp = app.oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = serde_json::from_slice(&body_bytes(resp).await).unwrap();
        assert_eq!(body["errorCode"], "BAD_REQUEST");
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn unsupported_method_is_rejected() {
        let mock = rules_backend();
        let options = Request::builder()
            .method(Method::OPTIONS)
            .uri("/proxy/chaos/rules");
        let request = with_session(options).body(Body::empty()).unwrap();

        let resp = app(&mock).oneshot(request).await.unwrap();
        assert_eq!(resp.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(mock.call_count(), 0);
    }

    #[tokio::test]
    async fn upstream_content_type_is_preserved() {
        let mock = MockUpstream::new().respond(
            Method::GET,
            "experiments/traffic",
            UpstreamResponse {
                status: StatusCode::OK,
                content_type: Some("text/plain; charset=utf-8".to_owned()),
                body: "ok".into(),
            },
        );

        let resp = app(&mock)
            .oneshot(session_get("/proxy/experiments/traffic"))
            .await
            .unwrap();

        assert_eq!(
            resp.headers().get(CONTENT_TYPE).unwrap(),
            "text/plain; charset=utf-8"
        );
    }
}
