//! Router assembly.

use std::sync::Arc;

use axum::http::header::{CACHE_CONTROL, X_CONTENT_TYPE_OPTIONS, X_FRAME_OPTIONS};
use axum::http::HeaderValue;
use axum::Router;
use tower::limit::ConcurrencyLimitLayer;
use tower::ServiceBuilder;
use tower_http::services::ServeDir;
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::routes;
use crate::state::AppState;

/// In-flight cap shared by all `/auth-gateway/*` routes; login and
/// registration are interactive and low-volume.
const AUTH_GATEWAY_CONCURRENCY: usize = 32;

/// Build the Axum router with all routes and middleware.
pub fn build_router(state: Arc<AppState>) -> Router {
    // Gateway responses carry session state and must never be cached. The
    // dashboard bundle added below is outside this layer.
    let mut app = Router::new()
        .merge(routes::proxy::router())
        .merge(routes::health::router())
        .with_state(Arc::clone(&state))
        .merge(auth_gateway(Arc::clone(&state), AUTH_GATEWAY_CONCURRENCY))
        .layer(SetResponseHeaderLayer::overriding(
            CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ));

    // The built dashboard, when the gateway also serves it.
    if let Some(dir) = &state.config.static_dir {
        app = app.fallback_service(ServeDir::new(dir).append_index_html_on_directories(true));
    }

    app.layer(TraceLayer::new_for_http())
        .layer(SetResponseHeaderLayer::overriding(
            X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// The auth gateway behind a single concurrency limit.
///
/// `Router::layer` would give each route its own semaphore; wrapping the
/// whole nested router makes every clone share one.
fn auth_gateway(state: Arc<AppState>, limit: usize) -> Router {
    let limited = ServiceBuilder::new()
        .layer(ConcurrencyLimitLayer::new(limit))
        .service(routes::gateway::router().with_state(state));
    Router::new().nest_service("/auth-gateway", limited)
}
