//! Shared application state for the gateway.
//!
//! Built once at startup and shared across handlers via `Arc`. Everything in
//! it is read-only; the session cookie is request-scoped and never stored here.

use std::sync::Arc;

use faultrix_core::{SessionCookiePolicy, Upstream};

use crate::config::GatewayConfig;

/// Shared application state passed to all HTTP handlers.
pub struct AppState {
    /// Configuration loaded at startup.
    pub config: GatewayConfig,
    /// The Faultrix backend.
    pub upstream: Arc<dyn Upstream>,
    /// How the session cookie is written and read.
    pub cookies: SessionCookiePolicy,
}

impl AppState {
    #[must_use]
    pub fn new(config: GatewayConfig, upstream: Arc<dyn Upstream>) -> Self {
        let cookies = SessionCookiePolicy::new(config.secure_cookies());
        Self {
            config,
            upstream,
            cookies,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.config)
            .field("cookies", &self.cookies)
            .finish_non_exhaustive()
    }
}
