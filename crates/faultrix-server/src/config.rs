//! Gateway configuration.
//!
//! Loaded once from environment variables at startup and handed to the
//! handlers through [`AppState`](crate::state::AppState). Unparseable values
//! fall back to their defaults.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Production Faultrix backend, used when `BACKEND_URL` is unset.
pub const DEFAULT_UPSTREAM_URL: &str = "https://faultrix-backend-production.up.railway.app/api/v1";

const DEFAULT_UPSTREAM_TIMEOUT: Duration = Duration::from_secs(10);
const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Gateway configuration.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Address to bind the HTTP listener to.
    pub bind_addr: SocketAddr,
    /// Base URL of the Faultrix backend API (no trailing slash).
    pub upstream_url: String,
    /// Deployment environment; production turns on `Secure` cookies.
    pub environment: Environment,
    /// Timeout for the single upstream call each request makes.
    pub upstream_timeout: Duration,
    /// Largest inbound body accepted for forwarding.
    pub max_body_bytes: usize,
    /// Directory holding the built dashboard, served for unmatched paths.
    pub static_dir: Option<PathBuf>,
    /// Log filter used when `RUST_LOG` is unset.
    pub log_level: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl GatewayConfig {
    /// Load configuration from the process environment.
    ///
    /// Environment variables:
    /// - `PORT`: port to bind on (Railway convention, binds to `0.0.0.0`)
    /// - `FAULTRIX_BIND_ADDR`: full bind address (overrides `PORT`, default: `127.0.0.1:3000`)
    /// - `BACKEND_URL`: upstream API base (default: [`DEFAULT_UPSTREAM_URL`])
    /// - `FAULTRIX_ENV`: `production` or `development` (default: `development`)
    /// - `FAULTRIX_UPSTREAM_TIMEOUT_SECS`: upstream call timeout (default: `10`)
    /// - `FAULTRIX_MAX_BODY_BYTES`: inbound body limit (default: `1048576`)
    /// - `FAULTRIX_STATIC_DIR`: dashboard bundle directory (optional)
    /// - `FAULTRIX_LOG_LEVEL`: log filter (default: `info`)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        // Priority: FAULTRIX_BIND_ADDR > PORT (Railway) > default 127.0.0.1:3000
        let bind_addr = if let Some(addr) = lookup("FAULTRIX_BIND_ADDR") {
            addr.parse()
                .unwrap_or_else(|_| SocketAddr::from(([127, 0, 0, 1], 3000)))
        } else if let Some(port) = lookup("PORT") {
            SocketAddr::from(([0, 0, 0, 0], port.parse().unwrap_or(3000)))
        } else {
            SocketAddr::from(([127, 0, 0, 1], 3000))
        };

        let upstream_url = lookup("BACKEND_URL")
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_owned())
            .trim()
            .trim_end_matches('/')
            .to_owned();

        let environment = match lookup("FAULTRIX_ENV")
            .unwrap_or_default()
            .to_lowercase()
            .as_str()
        {
            "production" | "prod" => Environment::Production,
            _ => Environment::Development,
        };

        let upstream_timeout = lookup("FAULTRIX_UPSTREAM_TIMEOUT_SECS")
            .and_then(|v| v.parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map_or(DEFAULT_UPSTREAM_TIMEOUT, Duration::from_secs);

        let max_body_bytes = lookup("FAULTRIX_MAX_BODY_BYTES")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_MAX_BODY_BYTES);

        let static_dir = lookup("FAULTRIX_STATIC_DIR")
            .filter(|dir| !dir.is_empty())
            .map(PathBuf::from);

        let log_level = lookup("FAULTRIX_LOG_LEVEL").unwrap_or_else(|| "info".to_owned());

        Self {
            bind_addr,
            upstream_url,
            environment,
            upstream_timeout,
            max_body_bytes,
            static_dir,
            log_level,
        }
    }

    /// Whether session cookies carry the `Secure` attribute.
    #[must_use]
    pub fn secure_cookies(&self) -> bool {
        self.environment == Environment::Production
    }
}
