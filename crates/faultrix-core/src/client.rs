//! `reqwest`-backed [`Upstream`] talking to the real Faultrix backend.

use std::time::{Duration, Instant};

use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::Policy;
use tracing::debug;

use crate::error::UpstreamError;
use crate::upstream::{Upstream, UpstreamRequest, UpstreamResponse};

/// Upper bound on establishing the TCP/TLS connection.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// HTTP client bound to one upstream base URL.
///
/// Redirects are not followed: a redirect would carry the credential header
/// to whatever host the backend names. They are relayed to the browser
/// instead, like any other status.
#[derive(Debug, Clone)]
pub struct HttpUpstream {
    base_url: String,
    client: reqwest::Client,
    timeout: Duration,
}

impl HttpUpstream {
    /// Create a client for `base_url` (trailing slashes are trimmed).
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError::InvalidUrl`] if `base_url` is not an absolute
    /// `http`/`https` URL, or [`UpstreamError::Client`] if the TLS backend
    /// fails to initialize.
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, UpstreamError> {
        let base_url = base_url.trim_end_matches('/').to_owned();
        let parsed = reqwest::Url::parse(&base_url).map_err(|e| UpstreamError::InvalidUrl {
            reason: e.to_string(),
        })?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(UpstreamError::InvalidUrl {
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .connect_timeout(CONNECT_TIMEOUT.min(timeout))
            .redirect(Policy::none())
            .user_agent(concat!("faultrix-gateway/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(UpstreamError::Client)?;

        Ok(Self {
            base_url,
            client,
            timeout,
        })
    }

    /// The normalized base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn classify(&self, err: reqwest::Error) -> UpstreamError {
        if err.is_timeout() {
            UpstreamError::Timeout {
                timeout_ms: u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX),
            }
        } else {
            UpstreamError::Transport {
                reason: err.without_url().to_string(),
            }
        }
    }
}

#[async_trait::async_trait]
impl Upstream for HttpUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let url = reqwest::Url::parse(&request.target(&self.base_url)).map_err(|e| {
            UpstreamError::InvalidUrl {
                reason: e.to_string(),
            }
        })?;

        let mut builder = self.client.request(request.method.clone(), url);
        for (name, value) in request.headers.pairs() {
            builder = builder.header(name, value);
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let started = Instant::now();
        let response = builder.send().await.map_err(|e| self.classify(e))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        let body = response.bytes().await.map_err(|e| self.classify(e))?;

        debug!(
            method = %request.method,
            path = %request.path,
            status = status.as_u16(),
            elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX),
            "upstream call complete"
        );

        Ok(UpstreamResponse {
            status,
            content_type,
            body,
        })
    }
}
