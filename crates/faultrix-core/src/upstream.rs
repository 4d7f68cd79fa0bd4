//! The upstream call: one request out, one response back.

use bytes::Bytes;
use reqwest::{Method, StatusCode};

use crate::error::UpstreamError;
use crate::headers::UpstreamHeaders;

/// A request bound for the Faultrix backend.
///
/// Built by the gateway from the parts of an inbound request it chooses to
/// forward. Headers are an [`UpstreamHeaders`] record, not a header map.
#[derive(Debug, Clone)]
pub struct UpstreamRequest {
    /// HTTP method.
    pub method: Method,
    /// Path relative to the upstream base URL, without a leading slash.
    pub path: String,
    /// Raw query string without the leading `?`, forwarded verbatim.
    pub query: Option<String>,
    /// Raw body, forwarded verbatim.
    pub body: Option<Bytes>,
    /// The only headers sent.
    pub headers: UpstreamHeaders,
}

impl UpstreamRequest {
    #[must_use]
    pub fn new(method: Method, path: &str, headers: UpstreamHeaders) -> Self {
        Self {
            method,
            path: path.trim_start_matches('/').to_owned(),
            query: None,
            body: None,
            headers,
        }
    }

    /// Attach a query string. Empty strings are dropped.
    #[must_use]
    pub fn with_query(mut self, query: Option<&str>) -> Self {
        self.query = query.filter(|q| !q.is_empty()).map(str::to_owned);
        self
    }

    #[must_use]
    pub fn with_body(mut self, body: Bytes) -> Self {
        self.body = Some(body);
        self
    }

    /// Full target URL under `base` (which must not end in `/`).
    #[must_use]
    pub fn target(&self, base: &str) -> String {
        match &self.query {
            Some(query) => format!("{base}/{}?{query}", self.path),
            None => format!("{base}/{}", self.path),
        }
    }
}

/// What came back from the backend, kept byte-for-byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamResponse {
    pub status: StatusCode,
    pub content_type: Option<String>,
    pub body: Bytes,
}

impl UpstreamResponse {
    #[must_use]
    pub fn new(status: StatusCode, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            content_type: None,
            body: body.into(),
        }
    }

    /// A JSON response, as the backend would send it.
    #[must_use]
    pub fn json(status: StatusCode, value: &serde_json::Value) -> Self {
        Self {
            status,
            content_type: Some(crate::headers::JSON_CONTENT_TYPE.to_owned()),
            body: Bytes::from(value.to_string()),
        }
    }
}

/// The backend as seen by the gateway.
///
/// Implementations perform exactly one round trip per call and never retry.
#[async_trait::async_trait]
pub trait Upstream: Send + Sync + 'static {
    /// Send `request` and return the response, whatever its status.
    ///
    /// Non-2xx statuses are not errors; they come back as a normal response.
    ///
    /// # Errors
    ///
    /// Returns [`UpstreamError`] only when no response was obtained.
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError>;
}
