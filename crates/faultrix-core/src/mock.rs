//! In-memory upstream for tests.
//!
//! Answers from a table of canned responses keyed by method and path, and
//! records every call it receives, headers included, so tests can assert on
//! call counts and on exactly what would have gone over the wire.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use bytes::Bytes;
use reqwest::{Method, StatusCode};

use crate::error::UpstreamError;
use crate::upstream::{Upstream, UpstreamRequest, UpstreamResponse};

/// One call seen by [`MockUpstream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub body: Option<Bytes>,
    pub headers: Vec<(&'static str, String)>,
}

impl RecordedCall {
    /// All values sent for header `name` (case-insensitive).
    #[must_use]
    pub fn header_values(&self, name: &str) -> Vec<&str> {
        self.headers
            .iter()
            .filter(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
            .collect()
    }
}

#[derive(Debug, Default)]
struct Inner {
    routes: HashMap<(Method, String), UpstreamResponse>,
    unreachable: bool,
    calls: Vec<RecordedCall>,
}

/// A scripted, recording [`Upstream`].
///
/// Unrouted calls get a `404`. Clones share the same script and call log.
#[derive(Debug, Clone, Default)]
pub struct MockUpstream {
    inner: Arc<Mutex<Inner>>,
}

impl MockUpstream {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer `method path` with `response`.
    #[must_use]
    pub fn respond(self, method: Method, path: &str, response: UpstreamResponse) -> Self {
        self.lock()
            .routes
            .insert((method, path.trim_start_matches('/').to_owned()), response);
        self
    }

    /// Fail every call as if the backend refused the connection.
    #[must_use]
    pub fn unreachable(self) -> Self {
        self.lock().unreachable = true;
        self
    }

    /// Every call received so far, in order.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.lock().calls.clone()
    }

    #[must_use]
    pub fn call_count(&self) -> usize {
        self.lock().calls.len()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[async_trait::async_trait]
impl Upstream for MockUpstream {
    async fn send(&self, request: UpstreamRequest) -> Result<UpstreamResponse, UpstreamError> {
        let mut inner = self.lock();
        inner.calls.push(RecordedCall {
            method: request.method.clone(),
            path: request.path.clone(),
            query: request.query.clone(),
            body: request.body.clone(),
            headers: request.headers.pairs(),
        });

        if inner.unreachable {
            return Err(UpstreamError::Transport {
                reason: "connection refused".to_owned(),
            });
        }

        Ok(inner
            .routes
            .get(&(request.method, request.path))
            .cloned()
            .unwrap_or_else(|| {
                UpstreamResponse::json(
                    StatusCode::NOT_FOUND,
                    &serde_json::json!({"error": "not_found"}),
                )
            }))
    }
}
