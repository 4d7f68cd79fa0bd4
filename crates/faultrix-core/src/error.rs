//! Error types for `faultrix-core`.
//!
//! Messages never include the session credential or the full upstream URL
//! with its query string.

/// Errors from the single upstream call a request makes.
#[derive(Debug, thiserror::Error)]
pub enum UpstreamError {
    /// The upstream base URL or the path built from the request is not a valid URL.
    #[error("invalid upstream url: {reason}")]
    InvalidUrl { reason: String },

    /// The call did not complete within the configured timeout.
    #[error("upstream timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// Connection refused, DNS failure, TLS failure, or a broken response body.
    #[error("upstream transport error: {reason}")]
    Transport { reason: String },

    /// The HTTP client could not be constructed.
    #[error("failed to build http client: {0}")]
    Client(#[source] reqwest::Error),
}
