//! Outbound header set for upstream calls.
//!
//! The gateway never copies headers from the browser request. Everything the
//! upstream sees comes from [`UpstreamHeaders`], a closed record with exactly
//! two possible entries: the JSON content type and, for authenticated calls,
//! the credential header. A spoofed `X-API-Key` from the browser has nowhere
//! to go.

use crate::credential::SessionCredential;

/// Header the backend reads the organization API key from.
pub const CREDENTIAL_HEADER: &str = "x-api-key";

/// Content type declared on every upstream call.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Headers attached to a single upstream call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamHeaders {
    content_type: &'static str,
    credential: Option<SessionCredential>,
}

impl UpstreamHeaders {
    /// Headers for the public auth endpoints: no credential.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE,
            credential: None,
        }
    }

    /// Headers for a proxied call on behalf of a session.
    #[must_use]
    pub fn authenticated(credential: SessionCredential) -> Self {
        Self {
            content_type: JSON_CONTENT_TYPE,
            credential: Some(credential),
        }
    }

    /// Whether the credential header will be sent.
    #[must_use]
    pub fn carries_credential(&self) -> bool {
        self.credential.is_some()
    }

    /// The complete header list, in send order.
    #[must_use]
    pub fn pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = vec![("content-type", self.content_type.to_owned())];
        if let Some(credential) = &self.credential {
            pairs.push((CREDENTIAL_HEADER, credential.expose().to_owned()));
        }
        pairs
    }
}
