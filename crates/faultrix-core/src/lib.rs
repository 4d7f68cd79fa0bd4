//! Core library for the Faultrix gateway.
//!
//! The gateway sits between the dashboard in the browser and the Faultrix
//! backend. It keeps the organization's API key in an HttpOnly cookie and
//! injects it into upstream calls, so page scripts never see it. This crate
//! holds the pieces that know nothing about HTTP routing:
//!
//! - [`SessionCredential`]: the raw API key, redacted in `Debug` and zeroized
//!   on drop.
//! - [`SessionCookiePolicy`]: how the credential is issued, cleared, and read
//!   back from the `fx_session` cookie.
//! - [`UpstreamHeaders`]: the closed set of headers sent upstream. There is no
//!   way to attach an inbound browser header to it.
//! - [`Upstream`]: the single outbound call per request, implemented by
//!   [`HttpUpstream`] (reqwest). The `test-util` feature adds `MockUpstream`,
//!   an in-memory recording implementation for tests.

mod client;
mod credential;
mod error;
mod headers;
#[cfg(any(test, feature = "test-util"))]
mod mock;
mod session_cookie;
mod upstream;

pub use crate::client::HttpUpstream;
pub use crate::credential::SessionCredential;
pub use crate::error::UpstreamError;
pub use crate::headers::{CREDENTIAL_HEADER, JSON_CONTENT_TYPE, UpstreamHeaders};
#[cfg(any(test, feature = "test-util"))]
pub use crate::mock::{MockUpstream, RecordedCall};
pub use crate::session_cookie::{SESSION_COOKIE_NAME, SESSION_MAX_AGE_SECS, SessionCookiePolicy};
pub use crate::upstream::{Upstream, UpstreamRequest, UpstreamResponse};
