//! The `fx_session` cookie: the only place a browser session's credential lives.
//!
//! The cookie is always `HttpOnly`, `SameSite=Strict`, and scoped to `/`.
//! `Secure` is set only in production so local development over plain HTTP
//! still works. Clearing writes an empty value with `Max-Age=0` and the same
//! attributes, so the browser matches and drops the existing cookie.

use cookie::time::Duration;
use cookie::{Cookie, SameSite};
use reqwest::header::{COOKIE, HeaderMap};

use crate::credential::SessionCredential;

/// Name of the session cookie.
pub const SESSION_COOKIE_NAME: &str = "fx_session";

/// Session lifetime: 7 days, reset only on login or registration.
pub const SESSION_MAX_AGE_SECS: i64 = 7 * 24 * 60 * 60;

/// Builds and reads the session cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionCookiePolicy {
    secure: bool,
}

impl SessionCookiePolicy {
    /// Create a policy. `secure` adds the `Secure` attribute.
    #[must_use]
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Whether issued cookies carry the `Secure` attribute.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.secure
    }

    /// `Set-Cookie` value that stores `credential` for the full session lifetime.
    #[must_use]
    pub fn issue(&self, credential: &SessionCredential) -> String {
        self.build(
            credential.expose().to_owned(),
            Duration::seconds(SESSION_MAX_AGE_SECS),
        )
    }

    /// `Set-Cookie` value that removes the session cookie.
    #[must_use]
    pub fn clear(&self) -> String {
        self.build(String::new(), Duration::ZERO)
    }

    /// Read the session credential from the request's `Cookie` headers.
    ///
    /// Returns `None` when the cookie is missing or empty. Malformed cookie
    /// pairs from other applications on the same origin are skipped.
    #[must_use]
    pub fn read(&self, headers: &HeaderMap) -> Option<SessionCredential> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|raw| Cookie::split_parse(raw))
            .filter_map(Result::ok)
            .find(|c| c.name() == SESSION_COOKIE_NAME)
            .and_then(|c| SessionCredential::new(c.value()))
    }

    fn build(&self, value: String, max_age: Duration) -> String {
        Cookie::build((SESSION_COOKIE_NAME, value))
            .http_only(true)
            .secure(self.secure)
            .same_site(SameSite::Strict)
            .path("/")
            .max_age(max_age)
            .build()
            .to_string()
    }
}
