//! The upstream API key held on behalf of a browser session.

use std::fmt;

use zeroize::{Zeroize, ZeroizeOnDrop};

/// An opaque upstream API key.
///
/// Never mutated, only replaced. The value is cleared from memory on drop
/// and never appears in `Debug` output.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SessionCredential(String);

impl SessionCredential {
    /// Wrap a raw key.
    ///
    /// Returns `None` for empty values and for values that cannot travel as
    /// a cookie value or header value unescaped (whitespace, control
    /// characters, `"`, `,`, `;`, `\`).
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.is_empty() || !raw.chars().all(is_cookie_octet) {
            return None;
        }
        Some(Self(raw))
    }

    /// Borrow the raw key.
    ///
    /// Only the cookie writer and the upstream header record call this.
    #[must_use]
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SessionCredential")
            .field(&"[REDACTED]")
            .finish()
    }
}

fn is_cookie_octet(c: char) -> bool {
    c.is_ascii_graphic() && !matches!(c, '"' | ',' | ';' | '\\')
}
