//! Session Token
//!
//! The raw session credential as presented in the session cookie. It is never
//! stored: persistence only sees [`SessionToken::hash`], and CSRF tokens are
//! bound to [`SessionToken::binding`].

use std::fmt;

use platform::crypto::{sha256, sha256_hex};

/// Longest cookie value accepted as a session token
const MAX_TOKEN_LEN: usize = 256;

/// Opaque session credential
#[derive(Clone, PartialEq, Eq)]
pub struct SessionToken(String);

impl SessionToken {
    /// Wrap a cookie value; empty or oversized values are not credentials
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() || raw.len() > MAX_TOKEN_LEN {
            return None;
        }
        Some(Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lookup key for the session store
    pub fn hash(&self) -> Vec<u8> {
        sha256(self.0.as_bytes()).to_vec()
    }

    /// Session context a CSRF token is bound to
    pub fn binding(&self) -> String {
        sha256_hex(self.0.as_bytes())
    }
}

impl fmt::Debug for SessionToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionToken(<redacted>)")
    }
}
