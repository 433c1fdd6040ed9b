//! Session Entity
//!
//! A persisted login session, keyed by the SHA-256 of its token.

use chrono::{DateTime, Duration, Utc};

use crate::domain::value_object::session_token::SessionToken;
use kernel::id::UserId;

/// Session record
#[derive(Debug, Clone)]
pub struct Session {
    /// SHA-256 of the session token
    pub token_hash: Vec<u8>,
    pub user_id: UserId,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    /// Hash of the User-Agent at login, when the login flow recorded one
    pub client_fingerprint_hash: Option<Vec<u8>>,
}

impl Session {
    /// Build a session for `token`, valid for `ttl` from now
    pub fn new(
        token: &SessionToken,
        user_id: UserId,
        ttl: Duration,
        client_fingerprint_hash: Option<Vec<u8>>,
    ) -> Self {
        let now = Utc::now();
        Self {
            token_hash: token.hash(),
            user_id,
            created_at: now,
            expires_at: now + ttl,
            client_fingerprint_hash,
        }
    }

    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_boundary() {
        let token = SessionToken::parse("t").unwrap();
        let session = Session::new(&token, UserId::new(), Duration::hours(2), None);

        assert!(!session.is_expired());
        assert!(!session.is_expired_at(session.expires_at - Duration::seconds(1)));
        assert!(session.is_expired_at(session.expires_at));
    }

    #[test]
    fn test_stores_hash_not_token() {
        let token = SessionToken::parse("plain-token").unwrap();
        let session = Session::new(&token, UserId::new(), Duration::hours(1), None);
        assert_eq!(session.token_hash, token.hash());
        assert_ne!(session.token_hash, b"plain-token".to_vec());
    }
}
