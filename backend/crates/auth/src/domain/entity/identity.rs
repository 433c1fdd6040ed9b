//! Request Identity
//!
//! Outcome of resolving the session cookie of one request. Request-scoped:
//! it is never cached or shared between requests.

use chrono::{DateTime, Utc};

use kernel::id::UserId;

/// A user proven by a live session
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    pub session_expires_at: DateTime<Utc>,
}

/// Resolved identity of a request
#[derive(Debug, Clone)]
pub enum Identity {
    Authenticated(AuthenticatedUser),
    /// `stale_cookie` is set when a session cookie was sent but no live
    /// session backs it, so the caller should clear it.
    Unauthenticated { stale_cookie: bool },
}

impl Identity {
    pub const ANONYMOUS: Identity = Identity::Unauthenticated {
        stale_cookie: false,
    };

    pub fn user(&self) -> Option<&AuthenticatedUser> {
        match self {
            Identity::Authenticated(user) => Some(user),
            Identity::Unauthenticated { .. } => None,
        }
    }

    pub fn user_id(&self) -> Option<UserId> {
        self.user().map(|u| u.user_id)
    }

    pub fn is_authenticated(&self) -> bool {
        self.user().is_some()
    }

    pub fn has_stale_cookie(&self) -> bool {
        matches!(self, Identity::Unauthenticated { stale_cookie: true })
    }
}
