//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.
//! Lookups return `Ok(None)` for "not found" and `Err` only for transport or
//! storage failures.

use chrono::{DateTime, Utc};

use crate::domain::entity::{authorization::AuthorizationRecord, session::Session};
use crate::domain::value_object::capability::Capability;
use crate::error::AuthResult;
use kernel::id::UserId;

/// Session repository trait
#[trait_variant::make(SessionRepository: Send)]
pub trait LocalSessionRepository {
    /// Find a session by the SHA-256 of its token
    async fn find_session_by_token(&self, token_hash: &[u8]) -> AuthResult<Option<Session>>;

    /// Delete a session; returns whether a row existed
    async fn delete_session(&self, token_hash: &[u8]) -> AuthResult<bool>;

    /// Delete every session of a user
    async fn delete_sessions_for_user(&self, user_id: &UserId) -> AuthResult<u64>;

    /// Delete sessions expired at `now`
    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64>;
}

/// Authorization allow-list repository trait
#[trait_variant::make(AuthorizationRepository: Send)]
pub trait LocalAuthorizationRepository {
    /// Find the allow-list entry granting `capability` to `user_id`
    async fn find_authorization_record(
        &self,
        user_id: &UserId,
        capability: Capability,
    ) -> AuthResult<Option<AuthorizationRecord>>;
}
