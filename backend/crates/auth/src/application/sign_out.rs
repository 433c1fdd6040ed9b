//! Sign Out Use Case
//!
//! Invalidates the current session, or every session of its user.

use std::sync::Arc;

use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>) -> Self {
        Self { session_repo }
    }

    /// Sign out from the current session
    ///
    /// Returns the number of sessions removed. An unknown token is not an
    /// error: the caller still clears the cookie.
    pub async fn execute(&self, token: &SessionToken) -> AuthResult<u64> {
        let deleted = self.session_repo.delete_session(&token.hash()).await?;

        tracing::info!(deleted = deleted, "Session signed out");
        Ok(u64::from(deleted))
    }

    /// Sign out from every session of the token's user
    pub async fn execute_all(&self, token: &SessionToken) -> AuthResult<u64> {
        let Some(session) = self
            .session_repo
            .find_session_by_token(&token.hash())
            .await?
        else {
            return self.execute(token).await;
        };

        let deleted = self
            .session_repo
            .delete_sessions_for_user(&session.user_id)
            .await?;

        tracing::info!(
            user_id = %session.user_id,
            deleted = deleted,
            "User signed out from all sessions"
        );

        Ok(deleted)
    }
}
