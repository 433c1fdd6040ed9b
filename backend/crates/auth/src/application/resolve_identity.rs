//! Resolve Identity Use Case
//!
//! Turns the session cookie of a request into an [`Identity`].

use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use platform::client::extract_fingerprint;
use platform::cookie::read_cookie;

use crate::application::config::AuthConfig;
use crate::domain::entity::identity::{AuthenticatedUser, Identity};
use crate::domain::repository::SessionRepository;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult};

/// Read the session token from the request cookies
///
/// The plain cookie name wins over the `__Secure-` one. Empty or oversized
/// values count as absent, so they fall through to the next name.
pub fn session_token_from_headers(config: &AuthConfig, headers: &HeaderMap) -> Option<SessionToken> {
    config
        .session_cookie_names()
        .into_iter()
        .find_map(|name| read_cookie(headers, name).and_then(|raw| SessionToken::parse(&raw)))
}

/// Resolve identity use case
pub struct ResolveIdentityUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    session_repo: Arc<S>,
    config: Arc<AuthConfig>,
}

impl<S> ResolveIdentityUseCase<S>
where
    S: SessionRepository + Send + Sync + 'static,
{
    pub fn new(session_repo: Arc<S>, config: Arc<AuthConfig>) -> Self {
        Self {
            session_repo,
            config,
        }
    }

    /// Resolve the identity of a request from its headers
    pub async fn resolve(&self, headers: &HeaderMap) -> AuthResult<Identity> {
        let token = session_token_from_headers(&self.config, headers);
        self.resolve_token(token.as_ref(), headers).await
    }

    /// Resolve an already extracted session token
    ///
    /// `headers` are only used for the User-Agent fingerprint comparison.
    pub async fn resolve_token(
        &self,
        token: Option<&SessionToken>,
        headers: &HeaderMap,
    ) -> AuthResult<Identity> {
        let Some(token) = token else {
            return Ok(Identity::ANONYMOUS);
        };

        let session = self
            .session_repo
            .find_session_by_token(&token.hash())
            .await
            .map_err(|e| AuthError::IdentityLookupFailed(e.to_string()))?;

        let Some(session) = session else {
            tracing::debug!("Session cookie does not match a stored session");
            return Ok(Identity::Unauthenticated { stale_cookie: true });
        };

        if session.is_expired_at(Utc::now()) {
            tracing::debug!(user_id = %session.user_id, "Session expired");
            return Ok(Identity::Unauthenticated { stale_cookie: true });
        }

        // Soft check: a changed browser is logged, not rejected
        if let Some(stored) = session.client_fingerprint_hash.as_deref() {
            let matches = extract_fingerprint(headers)
                .map(|fp| fp.matches(stored))
                .unwrap_or(false);
            if !matches {
                tracing::warn!(
                    user_id = %session.user_id,
                    "Session presented with a different client fingerprint"
                );
            }
        }

        Ok(Identity::Authenticated(AuthenticatedUser {
            user_id: session.user_id,
            session_expires_at: session.expires_at,
        }))
    }
}
