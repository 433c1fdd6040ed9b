//! Authorization Gate
//!
//! Answers "does this identity hold this capability". Computed per request
//! from the allow-list; never cached.

use std::sync::Arc;

use crate::domain::entity::identity::Identity;
use crate::domain::repository::AuthorizationRepository;
use crate::domain::value_object::capability::Capability;
use crate::error::{AuthError, AuthResult};

/// Authorization gate
pub struct AuthorizationGate<A>
where
    A: AuthorizationRepository + Send + Sync + 'static,
{
    authz_repo: Arc<A>,
}

impl<A> AuthorizationGate<A>
where
    A: AuthorizationRepository + Send + Sync + 'static,
{
    pub fn new(authz_repo: Arc<A>) -> Self {
        Self { authz_repo }
    }

    /// Whether `identity` holds `capability`
    ///
    /// Unauthenticated identities are denied without a repository call.
    pub async fn is_authorized(
        &self,
        identity: &Identity,
        capability: Capability,
    ) -> AuthResult<bool> {
        let Some(user_id) = identity.user_id() else {
            return Ok(false);
        };

        let record = self
            .authz_repo
            .find_authorization_record(&user_id, capability)
            .await
            .map_err(|e| AuthError::AuthorizationCheckFailed(e.to_string()))?;

        if let Some(record) = &record {
            tracing::debug!(
                user_id = %user_id,
                capability = %capability,
                role = %record.role,
                "Capability granted"
            );
        }

        Ok(record.is_some())
    }

    /// Fail-closed variant: any error denies
    pub async fn check_or_deny(&self, identity: &Identity, capability: Capability) -> bool {
        match self.is_authorized(identity, capability).await {
            Ok(granted) => granted,
            Err(e) => {
                e.log();
                false
            }
        }
    }
}
