//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::entity::{authorization::AuthorizationRecord, session::Session};
use crate::domain::repository::{AuthorizationRepository, SessionRepository};
use crate::domain::value_object::capability::Capability;
use crate::error::AuthResult;
use kernel::id::UserId;

/// PostgreSQL-backed auth repository
#[derive(Clone)]
pub struct PgAuthRepository {
    pool: PgPool,
}

impl PgAuthRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired sessions
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let deleted = self.delete_expired_sessions(Utc::now()).await?;

        tracing::info!(sessions_deleted = deleted, "Cleaned up expired auth sessions");

        Ok(deleted)
    }
}

// ============================================================================
// Session Repository Implementation
// ============================================================================

impl SessionRepository for PgAuthRepository {
    async fn find_session_by_token(&self, token_hash: &[u8]) -> AuthResult<Option<Session>> {
        let row = sqlx::query_as::<_, SessionRow>(
            r#"
            SELECT
                token_hash,
                user_id,
                created_at,
                expires_at,
                client_fingerprint_hash
            FROM auth_sessions
            WHERE token_hash = $1
            "#,
        )
        .bind(token_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(SessionRow::into_session))
    }

    async fn delete_session(&self, token_hash: &[u8]) -> AuthResult<bool> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE token_hash = $1")
            .bind(token_hash)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_sessions_for_user(&self, user_id: &UserId) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }

    async fn delete_expired_sessions(&self, now: DateTime<Utc>) -> AuthResult<u64> {
        let result = sqlx::query("DELETE FROM auth_sessions WHERE expires_at <= $1")
            .bind(now)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

// ============================================================================
// Authorization Repository Implementation
// ============================================================================

impl AuthorizationRepository for PgAuthRepository {
    async fn find_authorization_record(
        &self,
        user_id: &UserId,
        capability: Capability,
    ) -> AuthResult<Option<AuthorizationRecord>> {
        let query = match capability {
            Capability::Admin => {
                r#"
                SELECT user_id, role, created_at
                FROM admins
                WHERE user_id = $1
                "#
            }
        };

        let row = sqlx::query_as::<_, AuthorizationRow>(query)
            .bind(user_id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|r| r.into_record(capability)))
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct SessionRow {
    token_hash: Vec<u8>,
    user_id: Uuid,
    created_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    client_fingerprint_hash: Option<Vec<u8>>,
}

impl SessionRow {
    fn into_session(self) -> Session {
        Session {
            token_hash: self.token_hash,
            user_id: UserId::from_uuid(self.user_id),
            created_at: self.created_at,
            expires_at: self.expires_at,
            client_fingerprint_hash: self.client_fingerprint_hash,
        }
    }
}

#[derive(sqlx::FromRow)]
struct AuthorizationRow {
    user_id: Uuid,
    role: String,
    created_at: DateTime<Utc>,
}

impl AuthorizationRow {
    fn into_record(self, capability: Capability) -> AuthorizationRecord {
        AuthorizationRecord {
            user_id: UserId::from_uuid(self.user_id),
            capability,
            role: self.role,
            granted_at: self.created_at,
        }
    }
}
