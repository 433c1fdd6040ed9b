//! Auth Error Types
//!
//! Auth-specific error variants that integrate with the unified
//! `kernel::error::AppError` system. Responses carry only the public message
//! of the error kind; details go to the server log.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use kernel::error::{app_error::AppError, kind::ErrorKind};
use platform::token::EntropyError;
use thiserror::Error;

/// Auth-specific result type alias
pub type AuthResult<T> = Result<T, AuthError>;

/// Why a CSRF check rejected a request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsrfRejection {
    /// No token in the request header
    MissingHeader,
    /// No token cookie
    MissingCookie,
    /// Header and cookie differ
    Mismatch,
    /// Token does not have the `nonce.issued_at.signature` shape
    Malformed,
    /// Signature invalid, or issued for another session context
    BadSignature,
    /// Older than the configured lifetime
    Expired,
    /// Issued-at lies in the future
    IssuedInFuture,
}

impl CsrfRejection {
    pub const fn as_str(&self) -> &'static str {
        match self {
            CsrfRejection::MissingHeader => "missing_header",
            CsrfRejection::MissingCookie => "missing_cookie",
            CsrfRejection::Mismatch => "mismatch",
            CsrfRejection::Malformed => "malformed",
            CsrfRejection::BadSignature => "bad_signature",
            CsrfRejection::Expired => "expired",
            CsrfRejection::IssuedInFuture => "issued_in_future",
        }
    }
}

impl std::fmt::Display for CsrfRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Auth-specific error variants
#[derive(Debug, Error)]
pub enum AuthError {
    /// No live session (expected; not logged above debug)
    #[error("Unauthenticated")]
    Unauthenticated,

    /// Session store could not be queried
    #[error("Identity lookup failed: {0}")]
    IdentityLookupFailed(String),

    /// Allow-list could not be queried
    #[error("Authorization check failed: {0}")]
    AuthorizationCheckFailed(String),

    /// CSRF token missing, mismatched, forged or expired
    #[error("CSRF validation failed: {0}")]
    CsrfValidationFailed(CsrfRejection),

    /// Secure random source unavailable; no further tokens are issued
    #[error("Entropy source unavailable: {0}")]
    EntropySourceUnavailable(String),

    /// Malformed or unrecognized request payload
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Per-client request budget exhausted
    #[error("Rate limit exceeded, retry in {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AuthError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.kind().status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Get the ErrorKind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            AuthError::Unauthenticated => ErrorKind::Unauthorized,
            AuthError::CsrfValidationFailed(_) => ErrorKind::Forbidden,
            AuthError::InvalidRequest(_) => ErrorKind::BadRequest,
            AuthError::RateLimited { .. } => ErrorKind::TooManyRequests,
            AuthError::IdentityLookupFailed(_)
            | AuthError::AuthorizationCheckFailed(_)
            | AuthError::EntropySourceUnavailable(_)
            | AuthError::Database(_)
            | AuthError::Internal(_) => ErrorKind::InternalServerError,
        }
    }

    /// Convert to the client-facing AppError
    ///
    /// Only bad requests echo their detail; everything else uses the kind's
    /// public message.
    pub fn to_app_error(&self) -> AppError {
        match self {
            AuthError::InvalidRequest(detail) => AppError::bad_request(detail.clone()),
            other => AppError::from_kind(other.kind()),
        }
    }

    /// Like [`AuthError::to_app_error`], keeping `self` as the log-only source
    pub fn into_app_error(self) -> AppError {
        self.to_app_error().with_source(self)
    }

    /// Log the error with appropriate level
    pub(crate) fn log(&self) {
        match self {
            AuthError::Unauthenticated => {
                tracing::debug!("Request is not authenticated");
            }
            AuthError::IdentityLookupFailed(msg) => {
                tracing::error!(error = %msg, "Identity lookup failed");
            }
            AuthError::AuthorizationCheckFailed(msg) => {
                tracing::error!(error = %msg, "Authorization check failed");
            }
            AuthError::CsrfValidationFailed(reason) => {
                tracing::warn!(reason = %reason, "CSRF validation failed");
            }
            AuthError::EntropySourceUnavailable(msg) => {
                tracing::error!(error = %msg, "Secure random source unavailable");
            }
            AuthError::Database(e) => {
                tracing::error!(error = %e, "Auth database error");
            }
            AuthError::Internal(msg) => {
                tracing::error!(message = %msg, "Auth internal error");
            }
            AuthError::InvalidRequest(msg) => {
                tracing::debug!(error = %msg, "Rejected malformed request");
            }
            AuthError::RateLimited { retry_after_secs } => {
                tracing::debug!(retry_after_secs, "Rate limited response");
            }
        }
    }
}

impl IntoResponse for AuthError {
    fn into_response(self) -> Response {
        self.log();
        let retry_after = match &self {
            AuthError::RateLimited { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let mut response = self.into_app_error().into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

impl From<EntropyError> for AuthError {
    fn from(err: EntropyError) -> Self {
        AuthError::EntropySourceUnavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error as _;

    #[test]
    fn test_status_codes() {
        assert_eq!(AuthError::Unauthenticated.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AuthError::CsrfValidationFailed(CsrfRejection::Expired).status_code(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            AuthError::InvalidRequest("bad".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AuthError::IdentityLookupFailed("db".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AuthError::from(EntropyError::Unavailable("os".into())).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_internal_details_not_exposed() {
        let err = AuthError::AuthorizationCheckFailed("connection refused at 10.0.0.5".into());
        let app_error = err.to_app_error();
        assert!(!app_error.detail().contains("10.0.0.5"));

        let err = AuthError::InvalidRequest("unknown field `x`".into());
        assert_eq!(err.to_app_error().detail(), "unknown field `x`");
    }

    #[test]
    fn test_app_error_keeps_auth_error_as_source() {
        let app_error = AuthError::IdentityLookupFailed("pool timed out".into()).into_app_error();
        assert_eq!(app_error.status_code(), 500);
        assert!(!app_error.detail().contains("pool timed out"));

        let source = app_error.source().unwrap();
        assert!(source.to_string().contains("pool timed out"));
    }

    #[test]
    fn test_rate_limited_sets_retry_after() {
        let response = AuthError::RateLimited { retry_after_secs: 42 }.into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers().get(header::RETRY_AFTER).unwrap(), "42");
    }
}
