//! CSRF Protection
//!
//! Signed double-submit tokens. A token is `nonce.issued_at.signature`, where
//! the signature is HMAC-SHA256 over `nonce.issued_at.binding` and `binding`
//! identifies the session the token was issued to (`-` without a session).
//!
//! The token travels twice: in the `csrf_token` cookie and in the
//! `x-csrf-token` request header. A cross-site page can make the browser send
//! the cookie but cannot read it to produce the header.

use std::sync::Arc;

use axum::http::Method;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use platform::crypto::{constant_time_eq, from_base64_url, to_base64_url};
use platform::token::TokenGenerator;

use crate::application::config::AuthConfig;
use crate::domain::value_object::session_token::SessionToken;
use crate::error::{AuthError, AuthResult, CsrfRejection};

type HmacSha256 = Hmac<Sha256>;

/// Binding used for tokens issued outside a session
const ANONYMOUS_BINDING: &str = "-";

/// Whether `method` can change server state and needs a CSRF token
pub fn requires_csrf(method: &Method) -> bool {
    ![Method::GET, Method::HEAD, Method::OPTIONS].contains(method)
}

/// Issues and validates CSRF tokens
pub struct CsrfProtection {
    config: Arc<AuthConfig>,
    tokens: Arc<TokenGenerator>,
}

impl CsrfProtection {
    pub fn new(config: Arc<AuthConfig>, tokens: Arc<TokenGenerator>) -> Self {
        Self { config, tokens }
    }

    /// Issue a token bound to `session` (or to no session)
    pub fn issue(&self, session: Option<&SessionToken>, now: DateTime<Utc>) -> AuthResult<String> {
        let nonce = self.tokens.generate()?;
        let issued_at = now.timestamp();

        let mac = self.mac(&nonce, issued_at, session)?;
        let signature = to_base64_url(&mac.finalize().into_bytes());

        Ok(format!("{nonce}.{issued_at}.{signature}"))
    }

    /// Double-submit check: header present, cookie present, both equal, and
    /// the token itself valid for `session` at `now`
    pub fn validate(
        &self,
        presented: Option<&str>,
        cookie: Option<&str>,
        session: Option<&SessionToken>,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        let presented = presented
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::CsrfValidationFailed(CsrfRejection::MissingHeader))?;
        let cookie = cookie
            .filter(|v| !v.is_empty())
            .ok_or(AuthError::CsrfValidationFailed(CsrfRejection::MissingCookie))?;

        if !constant_time_eq(presented.as_bytes(), cookie.as_bytes()) {
            return Err(AuthError::CsrfValidationFailed(CsrfRejection::Mismatch));
        }

        self.verify_token(presented, session, now)
    }

    /// Verify signature and age of a single token
    ///
    /// The signature is checked before the timestamp so a forged token never
    /// learns anything about expiry.
    pub fn verify_token(
        &self,
        token: &str,
        session: Option<&SessionToken>,
        now: DateTime<Utc>,
    ) -> AuthResult<()> {
        let reject = AuthError::CsrfValidationFailed;

        let mut parts = token.split('.');
        let (Some(nonce), Some(issued_at), Some(signature), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(reject(CsrfRejection::Malformed));
        };

        if nonce.is_empty() || !nonce.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(reject(CsrfRejection::Malformed));
        }
        let issued_at: i64 = issued_at
            .parse()
            .map_err(|_| reject(CsrfRejection::Malformed))?;
        let signature = from_base64_url(signature).map_err(|_| reject(CsrfRejection::Malformed))?;

        self.mac(nonce, issued_at, session)?
            .verify_slice(&signature)
            .map_err(|_| reject(CsrfRejection::BadSignature))?;

        let age = now.timestamp() - issued_at;
        if age < 0 {
            return Err(reject(CsrfRejection::IssuedInFuture));
        }
        if age > self.config.csrf_ttl_secs() {
            return Err(reject(CsrfRejection::Expired));
        }

        Ok(())
    }

    fn mac(
        &self,
        nonce: &str,
        issued_at: i64,
        session: Option<&SessionToken>,
    ) -> AuthResult<HmacSha256> {
        let binding = session
            .map(SessionToken::binding)
            .unwrap_or_else(|| ANONYMOUS_BINDING.to_string());

        let mut mac = HmacSha256::new_from_slice(&self.config.csrf_secret)
            .map_err(|e| AuthError::Internal(format!("CSRF key rejected: {e}")))?;
        mac.update(nonce.as_bytes());
        mac.update(b".");
        mac.update(issued_at.to_string().as_bytes());
        mac.update(b".");
        mac.update(binding.as_bytes());
        Ok(mac)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn protection() -> CsrfProtection {
        let config = AuthConfig::production([42u8; 32]);
        let tokens = TokenGenerator::new(config.token_bytes).unwrap();
        CsrfProtection::new(Arc::new(config), Arc::new(tokens))
    }

    fn rejection(result: AuthResult<()>) -> CsrfRejection {
        match result {
            Err(AuthError::CsrfValidationFailed(reason)) => reason,
            other => panic!("expected CSRF rejection, got {other:?}"),
        }
    }

    #[test]
    fn test_token_shape() {
        let token = protection().issue(None, Utc::now()).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        assert_eq!(parts.len(), 3);
        assert_eq!(parts[0].len(), 64);
    }

    #[test]
    fn test_lifetime_boundary() {
        let csrf = protection();
        let issued = Utc::now();
        let token = csrf.issue(None, issued).unwrap();

        assert!(csrf.verify_token(&token, None, issued).is_ok());
        assert!(csrf.verify_token(&token, None, issued + Duration::seconds(7199)).is_ok());
        assert!(csrf.verify_token(&token, None, issued + Duration::seconds(7200)).is_ok());
        assert_eq!(
            rejection(csrf.verify_token(&token, None, issued + Duration::seconds(7201))),
            CsrfRejection::Expired
        );
    }

    #[test]
    fn test_issued_in_future() {
        let csrf = protection();
        let now = Utc::now();
        let token = csrf.issue(None, now + Duration::seconds(60)).unwrap();
        assert_eq!(
            rejection(csrf.verify_token(&token, None, now)),
            CsrfRejection::IssuedInFuture
        );
    }

    #[test]
    fn test_bound_to_session() {
        let csrf = protection();
        let now = Utc::now();
        let session = SessionToken::parse("session-a").unwrap();
        let other = SessionToken::parse("session-b").unwrap();
        let token = csrf.issue(Some(&session), now).unwrap();

        assert!(csrf.verify_token(&token, Some(&session), now).is_ok());
        assert_eq!(
            rejection(csrf.verify_token(&token, Some(&other), now)),
            CsrfRejection::BadSignature
        );
        assert_eq!(
            rejection(csrf.verify_token(&token, None, now)),
            CsrfRejection::BadSignature
        );
    }

    #[test]
    fn test_other_secret_rejected() {
        let now = Utc::now();
        let token = protection().issue(None, now).unwrap();

        let config = AuthConfig::production([1u8; 32]);
        let tokens = TokenGenerator::new(32).unwrap();
        let other = CsrfProtection::new(Arc::new(config), Arc::new(tokens));
        assert_eq!(
            rejection(other.verify_token(&token, None, now)),
            CsrfRejection::BadSignature
        );
    }

    #[test]
    fn test_tampered_timestamp_rejected() {
        let csrf = protection();
        let now = Utc::now();
        let token = csrf.issue(None, now).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], now.timestamp() + 3600, parts[2]);
        assert_eq!(
            rejection(csrf.verify_token(&forged, None, now)),
            CsrfRejection::BadSignature
        );
    }

    #[test]
    fn test_malformed() {
        let csrf = protection();
        let now = Utc::now();
        for token in ["", "abc", "a.b", "zz.1.AAAA", "ab.notanumber.AAAA", "ab.1.!!!", "ab.1.AA.x"] {
            assert_eq!(
                rejection(csrf.verify_token(token, None, now)),
                CsrfRejection::Malformed,
                "token {token:?}"
            );
        }
    }

    #[test]
    fn test_double_submit() {
        let csrf = protection();
        let now = Utc::now();
        let token = csrf.issue(None, now).unwrap();

        assert!(csrf.validate(Some(&token), Some(&token), None, now).is_ok());
        assert_eq!(
            rejection(csrf.validate(None, Some(&token), None, now)),
            CsrfRejection::MissingHeader
        );
        assert_eq!(
            rejection(csrf.validate(Some(""), Some(&token), None, now)),
            CsrfRejection::MissingHeader
        );
        assert_eq!(
            rejection(csrf.validate(Some(&token), None, None, now)),
            CsrfRejection::MissingCookie
        );

        let other = csrf.issue(None, now).unwrap();
        assert_eq!(
            rejection(csrf.validate(Some(&token), Some(&other), None, now)),
            CsrfRejection::Mismatch
        );
    }

    #[test]
    fn test_safe_methods() {
        assert!(!requires_csrf(&Method::GET));
        assert!(!requires_csrf(&Method::HEAD));
        assert!(!requires_csrf(&Method::OPTIONS));
        assert!(requires_csrf(&Method::POST));
        assert!(requires_csrf(&Method::PUT));
        assert!(requires_csrf(&Method::PATCH));
        assert!(requires_csrf(&Method::DELETE));
    }
}
