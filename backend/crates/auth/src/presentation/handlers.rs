//! HTTP Handlers

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use std::sync::Arc;

use platform::cookie::{Cookie, CookieOptions, append_set_cookie};
use platform::rate_limit::MemoryRateLimitStore;
use platform::token::TokenGenerator;

use crate::application::config::AuthConfig;
use crate::application::{
    AuthorizationGate, CsrfProtection, ResolveIdentityUseCase, SignOutUseCase,
    session_token_from_headers,
};
use crate::domain::entity::identity::Identity;
use crate::domain::repository::{AuthorizationRepository, SessionRepository};
use crate::domain::value_object::capability::Capability;
use crate::error::{AuthError, AuthResult};
use crate::presentation::dto::{
    AdminStatusResponse, CsrfTokenResponse, LogoutRequest, LogoutResponse, SessionStatusResponse,
};

/// Shared state for auth handlers
#[derive(Clone)]
pub struct AuthAppState<R>
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub config: Arc<AuthConfig>,
    pub tokens: Arc<TokenGenerator>,
    pub rate_limiter: Arc<MemoryRateLimitStore>,
}

// ============================================================================
// CSRF Token
// ============================================================================

/// GET /api/auth/csrf
///
/// Issues a fresh token bound to the caller's session (if any) and sets it
/// as the `csrf_token` cookie.
pub async fn csrf_token<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let session = session_token_from_headers(&state.config, &headers);

    let csrf = CsrfProtection::new(state.config.clone(), state.tokens.clone());
    let token = csrf.issue(session.as_ref(), Utc::now())?;

    let cookie = Cookie::new(
        state.config.csrf_cookie_name.as_str(),
        token.as_str(),
        state.config.csrf_cookie_options(),
    );

    let mut response_headers = HeaderMap::new();
    append_set_cookie(&mut response_headers, &cookie)
        .map_err(|e| AuthError::Internal(e.to_string()))?;
    response_headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

    Ok((
        StatusCode::OK,
        response_headers,
        Json(CsrfTokenResponse { csrf_token: token }),
    )
        .into_response())
}

// ============================================================================
// Admin Status
// ============================================================================

/// GET /api/admin
///
/// Always answers with an `isAdmin` body: 401 without a live session, 500 on
/// any internal failure.
pub async fn admin_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> Response
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let resolver = ResolveIdentityUseCase::new(state.repo.clone(), state.config.clone());

    let identity = match resolver.resolve(&headers).await {
        Ok(identity) => identity,
        Err(e) => {
            e.log();
            return admin_response(StatusCode::INTERNAL_SERVER_ERROR, false, HeaderMap::new());
        }
    };

    if !identity.is_authenticated() {
        let cookies = stale_session_headers(&state.config, &identity);
        return admin_response(StatusCode::UNAUTHORIZED, false, cookies);
    }

    let gate = AuthorizationGate::new(state.repo.clone());
    match gate.is_authorized(&identity, Capability::Admin).await {
        Ok(is_admin) => admin_response(StatusCode::OK, is_admin, HeaderMap::new()),
        Err(e) => {
            e.log();
            admin_response(StatusCode::INTERNAL_SERVER_ERROR, false, HeaderMap::new())
        }
    }
}

fn admin_response(status: StatusCode, is_admin: bool, mut headers: HeaderMap) -> Response {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    (status, headers, Json(AdminStatusResponse { is_admin })).into_response()
}

// ============================================================================
// Session Status
// ============================================================================

/// GET /api/auth/session
pub async fn session_status<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
) -> AuthResult<Response>
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let resolver = ResolveIdentityUseCase::new(state.repo.clone(), state.config.clone());
    let identity = resolver.resolve(&headers).await?;

    let body = match identity.user() {
        Some(user) => SessionStatusResponse {
            authenticated: true,
            user_id: Some(user.user_id.to_string()),
            expires_at: Some(user.session_expires_at),
        },
        None => SessionStatusResponse {
            authenticated: false,
            user_id: None,
            expires_at: None,
        },
    };

    let cookies = stale_session_headers(&state.config, &identity);
    Ok((StatusCode::OK, cookies, Json(body)).into_response())
}

// ============================================================================
// Logout
// ============================================================================

/// POST /api/auth/logout
///
/// Runs behind the CSRF middleware. Clears the session and CSRF cookies even
/// when no session was found.
pub async fn logout<R>(
    State(state): State<AuthAppState<R>>,
    headers: HeaderMap,
    body: Bytes,
) -> AuthResult<Response>
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let req = parse_logout_request(&body)?;

    if let Some(token) = session_token_from_headers(&state.config, &headers) {
        let use_case = SignOutUseCase::new(state.repo.clone());
        if req.all_sessions {
            use_case.execute_all(&token).await?;
        } else {
            use_case.execute(&token).await?;
        }
    }

    let mut cookies = session_removal_cookies(&state.config);
    cookies.push(Cookie::removal(
        state.config.csrf_cookie_name.as_str(),
        &state.config.csrf_cookie_options(),
    ));

    Ok((
        StatusCode::OK,
        cookie_headers(&cookies),
        Json(LogoutResponse { success: true }),
    )
        .into_response())
}

/// Empty (or whitespace) bodies mean "current session only"
fn parse_logout_request(body: &[u8]) -> AuthResult<LogoutRequest> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(LogoutRequest::default());
    }
    serde_json::from_slice(body)
        .map_err(|e| AuthError::InvalidRequest(format!("Invalid logout request: {e}")))
}

// ============================================================================
// Firm Logout
// ============================================================================

/// POST /api/firm/auth/logout
///
/// Stateless: only expires the firm portal cookie. Never fails.
pub async fn firm_logout<R>(State(state): State<AuthAppState<R>>) -> Response
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let cookie = Cookie::removal(
        state.config.firm_session_cookie_name.as_str(),
        &state.config.firm_cookie_options(),
    );

    tracing::debug!("Firm session cookie cleared");

    (
        StatusCode::OK,
        cookie_headers(&[cookie]),
        Json(LogoutResponse { success: true }),
    )
        .into_response()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Removal cookies for both session cookie names
///
/// The `__Secure-` name is only accepted by browsers with `Secure` set.
fn session_removal_cookies(config: &AuthConfig) -> Vec<Cookie> {
    let options = config.session_cookie_options();
    let secure_options = CookieOptions {
        secure: true,
        ..options.clone()
    };

    vec![
        Cookie::removal(config.session_cookie_name.as_str(), &options),
        Cookie::removal(config.secure_session_cookie_name.as_str(), &secure_options),
    ]
}

/// `Set-Cookie` headers clearing a session cookie that no longer resolves
fn stale_session_headers(config: &AuthConfig, identity: &Identity) -> HeaderMap {
    if identity.has_stale_cookie() {
        cookie_headers(&session_removal_cookies(config))
    } else {
        HeaderMap::new()
    }
}

fn cookie_headers(cookies: &[Cookie]) -> HeaderMap {
    let mut headers = HeaderMap::new();
    for cookie in cookies {
        if let Err(e) = append_set_cookie(&mut headers, cookie) {
            tracing::error!(error = %e, "Failed to serialize cookie");
        }
    }
    headers
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_logout_request() {
        assert!(!parse_logout_request(b"").unwrap().all_sessions);
        assert!(!parse_logout_request(b"  \n").unwrap().all_sessions);
        assert!(!parse_logout_request(b"{}").unwrap().all_sessions);
        assert!(parse_logout_request(br#"{"allSessions":true}"#).unwrap().all_sessions);

        assert!(matches!(
            parse_logout_request(br#"{"everything":true}"#),
            Err(AuthError::InvalidRequest(_))
        ));
        assert!(matches!(
            parse_logout_request(b"not json"),
            Err(AuthError::InvalidRequest(_))
        ));
    }

    #[test]
    fn test_session_removal_cookies() {
        let config = AuthConfig::production([0u8; 32]);
        let cookies = session_removal_cookies(&config);
        assert_eq!(cookies.len(), 2);
        assert!(cookies.iter().all(Cookie::is_removal));
        assert!(cookies.iter().all(|c| c.options.http_only));
        assert_eq!(cookies[1].name, "__Secure-bindme_session");
        assert!(cookies[1].options.secure);
    }
}
