//! Auth Middleware
//!
//! Per-IP rate limiting and CSRF enforcement for the auth routes.

use axum::body::Body;
use axum::extract::{ConnectInfo, State};
use axum::http::Request;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::Utc;
use platform::client::extract_client_ip;
use platform::cookie::read_cookie;
use platform::rate_limit::{RateLimitStore, now_ms};
use std::net::{IpAddr, SocketAddr};

use crate::application::{CsrfProtection, requires_csrf, session_token_from_headers};
use crate::domain::repository::{AuthorizationRepository, SessionRepository};
use crate::error::AuthError;
use crate::presentation::handlers::AuthAppState;

/// Middleware that answers 429 once a client IP exhausts its budget
///
/// A failing limiter store lets the request through.
pub async fn rate_limit_by_ip<R>(
    State(state): State<AuthAppState<R>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let Some(limit) = state.config.rate_limit.as_ref() else {
        return next.run(req).await;
    };

    let client_ip = client_ip(&req);
    let key = match client_ip {
        Some(ip) => format!("auth:{ip}"),
        None => "auth:unknown".to_string(),
    };

    match state.rate_limiter.check_and_increment(&key, limit).await {
        Ok(result) if result.allowed => next.run(req).await,
        Ok(result) => {
            tracing::warn!(
                client_ip = ?client_ip,
                path = %req.uri().path(),
                "Rate limit exceeded"
            );
            AuthError::RateLimited {
                retry_after_secs: result.retry_after_secs(now_ms()),
            }
            .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Rate limiter unavailable, allowing request");
            next.run(req).await
        }
    }
}

/// Middleware that rejects mutating requests without a valid CSRF token
///
/// The rejection (403) happens before the handler runs, so no side effect of
/// the wrapped route can take place.
pub async fn require_csrf<R>(
    State(state): State<AuthAppState<R>>,
    req: Request<Body>,
    next: Next,
) -> Response
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    if !requires_csrf(req.method()) {
        return next.run(req).await;
    }

    if !state.config.csrf_enforced {
        tracing::debug!(path = %req.uri().path(), "CSRF enforcement disabled");
        return next.run(req).await;
    }

    let headers = req.headers();
    let presented = headers
        .get(state.config.csrf_header_name.as_str())
        .and_then(|v| v.to_str().ok());
    let cookie = read_cookie(headers, &state.config.csrf_cookie_name);
    let session = session_token_from_headers(&state.config, headers);

    let csrf = CsrfProtection::new(state.config.clone(), state.tokens.clone());
    if let Err(e) = csrf.validate(presented, cookie.as_deref(), session.as_ref(), Utc::now()) {
        tracing::warn!(
            client_ip = ?client_ip(&req),
            method = %req.method(),
            path = %req.uri().path(),
            "Rejected request without a valid CSRF token"
        );
        return e.into_response();
    }

    next.run(req).await
}

/// Client IP from proxy headers, else the peer address
fn client_ip(req: &Request<Body>) -> Option<IpAddr> {
    let direct_ip = req
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|info| info.0.ip());
    extract_client_ip(req.headers(), direct_ip)
}
