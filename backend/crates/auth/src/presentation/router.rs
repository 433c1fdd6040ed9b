//! Auth Router
//!
//! Routes carry their full paths so the router can be merged at the root.

use axum::{
    Router, middleware,
    routing::{get, post},
};
use platform::rate_limit::MemoryRateLimitStore;
use platform::token::TokenGenerator;
use std::sync::Arc;

use crate::application::config::AuthConfig;
use crate::domain::repository::{AuthorizationRepository, SessionRepository};
use crate::error::AuthResult;
use crate::infra::postgres::PgAuthRepository;
use crate::presentation::handlers::{self, AuthAppState};
use crate::presentation::middleware::{rate_limit_by_ip, require_csrf};

/// Create the Auth router with PostgreSQL repository
pub fn auth_router(repo: PgAuthRepository, config: AuthConfig) -> AuthResult<Router> {
    auth_router_generic(repo, config)
}

/// Create a generic Auth router for any repository implementation
pub fn auth_router_generic<R>(repo: R, config: AuthConfig) -> AuthResult<Router>
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let tokens = TokenGenerator::new(config.token_bytes)?;
    Ok(auth_router_with_tokens(repo, config, tokens))
}

/// Create the Auth router with an explicit token generator
pub fn auth_router_with_tokens<R>(repo: R, config: AuthConfig, tokens: TokenGenerator) -> Router
where
    R: SessionRepository + AuthorizationRepository + Clone + Send + Sync + 'static,
{
    let state = AuthAppState {
        repo: Arc::new(repo),
        config: Arc::new(config),
        tokens: Arc::new(tokens),
        rate_limiter: Arc::new(MemoryRateLimitStore::new()),
    };

    let csrf_protected = Router::new()
        .route("/api/auth/logout", post(handlers::logout::<R>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            require_csrf::<R>,
        ));

    // Rate limiting wraps the CSRF check; firm logout is never limited
    Router::new()
        .route("/api/auth/csrf", get(handlers::csrf_token::<R>))
        .route("/api/auth/session", get(handlers::session_status::<R>))
        .route("/api/admin", get(handlers::admin_status::<R>))
        .merge(csrf_protected)
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            rate_limit_by_ip::<R>,
        ))
        .route("/api/firm/auth/logout", post(handlers::firm_logout::<R>))
        .with_state(state)
}
