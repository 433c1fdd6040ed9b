//! Auth (Authentication) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Entities, value objects, repository traits
//! - `application/` - Use cases (identity, authorization, CSRF, sign out)
//! - `infra/` - Database implementations
//! - `presentation/` - HTTP handlers, DTOs, router, CSRF middleware
//!
//! ## Features
//! - Session cookie resolution to a request-scoped identity
//! - Admin allow-list authorization, failing closed
//! - Signed double-submit CSRF tokens for mutating requests
//! - Session and firm portal logout
//!
//! ## Security Model
//! - Session tokens are stored as SHA-256 hashes only
//! - CSRF tokens are HMAC-signed, bound to the session and expire after 2 hours
//! - Internal failures never grant access and never leak details to clients

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;


// Re-exports for convenience
pub use application::config::{AuthConfig, RateLimitConfig};
pub use error::{AuthError, AuthResult, CsrfRejection};
pub use infra::postgres::PgAuthRepository;
pub use presentation::router::{auth_router, auth_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

// Convenience re-exports
pub mod config {
    pub use crate::application::config::*;
}

pub mod models {
    pub use crate::domain::entity::*;
    pub use crate::domain::value_object::*;
    pub use crate::presentation::dto::*;
}

pub mod store {
    pub use crate::infra::postgres::PgAuthRepository as AuthStore;
}
