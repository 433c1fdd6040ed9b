//! Application Layer
//!
//! Use cases and application services.

pub mod authorize;
pub mod config;
pub mod csrf;
pub mod resolve_identity;
pub mod sign_out;

// Re-exports
pub use authorize::AuthorizationGate;
pub use config::AuthConfig;
pub use csrf::{CsrfProtection, requires_csrf};
pub use resolve_identity::{ResolveIdentityUseCase, session_token_from_headers};
pub use sign_out::SignOutUseCase;
