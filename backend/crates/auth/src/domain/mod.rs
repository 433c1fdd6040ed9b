//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod entity;
pub mod repository;
pub mod value_object;

// Re-exports
pub use entity::{
    authorization::AuthorizationRecord,
    identity::{AuthenticatedUser, Identity},
    session::Session,
};
pub use kernel::id::UserId;
pub use repository::{AuthorizationRepository, SessionRepository};
pub use value_object::{capability::Capability, session_token::SessionToken};
