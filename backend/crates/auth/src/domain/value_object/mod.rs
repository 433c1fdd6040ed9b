//! Value Object Module

pub mod capability;
pub mod session_token;
