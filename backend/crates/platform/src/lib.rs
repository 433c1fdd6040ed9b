//! Platform Crate - Technical Infrastructure
//!
//! Shared technical foundations for the access backend:
//! - Secure token generation (OS CSPRNG, fail-closed)
//! - Cookie value types and `Cookie` / `Set-Cookie` header handling
//! - Cryptographic helpers (SHA-256, constant-time comparison, base64url)
//! - Client identification (User-Agent fingerprint, client IP)
//! - Fixed-window rate limiting

pub mod client;
pub mod cookie;
pub mod crypto;
pub mod rate_limit;
pub mod token;
