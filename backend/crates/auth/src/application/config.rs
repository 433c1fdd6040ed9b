//! Application Configuration
//!
//! Configuration for the Auth application layer.

use std::time::Duration;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;
use platform::cookie::CookieOptions;
pub use platform::rate_limit::RateLimitConfig;
use platform::token::{DEFAULT_TOKEN_BYTES, EntropyError, EntropySource, OsEntropy};

/// Requests per client IP and window on the auth and admin routes
pub const DEFAULT_RATE_LIMIT_MAX_REQUESTS: u32 = 60;
pub const DEFAULT_RATE_LIMIT_WINDOW_SECS: u64 = 60;

/// Auth application configuration
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// Session cookie name used behind HTTPS (`__Secure-` prefix)
    pub secure_session_cookie_name: String,
    /// Firm portal session cookie, only ever cleared by this service
    pub firm_session_cookie_name: String,
    /// CSRF cookie name
    pub csrf_cookie_name: String,
    /// Request header carrying the echoed CSRF token
    pub csrf_header_name: String,
    /// CSRF token lifetime (2 hours)
    pub csrf_ttl: Duration,
    /// HMAC key for CSRF token signatures (32 bytes)
    pub csrf_secret: [u8; 32],
    /// Whether mutating requests must carry a valid CSRF token
    pub csrf_enforced: bool,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy of the session cookie
    pub session_same_site: SameSite,
    /// Random bytes per generated token
    pub token_bytes: usize,
    /// Per-IP budget for the auth and admin routes (`None` disables it)
    pub rate_limit: Option<RateLimitConfig>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "bindme_session".to_string(),
            secure_session_cookie_name: "__Secure-bindme_session".to_string(),
            firm_session_cookie_name: "firm_auth_token".to_string(),
            csrf_cookie_name: "csrf_token".to_string(),
            csrf_header_name: "x-csrf-token".to_string(),
            csrf_ttl: Duration::from_secs(2 * 3600), // 2 hours
            csrf_secret: [0u8; 32],
            csrf_enforced: true,
            cookie_secure: true,
            session_same_site: SameSite::Lax,
            token_bytes: DEFAULT_TOKEN_BYTES,
            rate_limit: Some(RateLimitConfig::new(
                DEFAULT_RATE_LIMIT_MAX_REQUESTS,
                DEFAULT_RATE_LIMIT_WINDOW_SECS,
            )),
        }
    }
}

impl AuthConfig {
    /// Create config for production with the given CSRF secret
    ///
    /// CSRF enforcement is always on in production.
    pub fn production(csrf_secret: [u8; 32]) -> Self {
        Self {
            csrf_secret,
            ..Default::default()
        }
    }

    /// Create config with a random CSRF secret (for development)
    pub fn with_random_secret() -> Result<Self, EntropyError> {
        let mut secret = [0u8; 32];
        OsEntropy.fill(&mut secret)?;
        Ok(Self {
            csrf_secret: secret,
            ..Default::default()
        })
    }

    /// Create config for development (insecure cookie, random secret)
    pub fn development() -> Result<Self, EntropyError> {
        Ok(Self {
            cookie_secure: false,
            ..Self::with_random_secret()?
        })
    }

    /// Disable CSRF enforcement (development only)
    pub fn without_csrf(self) -> Self {
        Self {
            csrf_enforced: false,
            ..self
        }
    }

    /// Replace the per-IP rate limit (`None` disables it)
    pub fn with_rate_limit(self, rate_limit: Option<RateLimitConfig>) -> Self {
        Self { rate_limit, ..self }
    }

    /// Session cookie names, in lookup order
    pub fn session_cookie_names(&self) -> [&str; 2] {
        [
            self.session_cookie_name.as_str(),
            self.secure_session_cookie_name.as_str(),
        ]
    }

    /// CSRF token lifetime in seconds
    pub fn csrf_ttl_secs(&self) -> i64 {
        self.csrf_ttl.as_secs() as i64
    }

    /// Attributes of the session cookie (used when clearing it)
    pub fn session_cookie_options(&self) -> CookieOptions {
        CookieOptions::http_only(self.cookie_secure, self.session_same_site, None)
    }

    /// Attributes of the CSRF cookie: script readable, strict, 2 hours
    pub fn csrf_cookie_options(&self) -> CookieOptions {
        CookieOptions::script_readable(self.cookie_secure, SameSite::Strict, Some(self.csrf_ttl))
    }

    /// Attributes of the firm session cookie
    ///
    /// Always Secure: the firm portal is only served over HTTPS.
    pub fn firm_cookie_options(&self) -> CookieOptions {
        CookieOptions::http_only(true, SameSite::Strict, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_production_defaults() {
        let config = AuthConfig::production([7u8; 32]);
        assert!(config.csrf_enforced);
        assert!(config.cookie_secure);
        assert_eq!(config.csrf_ttl_secs(), 7200);
        assert_eq!(config.session_cookie_names(), ["bindme_session", "__Secure-bindme_session"]);
        assert_eq!(config.rate_limit, Some(RateLimitConfig::new(60, 60)));
    }

    #[test]
    fn test_development_is_insecure_with_random_secret() {
        let a = AuthConfig::development().unwrap();
        let b = AuthConfig::development().unwrap();
        assert!(!a.cookie_secure);
        assert_ne!(a.csrf_secret, [0u8; 32]);
        assert_ne!(a.csrf_secret, b.csrf_secret);
    }

    #[test]
    fn test_csrf_cookie_is_script_readable() {
        let options = AuthConfig::production([0u8; 32]).csrf_cookie_options();
        assert!(!options.http_only);
        assert_eq!(options.same_site, SameSite::Strict);
        assert_eq!(options.max_age, Some(Duration::from_secs(7200)));
        assert_eq!(options.path, "/");
    }
}
