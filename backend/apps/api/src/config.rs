//! Server Configuration
//!
//! Everything the binary reads from the environment (after `.env`).

use anyhow::{Context, bail};
use auth::{AuthConfig, RateLimitConfig};
use base64::Engine;
use base64::engine::general_purpose;
use std::env;
use std::net::SocketAddr;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:31113";
const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:40922,http://127.0.0.1:40922";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnv {
    Production,
    Development,
}

impl AppEnv {
    fn parse(value: &str) -> anyhow::Result<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Ok(AppEnv::Production),
            "development" | "dev" => Ok(AppEnv::Development),
            other => bail!("APP_ENV must be production or development, got {other:?}"),
        }
    }
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub app_env: AppEnv,
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub frontend_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl ServerConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `var`, which returns the value of a variable
    ///
    /// An unset `APP_ENV` means production.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let app_env = match var("APP_ENV") {
            Some(value) => AppEnv::parse(&value)?,
            None => AppEnv::Production,
        };

        let database_url = var("DATABASE_URL").context("DATABASE_URL must be set in environment")?;

        let database_max_connections = match var("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value
                .trim()
                .parse()
                .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .trim()
            .parse()
            .context("BIND_ADDR must be a socket address")?;

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let disable_csrf = var("DISABLE_CSRF").is_some_and(|v| v.trim() == "true");
        let csrf_secret = var("CSRF_SECRET");

        let auth = auth_config(app_env, csrf_secret.as_deref(), disable_csrf)?
            .with_rate_limit(rate_limit(&var)?);

        Ok(Self {
            app_env,
            database_url,
            database_max_connections,
            bind_addr,
            frontend_origins,
            auth,
        })
    }
}

fn auth_config(
    app_env: AppEnv,
    csrf_secret: Option<&str>,
    disable_csrf: bool,
) -> anyhow::Result<AuthConfig> {
    match app_env {
        AppEnv::Production => {
            let secret_b64 = csrf_secret.context("CSRF_SECRET must be set in production")?;
            if disable_csrf {
                tracing::warn!("DISABLE_CSRF is ignored in production");
            }
            Ok(AuthConfig::production(decode_secret(secret_b64)?))
        }
        AppEnv::Development => {
            let config = match csrf_secret {
                Some(secret_b64) => AuthConfig {
                    csrf_secret: decode_secret(secret_b64)?,
                    ..AuthConfig::development()?
                },
                None => AuthConfig::development()?,
            };
            if disable_csrf {
                tracing::warn!("CSRF protection disabled (development only)");
                Ok(config.without_csrf())
            } else {
                Ok(config)
            }
        }
    }
}

/// `RATE_LIMIT_MAX_REQUESTS=0` turns the per-IP limit off
fn rate_limit(var: &impl Fn(&str) -> Option<String>) -> anyhow::Result<Option<RateLimitConfig>> {
    let defaults = AuthConfig::default().rate_limit.unwrap_or_default();

    let max_requests = match var("RATE_LIMIT_MAX_REQUESTS") {
        Some(value) => value
            .trim()
            .parse()
            .context("RATE_LIMIT_MAX_REQUESTS must be a non-negative integer")?,
        None => defaults.max_requests,
    };
    let window_secs = match var("RATE_LIMIT_WINDOW_SECS") {
        Some(value) => value
            .trim()
            .parse::<u64>()
            .ok()
            .filter(|secs| *secs > 0)
            .context("RATE_LIMIT_WINDOW_SECS must be a positive integer")?,
        None => defaults.window.as_secs(),
    };

    if max_requests == 0 {
        tracing::warn!("Per-IP rate limiting disabled");
        return Ok(None);
    }
    Ok(Some(RateLimitConfig::new(max_requests, window_secs)))
}

fn decode_secret(secret_b64: &str) -> anyhow::Result<[u8; 32]> {
    let bytes = Engine::decode(&general_purpose::STANDARD, secret_b64.trim())
        .context("CSRF_SECRET must be base64")?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| anyhow::anyhow!("CSRF_SECRET must decode to 32 bytes, got {}", b.len()))
}
