//! Rate Limiting Infrastructure
//!
//! Fixed-window request counters keyed by an opaque client key.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Rate limit configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitConfig {
    /// Maximum requests allowed in the window
    pub max_requests: u32,
    /// Time window duration
    pub window: Duration,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            max_requests: 10,
            window: Duration::from_secs(60),
        }
    }
}

impl RateLimitConfig {
    pub fn new(max_requests: u32, window_secs: u64) -> Self {
        Self {
            max_requests,
            window: Duration::from_secs(window_secs),
        }
    }

    pub fn window_ms(&self) -> i64 {
        (self.window.as_millis() as i64).max(1)
    }
}

/// Rate limit check result
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitResult {
    pub allowed: bool,
    pub remaining: u32,
    pub reset_at_ms: i64,
}

impl RateLimitResult {
    /// Whole seconds until the window resets, at least 1
    pub fn retry_after_secs(&self, now_ms: i64) -> u64 {
        let ms = (self.reset_at_ms - now_ms).max(0) as u64;
        ms.div_ceil(1000).max(1)
    }
}

/// Trait for rate limit storage backends
#[trait_variant::make(RateLimitStore: Send)]
pub trait LocalRateLimitStore {
    /// Count one request for `key` and report whether it is allowed
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>>;
}

#[derive(Debug, Clone, Copy)]
struct Window {
    start_ms: i64,
    count: u32,
}

/// Process-local store
///
/// Windows are aligned to multiples of the window length. Denied requests
/// are not counted.
#[derive(Debug, Default)]
pub struct MemoryRateLimitStore {
    windows: Mutex<HashMap<String, Window>>,
}

impl MemoryRateLimitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Same as [`RateLimitStore::check_and_increment`] at a given instant
    pub fn check_at(
        &self,
        key: &str,
        config: &RateLimitConfig,
        now_ms: i64,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        let window_ms = config.window_ms();
        let start_ms = now_ms.div_euclid(window_ms) * window_ms;
        let reset_at_ms = start_ms + window_ms;

        let mut windows = self
            .windows
            .lock()
            .map_err(|_| "rate limit state poisoned")?;

        // Drop counters of finished windows so idle clients do not accumulate
        windows.retain(|_, w| w.start_ms + window_ms > now_ms);

        let window = windows.entry(key.to_string()).or_insert(Window { start_ms, count: 0 });
        if window.start_ms != start_ms {
            *window = Window { start_ms, count: 0 };
        }

        if window.count >= config.max_requests {
            return Ok(RateLimitResult {
                allowed: false,
                remaining: 0,
                reset_at_ms,
            });
        }

        window.count += 1;
        Ok(RateLimitResult {
            allowed: true,
            remaining: config.max_requests - window.count,
            reset_at_ms,
        })
    }

    /// Number of keys with a live window
    pub fn tracked_keys(&self) -> usize {
        self.windows.lock().map(|w| w.len()).unwrap_or(0)
    }
}

impl RateLimitStore for MemoryRateLimitStore {
    async fn check_and_increment(
        &self,
        key: &str,
        config: &RateLimitConfig,
    ) -> Result<RateLimitResult, Box<dyn std::error::Error + Send + Sync>> {
        self.check_at(key, config, now_ms())
    }
}

/// Milliseconds since the Unix epoch
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    const T0: i64 = 1_700_000_000_000;

    #[test]
    fn test_config() {
        let config = RateLimitConfig::default();
        assert_eq!(config.max_requests, 10);
        assert_eq!(config.window_ms(), 60_000);
        assert_eq!(RateLimitConfig::new(20, 600).window_ms(), 600_000);
    }

    #[test]
    fn test_denies_after_budget() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(3, 60);

        let remaining: Vec<u32> = (0..3)
            .map(|_| store.check_at("auth:10.0.0.1", &config, T0).unwrap())
            .inspect(|r| assert!(r.allowed))
            .map(|r| r.remaining)
            .collect();
        assert_eq!(remaining, vec![2, 1, 0]);

        let denied = store.check_at("auth:10.0.0.1", &config, T0 + 1).unwrap();
        assert!(!denied.allowed);
        assert_eq!(denied.remaining, 0);
    }

    #[test]
    fn test_keys_are_independent() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        assert!(store.check_at("a", &config, T0).unwrap().allowed);
        assert!(!store.check_at("a", &config, T0).unwrap().allowed);
        assert!(store.check_at("b", &config, T0).unwrap().allowed);
    }

    #[test]
    fn test_next_window_resets() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(1, 60);

        let first = store.check_at("a", &config, T0).unwrap();
        assert!(!store.check_at("a", &config, T0).unwrap().allowed);

        let later = store.check_at("a", &config, first.reset_at_ms).unwrap();
        assert!(later.allowed);
    }

    #[test]
    fn test_expired_windows_are_pruned() {
        let store = MemoryRateLimitStore::new();
        let config = RateLimitConfig::new(5, 60);

        store.check_at("a", &config, T0).unwrap();
        store.check_at("b", &config, T0).unwrap();
        assert_eq!(store.tracked_keys(), 2);

        store.check_at("c", &config, T0 + 120_000).unwrap();
        assert_eq!(store.tracked_keys(), 1);
    }

    #[test]
    fn test_retry_after() {
        let result = RateLimitResult {
            allowed: false,
            remaining: 0,
            reset_at_ms: T0 + 1_500,
        };
        assert_eq!(result.retry_after_secs(T0), 2);
        assert_eq!(result.retry_after_secs(T0 + 5_000), 1);
    }
}
