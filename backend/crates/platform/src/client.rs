//! Client identification utilities
//!
//! Derive a stable client fingerprint and the client IP from request headers.

use axum::http::{HeaderMap, header};
use std::net::IpAddr;

use crate::crypto::{constant_time_eq, sha256};

/// Proxy headers consulted for the client IP, most trusted first
const CLIENT_IP_HEADERS: [&str; 4] = [
    "cf-connecting-ip",
    "x-real-ip",
    "x-forwarded-for",
    "x-client-ip",
];

/// Client fingerprint derived from request headers
///
/// Stored alongside a session to detect a credential replayed from a
/// different browser.
#[derive(Debug, Clone)]
pub struct ClientFingerprint {
    /// SHA-256 of the User-Agent header
    pub hash: [u8; 32],
}

impl ClientFingerprint {
    pub fn new(hash: [u8; 32]) -> Self {
        Self { hash }
    }

    /// Compare against a stored hash in constant time
    pub fn matches(&self, stored_hash: &[u8]) -> bool {
        constant_time_eq(&self.hash, stored_hash)
    }
}

/// Error when extracting client fingerprint
#[derive(Debug, Clone, thiserror::Error)]
pub enum FingerprintError {
    #[error("Missing required header: {0}")]
    MissingHeader(String),
}

/// Extract client fingerprint from request headers
///
/// ## Returns
/// * `Ok(ClientFingerprint)` - fingerprint of the User-Agent
/// * `Err(FingerprintError)` - missing or non-ASCII User-Agent header
pub fn extract_fingerprint(headers: &HeaderMap) -> Result<ClientFingerprint, FingerprintError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| FingerprintError::MissingHeader("User-Agent".to_string()))?;

    Ok(ClientFingerprint::new(sha256(user_agent.as_bytes())))
}

/// Extract client IP address from headers
///
/// Proxy headers are checked in order (first address of a comma separated
/// list); unparseable values are skipped. Falls back to the direct peer.
pub fn extract_client_ip(headers: &HeaderMap, direct_ip: Option<IpAddr>) -> Option<IpAddr> {
    CLIENT_IP_HEADERS
        .iter()
        .filter_map(|name| headers.get(*name).and_then(|v| v.to_str().ok()))
        .filter_map(|value| value.split(',').next())
        .find_map(|candidate| candidate.trim().parse::<IpAddr>().ok())
        .or(direct_ip)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_extract_fingerprint() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static("Mozilla/5.0 Test Browser"),
        );

        let fp = extract_fingerprint(&headers).unwrap();
        assert_eq!(fp.hash, sha256(b"Mozilla/5.0 Test Browser"));
        assert!(fp.matches(&sha256(b"Mozilla/5.0 Test Browser")));
        assert!(!fp.matches(&sha256(b"curl/8.0")));
    }

    #[test]
    fn test_extract_fingerprint_missing_ua() {
        let result = extract_fingerprint(&HeaderMap::new());
        assert!(matches!(result, Err(FingerprintError::MissingHeader(_))));
    }

    #[test]
    fn test_extract_client_ip_xff() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("192.168.1.1, 10.0.0.1"),
        );

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("192.168.1.1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_prefers_cloudflare() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1"));
        headers.insert("cf-connecting-ip", HeaderValue::from_static("203.0.113.7"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("203.0.113.7".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_skips_garbage() {
        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("unknown"));
        headers.insert("x-forwarded-for", HeaderValue::from_static("2001:db8::1"));

        let ip = extract_client_ip(&headers, None);
        assert_eq!(ip, Some("2001:db8::1".parse().unwrap()));
    }

    #[test]
    fn test_extract_client_ip_direct() {
        let direct: IpAddr = "127.0.0.1".parse().unwrap();
        let ip = extract_client_ip(&HeaderMap::new(), Some(direct));
        assert_eq!(ip, Some(direct));
    }
}
