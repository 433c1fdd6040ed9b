//! Cookie Management Infrastructure
//!
//! Cookies are explicit values (name, value, attributes) that serialize to a
//! `Set-Cookie` header. Reading never fails: a missing or malformed `Cookie`
//! header simply yields `None`.

use std::time::Duration;

use axum::http::{HeaderMap, HeaderValue, header};

/// SameSite policy for cookies
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    #[default]
    Strict,
    Lax,
    None,
}

impl SameSite {
    pub fn as_str(&self) -> &'static str {
        match self {
            SameSite::Strict => "Strict",
            SameSite::Lax => "Lax",
            SameSite::None => "None",
        }
    }
}

/// Cookie attributes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub http_only: bool,
    pub same_site: SameSite,
    pub secure: bool,
    pub path: String,
    /// `None` makes a browser-session cookie
    pub max_age: Option<Duration>,
}

impl Default for CookieOptions {
    fn default() -> Self {
        Self {
            http_only: true,
            same_site: SameSite::Strict,
            secure: true,
            path: "/".to_string(),
            max_age: None,
        }
    }
}

impl CookieOptions {
    /// Attributes for a credential the browser must hide from scripts
    pub fn http_only(secure: bool, same_site: SameSite, max_age: Option<Duration>) -> Self {
        Self {
            http_only: true,
            same_site,
            secure,
            max_age,
            ..Default::default()
        }
    }

    /// Attributes for a value client code reads and echoes back
    pub fn script_readable(secure: bool, same_site: SameSite, max_age: Option<Duration>) -> Self {
        Self {
            http_only: false,
            same_site,
            secure,
            max_age,
            ..Default::default()
        }
    }
}

/// A cookie to be sent in a `Set-Cookie` header
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cookie {
    pub name: String,
    pub value: String,
    pub options: CookieOptions,
}

/// Set-Cookie serialization failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CookieError {
    #[error("Invalid cookie name: {0:?}")]
    InvalidName(String),

    #[error("Invalid value for cookie {0}")]
    InvalidValue(String),
}

impl Cookie {
    pub fn new(name: impl Into<String>, value: impl Into<String>, options: CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
            options,
        }
    }

    /// An immediately expiring cookie that removes `name` from the browser
    ///
    /// Path, Secure and SameSite must match the original cookie for browsers
    /// to replace it, so they are kept from `options`.
    pub fn removal(name: impl Into<String>, options: &CookieOptions) -> Self {
        Self {
            name: name.into(),
            value: String::new(),
            options: CookieOptions {
                max_age: Some(Duration::ZERO),
                ..options.clone()
            },
        }
    }

    /// Whether this cookie instructs the browser to delete it
    pub fn is_removal(&self) -> bool {
        self.options.max_age == Some(Duration::ZERO)
    }

    /// Serialize to `Set-Cookie` syntax
    pub fn to_header_string(&self) -> String {
        let mut cookie = format!("{}={}", self.name, self.value);

        cookie.push_str(&format!("; Path={}", self.options.path));
        if let Some(max_age) = self.options.max_age {
            cookie.push_str(&format!("; Max-Age={}", max_age.as_secs()));
            if max_age.is_zero() {
                cookie.push_str("; Expires=Thu, 01 Jan 1970 00:00:00 GMT");
            }
        }
        if self.options.http_only {
            cookie.push_str("; HttpOnly");
        }
        if self.options.secure {
            cookie.push_str("; Secure");
        }
        cookie.push_str(&format!("; SameSite={}", self.options.same_site.as_str()));

        cookie
    }

    /// Serialize to a header value, validating name and value characters
    pub fn to_header_value(&self) -> Result<HeaderValue, CookieError> {
        if self.name.is_empty() || !self.name.bytes().all(is_token_byte) {
            return Err(CookieError::InvalidName(self.name.clone()));
        }
        if !self.value.bytes().all(is_cookie_octet) {
            return Err(CookieError::InvalidValue(self.name.clone()));
        }
        HeaderValue::from_str(&self.to_header_string())
            .map_err(|_| CookieError::InvalidValue(self.name.clone()))
    }
}

/// Append a `Set-Cookie` header (existing ones are kept)
pub fn append_set_cookie(headers: &mut HeaderMap, cookie: &Cookie) -> Result<(), CookieError> {
    let value = cookie.to_header_value()?;
    headers.append(header::SET_COOKIE, value);
    Ok(())
}

/// Extract a cookie value from request headers
///
/// Scans every `Cookie` header line; the first match wins.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|line| line.split(';'))
        .find_map(|pair| {
            let (key, value) = pair.trim().split_once('=')?;
            if key.trim() == name {
                Some(value.trim().trim_matches('"').to_string())
            } else {
                None
            }
        })
}

/// RFC 6265 token characters (cookie names)
fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

/// RFC 6265 cookie-octet
fn is_cookie_octet(b: u8) -> bool {
    matches!(b, 0x21 | 0x23..=0x2B | 0x2D..=0x3A | 0x3C..=0x5B | 0x5D..=0x7E)
}
