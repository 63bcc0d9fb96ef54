//! Request handling for the auth_http protocol.
//!
//! # Responsibilities
//! - Pull the auth_http fields out of the request headers
//! - Split the login into local part and domain
//! - Produce a header dump safe for debug logs
//!
//! # Design Decisions
//! - Missing headers read as empty strings; the handler decides what is required
//! - Secrets are redacted before anything reaches the log

use axum::http::HeaderMap;

pub const AUTH_METHOD: &str = "auth-method";
pub const AUTH_USER: &str = "auth-user";
pub const AUTH_PASS: &str = "auth-pass";
pub const AUTH_PROTOCOL: &str = "auth-protocol";

/// The fields of an nginx auth_http request this service reads.
#[derive(Debug, Clone, Copy, Default)]
pub struct AuthRequest<'a> {
    pub method: &'a str,
    pub user: &'a str,
    pub pass: &'a str,
    pub protocol: &'a str,
}

impl<'a> AuthRequest<'a> {
    pub fn from_headers(headers: &'a HeaderMap) -> Self {
        let get = |name: &str| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .unwrap_or_default()
        };
        Self {
            method: get(AUTH_METHOD),
            user: get(AUTH_USER),
            pass: get(AUTH_PASS),
            protocol: get(AUTH_PROTOCOL),
        }
    }

    pub fn has_credentials(&self) -> bool {
        !self.user.is_empty() && !self.pass.is_empty()
    }

    /// nginx cannot relay a CRAM-MD5 exchange, so the backend needs a
    /// plain password handed back in the response.
    pub fn is_cram_md5(&self) -> bool {
        self.method.eq_ignore_ascii_case("cram-md5")
    }
}

/// Split `user@domain`, returning `(local, domain)`.
///
/// Uses the rightmost `@` whose remainder looks like a domain: at least one
/// `.` with characters on both sides. The local part must be non-empty.
pub fn split_address(user: &str) -> Option<(&str, &str)> {
    user.rmatch_indices('@')
        .map(|(at, _)| (&user[..at], &user[at + 1..]))
        .find(|(local, domain)| !local.is_empty() && looks_like_domain(domain))
}

fn looks_like_domain(domain: &str) -> bool {
    domain
        .char_indices()
        .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len())
}

/// Render headers for debug logging with secrets masked.
pub fn redacted(headers: &HeaderMap, secret_header: Option<&str>) -> Vec<(String, String)> {
    headers
        .iter()
        .map(|(name, value)| {
            let secret = name.as_str() == AUTH_PASS
                || secret_header.is_some_and(|h| name.as_str().eq_ignore_ascii_case(h));
            let value = if secret {
                "<redacted>".to_string()
            } else {
                String::from_utf8_lossy(value.as_bytes()).into_owned()
            };
            (name.to_string(), value)
        })
        .collect()
}
