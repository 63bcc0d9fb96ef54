//! auth_http responses.
//!
//! nginx reads the verdict from headers, so every reply is `200 OK` with an
//! `Auth-Status` header: `OK` on success, a human-readable reason otherwise.

use axum::http::{HeaderMap, HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};

use crate::resolve::{Resolution, ResolveError};

pub const AUTH_STATUS: HeaderName = HeaderName::from_static("auth-status");
pub const AUTH_SERVER: HeaderName = HeaderName::from_static("auth-server");
pub const AUTH_PORT: HeaderName = HeaderName::from_static("auth-port");
pub const AUTH_PASS: HeaderName = HeaderName::from_static("auth-pass");
pub const X_CACHE: HeaderName = HeaderName::from_static("x-cache");

/// Password handed to the backend when nginx cannot relay the client's.
const CRAM_MD5_PASS: &str = "plain-text-pass";

/// Public text for an unusable per-domain record. nginx relays `Auth-Status`
/// to the mail client, so paths and decoder output stay in the logs.
const CONFIG_LOAD_FAILED: &str = "unable to load proxy config";

/// Reasons a request is turned away.
#[derive(Debug)]
pub enum Rejection {
    InvalidKey,
    MissingCredentials,
    InvalidAddress,
    Resolve(ResolveError),
    /// The request deadline passed before a verdict was reached.
    Timeout,
}

impl Rejection {
    /// Text sent back in `Auth-Status`.
    pub fn message(&self) -> String {
        match self {
            Rejection::InvalidKey => "invalid auth key, check your configuration".to_string(),
            Rejection::MissingCredentials => "username and password are required".to_string(),
            Rejection::InvalidAddress => "please use a valid email address".to_string(),
            Rejection::Resolve(ResolveError::ConfigDecode { .. }) => CONFIG_LOAD_FAILED.to_string(),
            Rejection::Resolve(e) => e.to_string(),
            Rejection::Timeout => "auth request timed out, try again later".to_string(),
        }
    }

    /// Full reason for operator logs.
    pub fn detail(&self) -> String {
        match self {
            Rejection::Resolve(e) => e.to_string(),
            other => other.message(),
        }
    }

    /// Metrics label.
    pub fn outcome(&self) -> &'static str {
        match self {
            Rejection::InvalidKey => "invalid_key",
            Rejection::MissingCredentials => "missing_credentials",
            Rejection::InvalidAddress => "invalid_address",
            Rejection::Resolve(ResolveError::ConfigDecode { .. }) => "config_error",
            Rejection::Resolve(ResolveError::UnknownProtocolOrTarget { .. }) => "unknown_protocol",
            Rejection::Timeout => "timeout",
        }
    }
}

/// Outcome of one auth_http request.
#[derive(Debug)]
pub enum AuthResponse {
    Accepted {
        resolution: Resolution,
        cram_md5: bool,
    },
    Rejected(Rejection),
}

impl AuthResponse {
    pub fn outcome(&self) -> &'static str {
        match self {
            AuthResponse::Accepted { .. } => "ok",
            AuthResponse::Rejected(rejection) => rejection.outcome(),
        }
    }

    pub fn headers(&self) -> HeaderMap {
        let mut headers = HeaderMap::new();
        match self {
            AuthResponse::Accepted {
                resolution,
                cram_md5,
            } => {
                headers.insert(AUTH_STATUS, HeaderValue::from_static("OK"));
                headers.insert(X_CACHE, HeaderValue::from_static(resolution.cache.as_str()));
                headers.insert(AUTH_SERVER, header_value(&resolution.host));
                headers.insert(AUTH_PORT, HeaderValue::from(resolution.port));
                if *cram_md5 {
                    headers.insert(AUTH_PASS, HeaderValue::from_static(CRAM_MD5_PASS));
                }
            }
            AuthResponse::Rejected(rejection) => {
                headers.insert(AUTH_STATUS, header_value(&rejection.message()));
            }
        }
        headers
    }
}

impl From<Rejection> for AuthResponse {
    fn from(rejection: Rejection) -> Self {
        AuthResponse::Rejected(rejection)
    }
}

impl IntoResponse for AuthResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, self.headers()).into_response()
    }
}

/// Header value from text, replacing anything a header cannot carry.
fn header_value(text: &str) -> HeaderValue {
    HeaderValue::from_str(text).unwrap_or_else(|_| {
        let cleaned: String = text
            .chars()
            .map(|c| if c.is_ascii() && !c.is_ascii_control() { c } else { '?' })
            .collect();
        HeaderValue::from_str(&cleaned).unwrap_or_else(|_| HeaderValue::from_static("error"))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolve::{CacheStatus, LoadError};

    #[test]
    fn test_accepted_headers() {
        let response = AuthResponse::Accepted {
            resolution: Resolution {
                host: "10.0.0.1".into(),
                port: 143,
                cache: CacheStatus::Miss,
            },
            cram_md5: true,
        };
        let headers = response.headers();
        assert_eq!(headers[&AUTH_STATUS], "OK");
        assert_eq!(headers[&AUTH_SERVER], "10.0.0.1");
        assert_eq!(headers[&AUTH_PORT], "143");
        assert_eq!(headers[&X_CACHE], "MISS");
        assert_eq!(headers[&AUTH_PASS], CRAM_MD5_PASS);
        assert_eq!(response.outcome(), "ok");
    }

    #[test]
    fn test_rejected_headers() {
        let response = AuthResponse::from(Rejection::Resolve(
            ResolveError::UnknownProtocolOrTarget {
                protocol: "pop4".into(),
            },
        ));
        let headers = response.headers();
        assert_eq!(
            headers[&AUTH_STATUS],
            "unable to find proxy server or port for protocol: 'pop4'"
        );
        assert!(headers.get(&AUTH_SERVER).is_none());
        assert_eq!(response.outcome(), "unknown_protocol");
    }

    #[test]
    fn test_config_error_detail_stays_in_logs() {
        let source = serde_json::from_str::<crate::resolve::TargetSet>(r#"{"imap": 1}"#)
            .unwrap_err();
        let rejection = Rejection::Resolve(ResolveError::ConfigDecode {
            domain: "broken.test".into(),
            source: LoadError::Decode {
                origin: "/etc/nginx-mail-auth-http/conf.d/broken.test".into(),
                source,
            },
        });

        assert_eq!(rejection.message(), "unable to load proxy config");
        assert!(rejection.detail().contains("/etc/nginx-mail-auth-http/conf.d/broken.test"));

        let response = AuthResponse::from(rejection);
        assert_eq!(response.headers()[&AUTH_STATUS], "unable to load proxy config");
        assert_eq!(response.outcome(), "config_error");
    }

    #[test]
    fn test_header_value_sanitized() {
        assert_eq!(header_value("caf\u{e9}\n"), "caf??");
    }
}
