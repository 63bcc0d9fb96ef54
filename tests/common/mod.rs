//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::body::Body;
use axum::http::{Request, Response};
use mail_auth_http::config::ServiceConfig;
use tower::ServiceExt;

pub const GLOBAL_CONFIG: &str = r#"{
    "default": {
        "imap": {"ip": "10.0.0.1", "port": 143},
        "pop3": {"ip": "10.0.0.1", "port": 110},
        "smtp": {"ip": "10.0.0.1", "port": 25}
    },
    "templates": {
        "biz": {"pop3": {"ip": "10.0.0.5", "port": 110}}
    }
}"#;

/// A throwaway config directory: `config.json` plus `conf.d/`.
pub struct ConfigDir {
    root: PathBuf,
}

impl ConfigDir {
    pub fn new() -> Self {
        static COUNTER: AtomicUsize = AtomicUsize::new(0);
        let root = std::env::temp_dir().join(format!(
            "mail-auth-http-it-{}-{}",
            std::process::id(),
            COUNTER.fetch_add(1, Ordering::SeqCst)
        ));
        fs::create_dir_all(root.join("conf.d")).unwrap();
        fs::write(root.join("config.json"), GLOBAL_CONFIG).unwrap();
        Self { root }
    }

    pub fn path(&self) -> &Path {
        &self.root
    }

    /// Write (or overwrite) the override record for `domain`.
    pub fn write_domain(&self, domain: &str, json: &str) {
        fs::write(self.root.join("conf.d").join(domain), json).unwrap();
    }

    /// Service settings pointing at this directory.
    pub fn service_config(&self) -> ServiceConfig {
        let mut config = ServiceConfig::default();
        config.listener.bind_address = "127.0.0.1:0".to_string();
        config.paths.config_path = self.root.clone();
        config
    }
}

impl Drop for ConfigDir {
    fn drop(&mut self) {
        let _ = fs::remove_dir_all(&self.root);
    }
}

/// Build an auth_http request the way nginx sends it.
pub fn auth_request(user: &str, pass: &str, protocol: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri("/auth")
        .header("Auth-Method", "plain")
        .header("Auth-User", user)
        .header("Auth-Pass", pass)
        .header("Auth-Protocol", protocol)
        .header("Auth-Login-Attempt", "1")
        .header("Client-IP", "127.0.0.1")
        .header("Client-Host", "test.example.com")
        .body(Body::empty())
        .unwrap()
}

/// Send one request through a router in-process.
pub async fn send(router: &axum::Router, request: Request<Body>) -> Response<Body> {
    router.clone().oneshot(request).await.unwrap()
}

/// A response header as a string, or "" when absent.
pub fn header<'a>(response: &'a Response<Body>, name: &str) -> &'a str {
    response
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}
