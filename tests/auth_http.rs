//! auth_http protocol tests, driving the router in-process.

use axum::http::StatusCode;
use mail_auth_http::lifecycle::Service;

mod common;

use common::{auth_request, header, send, ConfigDir};

#[tokio::test]
async fn test_default_target_then_cache_hit() {
    let dir = ConfigDir::new();
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("test@nowhere.test", "test1234", "imap")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "Auth-Status"), "OK");
    assert_eq!(header(&res, "Auth-Server"), "10.0.0.1");
    assert_eq!(header(&res, "Auth-Port"), "143");
    assert_eq!(header(&res, "X-Cache"), "MISS");
    assert!(!header(&res, "x-request-id").is_empty());

    let res = send(&router, auth_request("other@nowhere.test", "pw", "imap")).await;
    assert_eq!(header(&res, "Auth-Server"), "10.0.0.1");
    assert_eq!(header(&res, "Auth-Port"), "143");
    assert_eq!(header(&res, "X-Cache"), "HIT");
}

#[tokio::test]
async fn test_template_and_domain_override() {
    let dir = ConfigDir::new();
    dir.write_domain(
        "example.com",
        r#"{"template": "biz", "imap": {"ip": "10.0.0.9", "port": 143}}"#,
    );
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let expected = [("imap", "10.0.0.9", "143"), ("pop3", "10.0.0.5", "110"), ("smtp", "10.0.0.1", "25")];
    for (protocol, server, port) in expected {
        let res = send(&router, auth_request("user@example.com", "pw", protocol)).await;
        assert_eq!(header(&res, "Auth-Status"), "OK", "{protocol}");
        assert_eq!(header(&res, "Auth-Server"), server, "{protocol}");
        assert_eq!(header(&res, "Auth-Port"), port, "{protocol}");
    }
}

#[tokio::test]
async fn test_domain_is_case_insensitive() {
    let dir = ConfigDir::new();
    dir.write_domain("example.com", r#"{"smtp": {"host": "10.0.0.7", "port": 587}}"#);
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("User@Example.COM", "pw", "smtp")).await;
    assert_eq!(header(&res, "Auth-Server"), "10.0.0.7");
    assert_eq!(header(&res, "Auth-Port"), "587");
}

#[tokio::test]
async fn test_malformed_domain_record() {
    let dir = ConfigDir::new();
    dir.write_domain("broken.test", r#"{"imap": {"ip": "10.0.0.9"}}"#);
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("user@broken.test", "pw", "imap")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "Auth-Status"), "unable to load proxy config");
    assert!(header(&res, "Auth-Server").is_empty());
    assert!(service.cache().is_empty());

    // Fixing the record takes effect on the next request, nothing was cached.
    dir.write_domain("broken.test", r#"{"imap": {"ip": "10.0.0.9", "port": 993}}"#);
    let res = send(&router, auth_request("user@broken.test", "pw", "imap")).await;
    assert_eq!(header(&res, "Auth-Status"), "OK");
    assert_eq!(header(&res, "Auth-Port"), "993");
    assert_eq!(header(&res, "X-Cache"), "MISS");
}

#[tokio::test]
async fn test_blank_host_record_is_a_config_error() {
    let dir = ConfigDir::new();
    dir.write_domain("empty.test", r#"{"imap": {"host": "", "port": 143}}"#);
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("user@empty.test", "pw", "imap")).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(header(&res, "Auth-Status"), "unable to load proxy config");
    assert!(header(&res, "Auth-Server").is_empty());
    assert!(header(&res, "Auth-Port").is_empty());
    assert!(service.cache().is_empty());
}

#[tokio::test]
async fn test_unknown_protocol() {
    let dir = ConfigDir::new();
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("user@example.com", "pw", "pop4")).await;
    assert_eq!(
        header(&res, "Auth-Status"),
        "unable to find proxy server or port for protocol: 'pop4'"
    );
    assert!(header(&res, "Auth-Port").is_empty());
}

#[tokio::test]
async fn test_rejects_bad_logins() {
    let dir = ConfigDir::new();
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("user@example.com", "", "imap")).await;
    assert_eq!(header(&res, "Auth-Status"), "username and password are required");

    let res = send(&router, auth_request("", "pw", "imap")).await;
    assert_eq!(header(&res, "Auth-Status"), "username and password are required");

    let res = send(&router, auth_request("not-an-address", "pw", "imap")).await;
    assert_eq!(header(&res, "Auth-Status"), "please use a valid email address");

    let res = send(&router, auth_request("user@localhost", "pw", "imap")).await;
    assert_eq!(header(&res, "Auth-Status"), "please use a valid email address");
}

#[tokio::test]
async fn test_cram_md5_gets_plain_password() {
    let dir = ConfigDir::new();
    let service = Service::prepare(dir.service_config()).unwrap();
    let router = service.http_server().router();

    let mut request = auth_request("user@example.com", "pw", "imap");
    request
        .headers_mut()
        .insert("Auth-Method", "cram-md5".parse().unwrap());
    let res = send(&router, request).await;
    assert_eq!(header(&res, "Auth-Status"), "OK");
    assert_eq!(header(&res, "Auth-Pass"), "plain-text-pass");

    let res = send(&router, auth_request("user@example.com", "pw", "imap")).await;
    assert!(header(&res, "Auth-Pass").is_empty());
}

#[tokio::test]
async fn test_shared_secret() {
    let dir = ConfigDir::new();
    let mut config = dir.service_config();
    config.auth.key = Some("s3cret".into());
    let service = Service::prepare(config).unwrap();
    let router = service.http_server().router();

    let res = send(&router, auth_request("user@example.com", "pw", "imap")).await;
    assert_eq!(
        header(&res, "Auth-Status"),
        "invalid auth key, check your configuration"
    );

    let mut request = auth_request("user@example.com", "pw", "imap");
    request.headers_mut().insert("Auth-Key", "wrong".parse().unwrap());
    let res = send(&router, request).await;
    assert_eq!(
        header(&res, "Auth-Status"),
        "invalid auth key, check your configuration"
    );
    assert!(service.cache().is_empty());

    let mut request = auth_request("user@example.com", "pw", "imap");
    request.headers_mut().insert("Auth-Key", "s3cret".parse().unwrap());
    let res = send(&router, request).await;
    assert_eq!(header(&res, "Auth-Status"), "OK");
}

#[tokio::test]
async fn test_custom_secret_header() {
    let dir = ConfigDir::new();
    let mut config = dir.service_config();
    config.auth.key = Some("s3cret".into());
    config.auth.header = "X-Nginx-Secret".into();
    let service = Service::prepare(config).unwrap();
    let router = service.http_server().router();

    let mut request = auth_request("user@example.com", "pw", "smtp");
    request.headers_mut().insert("X-Nginx-Secret", "s3cret".parse().unwrap());
    let res = send(&router, request).await;
    assert_eq!(header(&res, "Auth-Status"), "OK");
    assert_eq!(header(&res, "Auth-Port"), "25");
}

#[test]
fn test_prepare_rejects_bad_global_config() {
    let dir = ConfigDir::new();
    std::fs::write(
        dir.path().join("config.json"),
        r#"{"default": {"imap": {"host": "10.0.0.1", "port": 143}}}"#,
    )
    .unwrap();
    assert!(Service::prepare(dir.service_config()).is_err());
}
