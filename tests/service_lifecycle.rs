//! End-to-end tests over a real socket.

use std::sync::Arc;
use std::time::Duration;

use mail_auth_http::lifecycle::{Service, Shutdown};
use tokio::net::TcpListener;

mod common;

use common::ConfigDir;

#[tokio::test]
async fn test_serves_over_tcp_and_shuts_down() {
    let dir = ConfigDir::new();
    dir.write_domain("example.com", r#"{"template": "biz"}"#);
    let service = Service::prepare(dir.service_config()).unwrap();
    let cache = service.cache().clone();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let shutdown = Arc::new(Shutdown::new());
    let server_shutdown = Arc::clone(&shutdown);
    let handle = tokio::spawn(async move { service.serve(listener, &server_shutdown).await });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    let mut statuses = Vec::new();
    for _ in 0..2 {
        let res = client
            .get(format!("http://{addr}/"))
            .header("Auth-Method", "plain")
            .header("Auth-User", "user@example.com")
            .header("Auth-Pass", "pw")
            .header("Auth-Protocol", "pop3")
            .send()
            .await
            .expect("server unreachable");
        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["Auth-Status"], "OK");
        assert_eq!(res.headers()["Auth-Server"], "10.0.0.5");
        assert_eq!(res.headers()["Auth-Port"], "110");
        statuses.push(res.headers()["X-Cache"].to_str().unwrap().to_string());
    }
    assert_eq!(statuses, ["MISS", "HIT"]);
    assert_eq!(cache.len(), 1);

    // The requests above prove the server is up and subscribed.
    shutdown.trigger();
    let result = tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("service did not stop")
        .unwrap();
    assert!(result.is_ok());
}
