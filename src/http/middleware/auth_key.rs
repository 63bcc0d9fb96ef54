//! Shared-secret check.
//! Rejects requests that do not carry the configured key, before any lookup.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{HeaderName, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};

use crate::http::request::AUTH_PROTOCOL;
use crate::http::response::{AuthResponse, Rejection};
use crate::observability::metrics;

/// State required for the shared-secret check.
#[derive(Clone, Debug)]
pub struct AuthKeyState {
    pub header: HeaderName,
    pub key: String,
}

pub async fn auth_key_middleware(
    State(state): State<AuthKeyState>,
    req: Request<Body>,
    next: Next,
) -> Response {
    let presented = req
        .headers()
        .get(&state.header)
        .map(|v| v.as_bytes())
        .unwrap_or_default();

    if presented == state.key.as_bytes() {
        return next.run(req).await;
    }

    tracing::warn!(header = %state.header, "Invalid auth key");
    let protocol = req
        .headers()
        .get(AUTH_PROTOCOL)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    metrics::record_request(protocol, Rejection::InvalidKey.outcome(), Instant::now());
    AuthResponse::from(Rejection::InvalidKey).into_response()
}
