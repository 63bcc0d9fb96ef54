//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the auth_http handler
//! - Wire up middleware (shared secret, tracing, timeout, request ID)
//! - Bind server to listener, drain on shutdown
//! - Translate requests into resolver lookups and back into headers

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServiceConfig;
use crate::http::middleware::{auth_key_middleware, AuthKeyState};
use crate::http::request::{redacted, split_address, AuthRequest};
use crate::http::response::{AuthResponse, Rejection};
use crate::observability::metrics;
use crate::resolve::{DomainSource, Resolver};

/// Application state injected into handlers.
pub struct AppState<S> {
    pub resolver: Arc<Resolver<S>>,
    /// Header carrying the shared secret, kept out of debug logs.
    pub secret_header: Option<String>,
}

impl<S> Clone for AppState<S> {
    fn clone(&self) -> Self {
        Self {
            resolver: Arc::clone(&self.resolver),
            secret_header: self.secret_header.clone(),
        }
    }
}

/// HTTP server answering nginx auth_http requests.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new<S: DomainSource>(config: &ServiceConfig, resolver: Arc<Resolver<S>>) -> Self {
        let state = AppState {
            resolver,
            secret_header: config.auth.key.as_ref().map(|_| config.auth.header.clone()),
        };
        let router = Self::build_router(config, state);
        Self { router }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router<S: DomainSource>(config: &ServiceConfig, state: AppState<S>) -> Router {
        let mut router = Router::new()
            .route("/{*path}", any(auth_handler::<S>))
            .route("/", any(auth_handler::<S>))
            .with_state(state);

        if let Some(key) = &config.auth.key {
            // Unreachable after validate_service.
            match config.auth.header.parse() {
                Ok(header) => {
                    let auth = AuthKeyState {
                        header,
                        key: key.clone(),
                    };
                    router = router.layer(middleware::from_fn_with_state(auth, auth_key_middleware));
                }
                Err(_) => tracing::error!(
                    header = %config.auth.header,
                    "Invalid auth header name, shared secret check disabled"
                ),
            }
        }

        router
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::with_status_code(
                StatusCode::REQUEST_TIMEOUT,
                config.timeouts.request(),
            ))
            .layer(middleware::map_response(timeout_to_auth_status))
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The fully layered router, for driving requests in-process.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until `shutdown` fires, then drain in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server draining");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

/// nginx only reads headers, so a timed-out request still gets an
/// `Auth-Status` reply.
async fn timeout_to_auth_status(response: Response) -> Response {
    if response.status() != StatusCode::REQUEST_TIMEOUT {
        return response;
    }
    tracing::warn!("Auth request timed out");
    AuthResponse::from(Rejection::Timeout).into_response()
}

/// auth_http handler.
/// Validates the login, resolves its domain and answers with headers.
async fn auth_handler<S: DomainSource>(
    State(state): State<AppState<S>>,
    headers: HeaderMap,
) -> Response {
    let start_time = Instant::now();
    let request = AuthRequest::from_headers(&headers);

    tracing::debug!(
        headers = ?redacted(&headers, state.secret_header.as_deref()),
        "Received request"
    );

    let response = authorize(&state, &request).await;

    if let AuthResponse::Rejected(rejection) = &response {
        tracing::warn!(
            user = %request.user,
            protocol = %request.protocol,
            reason = %rejection.detail(),
            "Auth request rejected"
        );
    }
    metrics::record_request(request.protocol, response.outcome(), start_time);

    tracing::debug!(headers = ?response.headers(), "Sending response");
    response.into_response()
}

async fn authorize<S: DomainSource>(state: &AppState<S>, request: &AuthRequest<'_>) -> AuthResponse {
    if !request.has_credentials() {
        return Rejection::MissingCredentials.into();
    }

    let Some((_, domain)) = split_address(request.user) else {
        return Rejection::InvalidAddress.into();
    };
    let domain = domain.to_ascii_lowercase();

    match state.resolver.resolve(&domain, request.protocol).await {
        Ok(resolution) => AuthResponse::Accepted {
            resolution,
            cram_md5: request.is_cram_md5(),
        },
        Err(e) => Rejection::Resolve(e).into(),
    }
}
