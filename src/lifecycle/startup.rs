//! Startup orchestration.
//!
//! # Responsibilities
//! - Validate settings and load the global target configuration
//! - Build the resolution cache, resolver and sweeper in dependency order
//! - Bind the listener last, so traffic arrives only when ready
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The cache is constructed here and handed to resolver and sweeper

use std::sync::Arc;

use tokio::net::TcpListener;

use crate::config::validation::{describe, validate_service, ValidationError};
use crate::config::{load_global_config, ConfigError, GlobalConfig, ServiceConfig};
use crate::http::HttpServer;
use crate::lifecycle::signals::shutdown_signal;
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::resolve::{FsDomainSource, ResolutionCache, Resolver, Sweeper};

#[derive(Debug, thiserror::Error)]
pub enum StartupError {
    #[error("invalid settings: {}", describe(.0))]
    Settings(Vec<ValidationError>),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Everything needed to serve requests, built but not yet listening.
pub struct Service {
    config: ServiceConfig,
    cache: Arc<ResolutionCache>,
    resolver: Arc<Resolver<FsDomainSource>>,
}

impl Service {
    /// Validate `config`, load the global targets and wire the resolver.
    pub fn prepare(config: ServiceConfig) -> Result<Self, StartupError> {
        validate_service(&config).map_err(StartupError::Settings)?;

        let global_path = config.paths.global_config();
        let global: Arc<GlobalConfig> = Arc::new(load_global_config(&global_path)?);
        tracing::info!(
            path = %global_path.display(),
            templates = global.templates.len(),
            "Global config loaded"
        );

        let cache = Arc::new(ResolutionCache::new(config.cache.ttl()));
        let source = FsDomainSource::new(config.paths.domain_dir());
        let resolver = Arc::new(Resolver::new(global, Arc::clone(&cache), source));

        Ok(Self {
            config,
            cache,
            resolver,
        })
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn cache(&self) -> &Arc<ResolutionCache> {
        &self.cache
    }

    pub fn http_server(&self) -> HttpServer {
        HttpServer::new(&self.config, Arc::clone(&self.resolver))
    }

    /// Serve on `listener` until `shutdown` fires.
    ///
    /// The sweeper runs alongside the server and is awaited before returning.
    pub async fn serve(self, listener: TcpListener, shutdown: &Shutdown) -> Result<(), StartupError> {
        let sweeper = Sweeper::new(Arc::clone(&self.cache), self.config.cache.cleanup_interval());
        let sweeper = tokio::spawn(sweeper.run(shutdown.subscribe()));

        let server = self.http_server();
        let result = server.run(listener, shutdown.subscribe()).await;

        // A server error must not leave the sweeper running.
        shutdown.trigger();
        match sweeper.await {
            Ok(evicted) => tracing::debug!(evicted, "Cache sweeper stopped"),
            Err(e) => tracing::error!(error = %e, "Cache sweeper task failed"),
        }

        result.map_err(StartupError::Serve)
    }
}

/// Start the service and run until a shutdown signal arrives.
pub async fn run(config: ServiceConfig) -> Result<(), StartupError> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        cache_ttl = ?config.cache.ttl(),
        cache_cleanup = ?config.cache.cleanup_interval(),
        config_path = %config.paths.config_path.display(),
        auth_key = config.auth.key.is_some(),
        "Configuration loaded"
    );

    let service = Service::prepare(config)?;

    if let Some(addr) = &service.config().observability.metrics_address {
        match addr.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(metrics_address = %addr, "Failed to parse metrics address"),
        }
    }

    let address = service.config().listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let shutdown = Shutdown::new();
    let serve = service.serve(listener, &shutdown);
    tokio::pin!(serve);

    tokio::select! {
        result = &mut serve => return result,
        _ = shutdown_signal() => shutdown.trigger(),
    }
    serve.await
}
