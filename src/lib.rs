//! nginx mail auth_http backend resolver library.
//!
//! Resolves the domain of a mail login to the backend (host, port) for a
//! protocol, by merging a global default, an optional named template and an
//! optional per-domain override, and caches the result with sliding expiry.

pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resolve;

pub use config::{GlobalConfig, ServiceConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use resolve::{ResolutionCache, Resolver};
