//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! command-line flags
//!     → args.rs (clap parse, duration.rs for lifetimes)
//!     → ServiceConfig → validation.rs
//!
//! <config-path>/<config-file> (JSON)
//!     → loader.rs (read & deserialize)
//!     → validation.rs (default covers every protocol)
//!     → GlobalConfig (immutable, shared via Arc)
//! ```
//!
//! # Design Decisions
//! - Both documents are immutable once loaded; there is no hot reload
//! - All runtime settings have defaults matching the flag defaults
//! - Validation separates syntactic (serde) from semantic checks

pub mod args;
pub mod duration;
pub mod loader;
pub mod schema;
pub mod validation;

pub use args::Args;
pub use loader::{load_global_config, ConfigError};
pub use schema::{
    AuthConfig, CacheConfig, GlobalConfig, ListenerConfig, ObservabilityConfig, PathsConfig,
    ServiceConfig, TimeoutConfig,
};
