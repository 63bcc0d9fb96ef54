//! Configuration schema definitions.
//!
//! Two documents configure the service:
//! - [`ServiceConfig`]: runtime settings, built from command-line flags
//! - [`GlobalConfig`]: backend targets, decoded from the JSON config file
//!
//! Per-domain overrides are [`TargetSet`] records loaded on demand by the
//! resolver, not part of either document.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::resolve::TargetSet;

/// Root runtime configuration for the auth service.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ServiceConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Resolution cache lifetimes.
    pub cache: CacheConfig,

    /// Shared-secret check on incoming requests.
    pub auth: AuthConfig,

    /// Where the JSON configuration lives.
    pub paths: PathsConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8278").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8278".to_string(),
        }
    }
}

/// Resolution cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a resolved domain stays cached after its last use, in milliseconds.
    pub ttl_ms: u64,

    /// Interval between sweeps of expired entries, in milliseconds.
    pub cleanup_interval_ms: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_millis(self.ttl_ms)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_millis(self.cleanup_interval_ms)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_ms: 24 * 60 * 60 * 1000,
            cleanup_interval_ms: 60 * 1000,
        }
    }
}

/// Shared-secret authentication of the proxy front-end.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Expected secret; `None` disables the check.
    pub key: Option<String>,

    /// Request header carrying the secret.
    pub header: String,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            key: None,
            header: "Auth-Key".to_string(),
        }
    }
}

/// Locations of the JSON configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PathsConfig {
    /// Directory holding the global config file and `conf.d/`.
    pub config_path: PathBuf,

    /// Global config file name, relative to `config_path`.
    pub config_file: PathBuf,
}

impl PathsConfig {
    /// Full path of the global config file.
    pub fn global_config(&self) -> PathBuf {
        self.config_path.join(&self.config_file)
    }

    /// Directory of per-domain override records.
    pub fn domain_dir(&self) -> PathBuf {
        self.config_path.join("conf.d")
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            config_path: PathBuf::from("/etc/nginx-mail-auth-http"),
            config_file: PathBuf::from("config.json"),
        }
    }
}

/// Timeout configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Deadline for a whole auth request, in milliseconds.
    pub request_ms: u64,
}

impl TimeoutConfig {
    pub fn request(&self) -> Duration {
        Duration::from_millis(self.request_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_ms: 30_000 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log at debug level, including full request and response headers.
    pub debug: bool,

    /// Prometheus endpoint bind address; `None` disables metrics export.
    pub metrics_address: Option<String>,
}

/// Backend targets: a complete default plus named partial templates.
///
/// ```json
/// {
///   "default": {
///     "imap": {"host": "10.0.0.1", "port": 143},
///     "pop3": {"host": "10.0.0.1", "port": 110},
///     "smtp": {"host": "10.0.0.1", "port": 25}
///   },
///   "templates": {
///     "biz": {"pop3": {"host": "10.0.0.5", "port": 110}}
///   }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct GlobalConfig {
    /// Fallback targets; must cover every protocol.
    pub default: TargetSet,

    /// Partial overrides a domain record can name.
    #[serde(default)]
    pub templates: HashMap<String, TargetSet>,
}
