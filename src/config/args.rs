//! Command-line flags.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;

use crate::config::duration::parse_duration;
use crate::config::schema::{
    AuthConfig, CacheConfig, ListenerConfig, ObservabilityConfig, PathsConfig, ServiceConfig,
    TimeoutConfig,
};

#[derive(Debug, Parser)]
#[command(name = "mail-auth-http")]
#[command(version, about = "nginx mail auth_http backend resolver", long_about = None)]
pub struct Args {
    /// Address to handle requests on incoming connections
    #[arg(long, default_value = ":8278")]
    pub listen: String,

    /// Time to keep proxy configs in cache since last usage (e.g. 24h, 90m)
    #[arg(long, default_value = "24h", value_parser = parse_duration)]
    pub cache_ttl: Duration,

    /// Interval between cache cleanups
    #[arg(long, default_value = "1m", value_parser = parse_duration)]
    pub cache_cleanup: Duration,

    /// Name of config file
    #[arg(long, default_value = "config.json")]
    pub config_file: PathBuf,

    /// Path where the config file (and conf.d) can be found
    #[arg(long, default_value = "/etc/nginx-mail-auth-http")]
    pub config_path: PathBuf,

    /// Shared secret expected from nginx; empty disables the check
    #[arg(long, default_value = "")]
    pub auth_key: String,

    /// Request header carrying the shared secret
    #[arg(long, default_value = "Auth-Key")]
    pub auth_header: String,

    /// Deadline for a single auth request
    #[arg(long, default_value = "30s", value_parser = parse_duration)]
    pub request_timeout: Duration,

    /// Serve Prometheus metrics on this address
    #[arg(long)]
    pub metrics_listen: Option<String>,

    /// Print debug logging
    #[arg(long)]
    pub debug: bool,
}

impl Args {
    pub fn into_config(self) -> ServiceConfig {
        ServiceConfig {
            listener: ListenerConfig {
                bind_address: normalize_listen(&self.listen),
            },
            cache: CacheConfig {
                ttl_ms: millis(self.cache_ttl),
                cleanup_interval_ms: millis(self.cache_cleanup),
            },
            auth: AuthConfig {
                key: Some(self.auth_key).filter(|k| !k.is_empty()),
                header: self.auth_header,
            },
            paths: PathsConfig {
                config_path: self.config_path,
                config_file: self.config_file,
            },
            timeouts: TimeoutConfig {
                request_ms: millis(self.request_timeout),
            },
            observability: ObservabilityConfig {
                debug: self.debug,
                metrics_address: self.metrics_listen.as_deref().map(normalize_listen),
            },
        }
    }
}

/// `:8278` means every interface, as it does for most listeners.
fn normalize_listen(addr: &str) -> String {
    if addr.starts_with(':') {
        format!("0.0.0.0{addr}")
    } else {
        addr.to_string()
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
