//! Structured logging.
//!
//! `RUST_LOG` always wins; otherwise the `--debug` flag picks between info
//! and debug for this crate. Debug level also logs the full auth_http
//! request and response headers.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global tracing subscriber.
pub fn init_logging(debug: bool) {
    let default_directives = if debug {
        "mail_auth_http=debug,tower_http=debug"
    } else {
        "mail_auth_http=info,tower_http=info"
    };

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default_directives.into()))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
