//! nginx mail auth_http backend resolver.
//!
//! # Architecture Overview
//!
//! ```text
//!   nginx auth_http        +-------------------------------------------------+
//!   request headers  ----->|  http server --> resolver --> cache (sliding)   |
//!                          |       |             | miss          ^           |
//!   Auth-Status /          |       |             v               |           |
//!   Auth-Server /    <-----|-------+        conf.d + merge    sweeper        |
//!   Auth-Port              |                                                 |
//!                          |  config . lifecycle . observability             |
//!                          +-------------------------------------------------+
//! ```

use clap::Parser;

use mail_auth_http::config::Args;
use mail_auth_http::lifecycle::startup;
use mail_auth_http::observability::logging;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Args::parse().into_config();

    logging::init_logging(config.observability.debug);

    tracing::info!("mail-auth-http v{} starting", env!("CARGO_PKG_VERSION"));

    if let Err(e) = startup::run(config).await {
        tracing::error!(error = %e, "Startup failed");
        return Err(e.into());
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
