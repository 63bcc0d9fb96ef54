//! Metrics collection and exposition.
//!
//! # Metrics
//! - `mail_auth_requests_total` (counter): auth requests by protocol, outcome
//! - `mail_auth_request_duration_seconds` (histogram): handler latency
//! - `mail_auth_cache_lookups_total` (counter): cache hits and misses
//! - `mail_auth_cache_evictions_total` (counter): entries removed by the sweeper
//! - `mail_auth_cache_entries` (gauge): entries currently held
//! - `mail_auth_template_missing_total` (counter): overrides naming an unknown template
//!
//! Without an installed recorder every call is a no-op, which is what tests
//! and library users get by default.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

use crate::resolve::Protocol;

/// Install the Prometheus recorder and its scrape endpoint.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(address = %addr, error = %e, "Failed to install metrics exporter"),
    }
}

/// Record a completed auth request.
///
/// Protocol names outside the supported set share one `other` label.
pub fn record_request(protocol: &str, outcome: &'static str, start: Instant) {
    let protocol = protocol
        .parse::<Protocol>()
        .map(|p| p.as_str())
        .unwrap_or("other");
    ::metrics::counter!(
        "mail_auth_requests_total",
        "protocol" => protocol,
        "outcome" => outcome
    )
    .increment(1);
    ::metrics::histogram!("mail_auth_request_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}

pub fn record_cache_lookup(hit: bool) {
    let result = if hit { "hit" } else { "miss" };
    ::metrics::counter!("mail_auth_cache_lookups_total", "result" => result).increment(1);
}

pub fn record_cache_size(size: usize) {
    ::metrics::gauge!("mail_auth_cache_entries").set(size as f64);
}

pub fn record_evictions(count: usize) {
    ::metrics::counter!("mail_auth_cache_evictions_total").increment(count as u64);
}

pub fn record_template_missing() {
    ::metrics::counter!("mail_auth_template_missing_total").increment(1);
}
