//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! resolver / cache / sweeper / http handler
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout log lines
//!     → Prometheus scrape endpoint (--metrics-listen)
//! ```

pub mod logging;
pub mod metrics;
