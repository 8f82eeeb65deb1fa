//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Pipeline and forwarder produce:
//!     → logging.rs (structured log events, per-request spans)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (pretty or JSON)
//!     → Metrics endpoint (Prometheus scrape, optional)
//! ```
//!
//! # Design Decisions
//! - Request ID is a field on every request span
//! - Metrics are cheap; with no recorder installed they are no-ops

pub mod logging;
pub mod metrics;
