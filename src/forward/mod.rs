//! Upstream forwarding subsystem.
//!
//! # Data Flow
//! ```text
//! Admitted request
//!     → forwarder.rs (rewrite URI onto target.rs, strip headers.rs)
//!     → pooled hyper client → upstream service
//!     → Relayed(response) | GatewayError(UpstreamError → 502)
//! ```
//!
//! inflight.rs tracks calls awaiting the upstream and notices the ones
//! abandoned by a client disconnect.

pub mod forwarder;
pub mod headers;
pub mod inflight;
pub mod target;

pub use forwarder::{Forwarder, ProxyOutcome, UpstreamError};
pub use inflight::InFlightTracker;
pub use target::UpstreamTarget;
