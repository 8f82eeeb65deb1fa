//! Admission-filtering reverse proxy for a search backend.
//!
//! Only `GET` requests for allowed path prefixes that carry no blocked query
//! parameters reach the upstream; everything else is answered with 403
//! before any upstream I/O. Upstream failures become 502.

pub mod config;
pub mod error;
pub mod forward;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod policy;

pub use config::{ProxyConfig, ProxyOptions};
pub use error::ProxyError;
pub use forward::{Forwarder, ProxyOutcome, UpstreamTarget};
pub use http::HttpServer;
pub use lifecycle::{start, start_with_config, ProxyHandle, Shutdown, StartError};
pub use policy::{Policy, QueryParams, Verdict};
