//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)              start options (in-process)
//!     → loader.rs (parse)             → options.rs (merge over config)
//!     → validation.rs (semantic checks)
//!     → ProxyConfig (validated, immutable)
//!     → Policy + UpstreamTarget built once at server start
//! ```
//!
//! # Design Decisions
//! - Config is immutable once the server starts
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod options;
pub mod schema;
pub mod validation;

pub use loader::{load_config, parse_config, ConfigError};
pub use options::ProxyOptions;
pub use schema::{
    ListenerConfig, LogFormat, ObservabilityConfig, PolicyConfig, ProxyConfig, TimeoutConfig,
    UpstreamConfig,
};
pub use validation::{validate_config, ValidationError};
