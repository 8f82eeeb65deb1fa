//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Startup (startup.rs):
//!     Options merged over defaults → Validate → Build pipeline → Bind → Serve
//!
//! Shutdown (shutdown.rs):
//!     close() / handle dropped → Stop accepting → Drain in-flight → Exit
//! ```
//!
//! # Design Decisions
//! - Fail fast: any startup error is returned to the caller
//! - Every handle owns its own server; instances are fully isolated

pub mod shutdown;
pub mod startup;

pub use shutdown::Shutdown;
pub use startup::{start, start_with_config, ProxyHandle, StartError};
