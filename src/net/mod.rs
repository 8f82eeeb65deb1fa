//! Network layer subsystem.
//!
//! # Data Flow
//! ```text
//! ListenerConfig (host, port)
//!     → listener.rs (bind, log bound address)
//!     → Hand off to HTTP layer (axum::serve)
//! ```
//!
//! # Design Decisions
//! - Port 0 binds an ephemeral port; the bound address is reported back
//! - Each server instance owns its own socket, no process-wide state

pub mod listener;

pub use listener::{bind, ListenerError};
