//! Request admission subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (method, path, raw query)
//!     → query.rs (decompose query string into names → values)
//!     → rules.rs (method, then path via matcher.rs, then blocked names)
//!     → Return: Verdict::Admit or Verdict::Reject(Rejection)
//! ```
//!
//! # Design Decisions
//! - Policy compiled at startup, immutable at runtime
//! - No I/O, no side effects: safe to call from any number of tasks
//! - Deterministic: same input always yields the same verdict
//! - First failing rule wins; every rejection maps to 403

pub mod matcher;
pub mod query;
pub mod rules;

pub use query::QueryParams;
pub use rules::{Policy, Rejection, Verdict, BLOCKED_QUERY_PARAMS};
