//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, ports valid)
//! - Check that the upstream forms a usable authority
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ProxyConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use axum::http::uri::Authority;
use thiserror::Error;

use crate::config::schema::ProxyConfig;

/// A single semantic problem with a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("policy.allowed_path_prefixes must not be empty")]
    NoAllowedPaths,

    #[error("path prefix {0:?} must start with '/'")]
    RelativePathPrefix(String),

    #[error("blocked query parameter names must not be empty")]
    EmptyBlockedParam,

    #[error("upstream.host must not be empty")]
    EmptyUpstreamHost,

    #[error("upstream.port must not be 0")]
    ZeroUpstreamPort,

    #[error("upstream {0:?} is not a valid authority")]
    InvalidUpstream(String),

    #[error("timeouts.{0} must be greater than 0")]
    ZeroTimeout(&'static str),
}

/// Check a configuration, collecting every problem found.
pub fn validate_config(config: &ProxyConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.policy.allowed_path_prefixes.is_empty() {
        errors.push(ValidationError::NoAllowedPaths);
    }
    for prefix in &config.policy.allowed_path_prefixes {
        if !prefix.starts_with('/') {
            errors.push(ValidationError::RelativePathPrefix(prefix.clone()));
        }
    }
    if config.policy.blocked_query_params.iter().any(|p| p.is_empty()) {
        errors.push(ValidationError::EmptyBlockedParam);
    }

    let upstream = &config.upstream;
    if upstream.host.is_empty() {
        errors.push(ValidationError::EmptyUpstreamHost);
    } else {
        let authority = format!("{}:{}", upstream.host, upstream.port);
        if authority.parse::<Authority>().is_err() {
            errors.push(ValidationError::InvalidUpstream(authority));
        }
    }
    if upstream.port == 0 {
        errors.push(ValidationError::ZeroUpstreamPort);
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("connect_secs"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("request_secs"));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
