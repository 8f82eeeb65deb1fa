//! Admission rules.
//!
//! Rules are evaluated in a fixed order and the first failing rule decides:
//! method, then path, then query parameter names. Every rejection is a 403.
//! A path must be canonical before it is compared against the prefixes.

use axum::http::{Method, StatusCode};
use std::collections::HashSet;
use thiserror::Error;

use crate::config::PolicyConfig;
use crate::policy::matcher::{is_canonical, AnyMatcher, Matcher};
use crate::policy::query::QueryParams;

/// Query parameters that are always blocked.
pub const BLOCKED_QUERY_PARAMS: [&str; 2] = ["qt", "stream.url"];

/// Why a request was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),

    #[error("path {0:?} is not allowed")]
    PathNotAllowed(String),

    #[error("query parameter {0:?} is blocked")]
    BlockedParameter(String),
}

impl Rejection {
    /// Status written to the client. Uniform across causes.
    pub fn status(&self) -> StatusCode {
        StatusCode::FORBIDDEN
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            Rejection::MethodNotAllowed(_) => "method",
            Rejection::PathNotAllowed(_) => "path",
            Rejection::BlockedParameter(_) => "query",
        }
    }
}

/// Admission decision for a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Admit,
    Reject(Rejection),
}

/// The immutable admission policy.
#[derive(Debug)]
pub struct Policy {
    allowed_methods: Vec<Method>,
    allowed_paths: AnyMatcher,
    blocked_params: HashSet<String>,
}

impl Policy {
    /// Build a policy from allowed path prefixes and any extra blocked names.
    pub fn new<P, B>(allowed_path_prefixes: P, extra_blocked_params: B) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        B: IntoIterator,
        B::Item: Into<String>,
    {
        let mut blocked_params: HashSet<String> =
            BLOCKED_QUERY_PARAMS.iter().map(|p| p.to_string()).collect();
        blocked_params.extend(extra_blocked_params.into_iter().map(Into::into));

        Self {
            allowed_methods: vec![Method::GET],
            allowed_paths: AnyMatcher::prefixes(allowed_path_prefixes),
            blocked_params,
        }
    }

    pub fn from_config(config: &PolicyConfig) -> Self {
        Self::new(
            config.allowed_path_prefixes.iter().cloned(),
            config.blocked_query_params.iter().cloned(),
        )
    }

    /// Decide whether a request may be forwarded.
    ///
    /// Pure: looks only at the method, the path (no query component), the
    /// parsed query parameter names and this policy. Values are never read.
    pub fn validate(&self, method: &Method, path: &str, query: &QueryParams) -> Verdict {
        if !self.allowed_methods.contains(method) {
            return Verdict::Reject(Rejection::MethodNotAllowed(method.clone()));
        }

        if !is_canonical(path) || !self.allowed_paths.matches(path) {
            return Verdict::Reject(Rejection::PathNotAllowed(path.to_string()));
        }

        if let Some(name) = self.blocked_params.iter().find(|name| query.contains(name)) {
            return Verdict::Reject(Rejection::BlockedParameter(name.clone()));
        }

        Verdict::Admit
    }
}

impl Default for Policy {
    fn default() -> Self {
        Self::from_config(&PolicyConfig::default())
    }
}
