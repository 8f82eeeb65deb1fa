//! Path prefix matching.
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - A prefix matches on a segment boundary: `/solr/select` admits
//!   `/solr/select` and `/solr/select/x`, not `/solr/selectall`
//! - A prefix ending in `/` matches anything beneath it
//! - Paths with dot segments (`.`, `..`, `%2e` in any case) or encoded
//!   separators (`%2f`, `%5c`) are never canonical and never match: the
//!   upstream may resolve them to a path outside every prefix
//! - No regex

use url::Url;

/// Base used to run a request path through URL normalization.
const NORMALIZE_BASE: &str = "http://upstream.invalid";

/// Returns true if the upstream would see `path` exactly as written.
///
/// A path is canonical when URL normalization leaves it unchanged (no dot
/// segments, raw or percent-encoded, and no backslashes) and it carries no
/// percent-encoded `/` or `\`.
pub fn is_canonical(path: &str) -> bool {
    if !path.starts_with('/') {
        return false;
    }

    let lowered = path.to_ascii_lowercase();
    if lowered.contains("%2f") || lowered.contains("%5c") {
        return false;
    }

    match Url::parse(&format!("{NORMALIZE_BASE}{path}")) {
        Ok(url) => url.path() == path,
        Err(_) => false,
    }
}

/// Trait for matching request paths against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the path matches this condition.
    fn matches(&self, path: &str) -> bool;
}

/// Matches the request path prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathPrefixMatcher {
    prefix: String,
}

impl PathPrefixMatcher {
    /// Create a new path prefix matcher.
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PathPrefixMatcher {
    fn matches(&self, path: &str) -> bool {
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || self.prefix.ends_with('/'),
            None => false,
        }
    }
}

/// Matches when any of the inner matchers does (OR semantics).
#[derive(Debug, Default)]
pub struct AnyMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AnyMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }

    /// Build from a list of path prefixes.
    pub fn prefixes<I, S>(prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(
            prefixes
                .into_iter()
                .map(|p| Box::new(PathPrefixMatcher::new(p)) as Box<dyn Matcher>)
                .collect(),
        )
    }
}

impl Matcher for AnyMatcher {
    fn matches(&self, path: &str) -> bool {
        self.matchers.iter().any(|m| m.matches(path))
    }
}
