//! Upstream target.

use axum::http::uri::{Authority, InvalidUri, PathAndQuery, Scheme};
use axum::http::Uri;
use std::fmt;

use crate::config::UpstreamConfig;

/// Host and port of the upstream service. Immutable after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpstreamTarget {
    authority: Authority,
}

impl UpstreamTarget {
    pub fn new(host: impl AsRef<str>, port: u16) -> Result<Self, InvalidUri> {
        let authority = format!("{}:{}", host.as_ref(), port).parse::<Authority>()?;
        Ok(Self { authority })
    }

    pub fn from_config(config: &UpstreamConfig) -> Result<Self, InvalidUri> {
        Self::new(&config.host, config.port)
    }

    /// Absolute URI on the upstream for the given path and query.
    pub fn uri_for(&self, path_and_query: Option<&PathAndQuery>) -> Result<Uri, axum::http::Error> {
        let path_and_query = path_and_query
            .cloned()
            .unwrap_or_else(|| PathAndQuery::from_static("/"));
        Uri::builder()
            .scheme(Scheme::HTTP)
            .authority(self.authority.clone())
            .path_and_query(path_and_query)
            .build()
    }
}

impl Default for UpstreamTarget {
    fn default() -> Self {
        Self {
            authority: Authority::from_static("localhost:8080"),
        }
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.authority)
    }
}
