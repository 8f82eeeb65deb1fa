//! In-process start options.
//!
//! Callers of [`crate::lifecycle::start`] pass a `ProxyOptions` value that is
//! merged over [`ProxyConfig`] defaults. Field names accept both the
//! `allowedPathPrefixes` and the older `validPaths` spelling, and a path list
//! may be given as a single string.

use serde::Deserialize;

use crate::config::schema::ProxyConfig;

/// One value or a list of values.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl OneOrMany {
    pub fn into_vec(self) -> Vec<String> {
        match self {
            OneOrMany::One(value) => vec![value],
            OneOrMany::Many(values) => values,
        }
    }
}

/// Upstream override.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct UpstreamOverride {
    pub host: Option<String>,
    pub port: Option<u16>,
}

/// Options accepted by `start`, each overriding its default when present.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ProxyOptions {
    /// Replaces the admitted path prefix set.
    #[serde(alias = "validPaths")]
    pub allowed_path_prefixes: Option<OneOrMany>,

    /// Added to the fixed blocked parameter set.
    #[serde(alias = "invalidParams")]
    pub blocked_query_params: Option<OneOrMany>,

    /// Upstream target override.
    #[serde(alias = "backend")]
    pub upstream: Option<UpstreamOverride>,

    /// Interface to bind.
    pub bind_host: Option<String>,
}

impl ProxyOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the admitted path prefixes.
    pub fn valid_paths<I, S>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_path_prefixes = Some(OneOrMany::Many(
            paths.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Block additional query parameter names.
    pub fn block_params<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.blocked_query_params = Some(OneOrMany::Many(
            names.into_iter().map(Into::into).collect(),
        ));
        self
    }

    /// Point the gateway at a different upstream.
    pub fn upstream(mut self, host: impl Into<String>, port: u16) -> Self {
        self.upstream = Some(UpstreamOverride {
            host: Some(host.into()),
            port: Some(port),
        });
        self
    }

    pub fn bind_host(mut self, host: impl Into<String>) -> Self {
        self.bind_host = Some(host.into());
        self
    }

    /// Merge these options over `config`.
    pub fn apply(self, config: &mut ProxyConfig) {
        if let Some(paths) = self.allowed_path_prefixes {
            config.policy.allowed_path_prefixes = paths.into_vec();
        }
        if let Some(names) = self.blocked_query_params {
            for name in names.into_vec() {
                if !config.policy.blocked_query_params.contains(&name) {
                    config.policy.blocked_query_params.push(name);
                }
            }
        }
        if let Some(upstream) = self.upstream {
            if let Some(host) = upstream.host {
                config.upstream.host = host;
            }
            if let Some(port) = upstream.port {
                config.upstream.port = port;
            }
        }
        if let Some(host) = self.bind_host {
            config.listener.bind_host = host;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_options_keeps_defaults() {
        let mut config = ProxyConfig::default();
        ProxyOptions::new().apply(&mut config);
        assert_eq!(config, ProxyConfig::default());
    }

    #[test]
    fn single_string_valid_paths() {
        let options: ProxyOptions =
            serde_json::from_value(serde_json::json!({ "validPaths": "/come/on" })).unwrap();
        let mut config = ProxyConfig::default();
        options.apply(&mut config);
        assert_eq!(config.policy.allowed_path_prefixes, vec!["/come/on"]);
    }

    #[test]
    fn camel_case_names_and_legacy_aliases() {
        let options: ProxyOptions = serde_json::from_value(serde_json::json!({
            "allowedPathPrefixes": ["/a", "/b"],
            "invalidParams": "shards",
            "backend": { "host": "127.0.0.1", "port": 8983 }
        }))
        .unwrap();

        let mut config = ProxyConfig::default();
        options.apply(&mut config);
        assert_eq!(config.policy.allowed_path_prefixes, vec!["/a", "/b"]);
        assert_eq!(config.policy.blocked_query_params, vec!["shards"]);
        assert_eq!(config.upstream.host, "127.0.0.1");
        assert_eq!(config.upstream.port, 8983);
    }

    #[test]
    fn blocked_params_are_unioned() {
        let mut config = ProxyConfig::default();
        config.policy.blocked_query_params = vec!["shards".into()];
        ProxyOptions::new()
            .block_params(["shards", "debugQuery"])
            .apply(&mut config);
        assert_eq!(
            config.policy.blocked_query_params,
            vec!["shards", "debugQuery"]
        );
    }

    #[test]
    fn partial_upstream_override() {
        let mut config = ProxyConfig::default();
        ProxyOptions {
            upstream: Some(UpstreamOverride {
                host: None,
                port: Some(9999),
            }),
            ..Default::default()
        }
        .apply(&mut config);
        assert_eq!(config.upstream.host, "localhost");
        assert_eq!(config.upstream.port, 9999);
    }
}
