//! search-gate: admission-filtering reverse proxy.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────┐
//!                     │                  SEARCH GATE                  │
//!   Client Request    │  ┌────────┐   ┌──────────┐   ┌────────────┐   │
//!   ──────────────────┼─▶│  net   │──▶│   http   │──▶│   policy   │───┼──▶ 403
//!                     │  │listener│   │  server  │   │ validator  │   │
//!                     │  └────────┘   └──────────┘   └─────┬──────┘   │
//!                     │                                    │ admit    │
//!                     │                                    ▼          │
//!   Client Response   │                              ┌────────────┐   │
//!   ◀─────────────────┼──────────────────────────────│  forward   │◀──┼──── Upstream
//!                     │        relayed or 502        │ forwarder  │   │
//!                     │                              └────────────┘   │
//!                     └───────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use search_gate::config::{load_config, ProxyConfig, ProxyOptions};
use search_gate::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "search-gate")]
#[command(about = "Admission-filtering reverse proxy for a search backend", long_about = None)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Port to listen on [default: 8008]
    #[arg(short, long)]
    port: Option<u16>,

    /// Upstream service as HOST:PORT [default: localhost:8080]
    #[arg(short, long, value_name = "HOST:PORT", value_parser = parse_upstream)]
    upstream: Option<(String, u16)>,

    /// Allowed path prefix; repeat for several. Replaces the default set
    #[arg(long = "valid-path", value_name = "PREFIX")]
    valid_paths: Vec<String>,

    /// Extra query parameter name to block; repeat for several
    #[arg(long = "block-param", value_name = "NAME")]
    block_params: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,
}

impl Cli {
    fn apply(self, config: &mut ProxyConfig) {
        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }

        let mut options = ProxyOptions::new();
        if let Some((host, port)) = self.upstream {
            options = options.upstream(host, port);
        }
        if !self.valid_paths.is_empty() {
            options = options.valid_paths(self.valid_paths);
        }
        if !self.block_params.is_empty() {
            options = options.block_params(self.block_params);
        }
        options.apply(config);
    }
}

fn parse_upstream(value: &str) -> Result<(String, u16), String> {
    let (host, port) = value
        .rsplit_once(':')
        .ok_or_else(|| format!("expected HOST:PORT, got {value:?}"))?;
    if host.is_empty() {
        return Err(format!("missing host in {value:?}"));
    }
    let port = port
        .parse::<u16>()
        .map_err(|e| format!("invalid port in {value:?}: {e}"))?;
    Ok((host.to_string(), port))
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    cli.apply(&mut config);

    logging::init_logging(&config.observability)?;

    tracing::info!("search-gate v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address(),
        upstream = %format!("{}:{}", config.upstream.host, config.upstream.port),
        allowed_paths = ?config.policy.allowed_path_prefixes,
        extra_blocked_params = ?config.policy.blocked_query_params,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics endpoint");
                }
            }
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let handle = search_gate::start_with_config(config).await?;
    tracing::info!(address = %handle.local_addr(), "Listening for connections");

    tokio::signal::ctrl_c().await?;
    tracing::info!("Ctrl+C received, shutting down");

    handle.close().await?;
    tracing::info!("Shutdown complete");
    Ok(())
}
