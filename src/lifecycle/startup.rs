//! Startup orchestration.
//!
//! # Responsibilities
//! - Merge caller options over defaults
//! - Build the validator and forwarder pipeline
//! - Bind the listener and spawn the serve task
//! - Hand back a handle that can close the server

use std::net::SocketAddr;
use thiserror::Error;
use tokio::task::JoinHandle;

use crate::config::{ConfigError, ProxyConfig, ProxyOptions};
use crate::forward::InFlightTracker;
use crate::http::HttpServer;
use crate::lifecycle::Shutdown;
use crate::net::{self, ListenerError};

/// Error starting or stopping a gateway instance.
#[derive(Debug, Error)]
pub enum StartError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Listen(#[from] ListenerError),

    #[error("server error: {0}")]
    Serve(#[from] std::io::Error),

    #[error("server task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

/// A running gateway.
///
/// Dropping the handle shuts the server down as well; [`ProxyHandle::close`]
/// additionally waits for it to finish.
#[derive(Debug)]
pub struct ProxyHandle {
    local_addr: SocketAddr,
    shutdown: Shutdown,
    in_flight: InFlightTracker,
    task: JoinHandle<Result<(), std::io::Error>>,
}

impl ProxyHandle {
    /// Address the listener is bound to.
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Upstream calls currently awaiting a response.
    pub fn in_flight(&self) -> u64 {
        self.in_flight.active_count()
    }

    /// Stop accepting connections and wait for in-flight requests to drain.
    pub async fn close(self) -> Result<(), StartError> {
        self.shutdown.trigger();
        self.task.await??;
        tracing::info!(address = %self.local_addr, "Gateway closed");
        Ok(())
    }
}

/// Start a gateway on `port` (default 8008) with `options` merged over the
/// default configuration.
pub async fn start(
    port: Option<u16>,
    options: Option<ProxyOptions>,
) -> Result<ProxyHandle, StartError> {
    let mut config = ProxyConfig::default();
    if let Some(port) = port {
        config.listener.port = port;
    }
    if let Some(options) = options {
        options.apply(&mut config);
    }
    start_with_config(config).await
}

/// Start a gateway from a complete configuration.
pub async fn start_with_config(config: ProxyConfig) -> Result<ProxyHandle, StartError> {
    let server = HttpServer::new(config)?;
    let listener = net::bind(&server.config().listener).await?;
    let local_addr = listener.local_addr()?;
    let in_flight = server.in_flight().clone();

    let shutdown = Shutdown::new();
    let signal = shutdown.subscribe();
    let task = tokio::spawn(server.run(listener, signal));

    Ok(ProxyHandle {
        local_addr,
        shutdown,
        in_flight,
        task,
    })
}
