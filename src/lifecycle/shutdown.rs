//! Shutdown coordination for a gateway instance.
//!
//! # Design Decisions
//! - One coordinator per gateway; the serve task holds the only receiver
//! - Dropping the coordinator is a shutdown too: a closed channel resolves
//!   every pending `recv()` with an error, which the serve task treats the
//!   same as a trigger. A dropped `ProxyHandle` therefore never leaves a
//!   server running

use tokio::sync::broadcast;

/// Coordinator for graceful shutdown.
#[derive(Debug)]
pub struct Shutdown {
    tx: broadcast::Sender<()>,
}

impl Shutdown {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(1);
        Self { tx }
    }

    /// Subscribe to the shutdown signal.
    ///
    /// The receiver resolves on [`Shutdown::trigger`] (`Ok`) or when the
    /// coordinator is dropped (`Err(RecvError::Closed)`).
    pub fn subscribe(&self) -> broadcast::Receiver<()> {
        self.tx.subscribe()
    }

    /// Signal every subscriber. A no-op when nobody is listening.
    pub fn trigger(&self) {
        let _ = self.tx.send(());
    }
}

impl Default for Shutdown {
    fn default() -> Self {
        Self::new()
    }
}
