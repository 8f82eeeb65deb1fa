//! In-flight upstream call tracking.
//!
//! # Responsibilities
//! - Count upstream calls currently awaiting a response
//! - Detect calls abandoned because the client went away
//!
//! A guard that is dropped without [`InFlightGuard::finish`] means the
//! handling task was cancelled mid-call (the client disconnected). The
//! upstream request is dropped with it and nothing is surfaced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use crate::observability::metrics;

/// Tracks upstream calls in flight.
#[derive(Debug, Clone, Default)]
pub struct InFlightTracker {
    active_count: Arc<AtomicU64>,
}

impl InFlightTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new upstream call. Returns a guard that decrements on drop.
    pub fn track(&self) -> InFlightGuard {
        self.active_count.fetch_add(1, Ordering::SeqCst);
        metrics::upstream_started();
        InFlightGuard {
            active_count: Arc::clone(&self.active_count),
            started: Instant::now(),
            finished: false,
        }
    }

    /// Current number of upstream calls awaiting a response.
    pub fn active_count(&self) -> u64 {
        self.active_count.load(Ordering::SeqCst)
    }
}

/// Guard for one upstream call.
#[derive(Debug)]
pub struct InFlightGuard {
    active_count: Arc<AtomicU64>,
    started: Instant,
    finished: bool,
}

impl InFlightGuard {
    /// Mark the upstream call as completed, successfully or not.
    pub fn finish(mut self) {
        self.finished = true;
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.active_count.fetch_sub(1, Ordering::SeqCst);
        metrics::upstream_finished();
        if !self.finished {
            tracing::debug!(
                elapsed_ms = self.started.elapsed().as_millis() as u64,
                "Client disconnected, upstream call abandoned"
            );
        }
    }
}
