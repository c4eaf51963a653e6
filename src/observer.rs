//! Progress and status reporting for a running search.
//!
//! The pipeline reports through [`SearchObserver`]; front ends implement it
//! to drive a progress bar or collect messages. All methods default to
//! no-ops, so [`NoopObserver`] is an empty impl.

use tracing::{error, info, warn};

/// Receives progress and status events from the pipeline.
pub trait SearchObserver: Send + Sync {
    /// Fraction of `max_results` collected so far, in `0.0..=1.0`
    fn on_progress(&self, _fraction: f64) {}

    /// Informational status line
    fn on_status(&self, _message: &str) {}

    /// Recoverable problem (skipped item, degraded retry)
    fn on_warning(&self, _message: &str) {}

    /// Problem that stopped pagination
    fn on_error(&self, _message: &str) {}
}

/// Observer that ignores every event
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl SearchObserver for NoopObserver {}

/// Observer that forwards events to the log
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl SearchObserver for TracingObserver {
    fn on_status(&self, message: &str) {
        info!(target: "rustlitsearch::status", "{}", message);
    }

    fn on_warning(&self, message: &str) {
        warn!(target: "rustlitsearch::status", "{}", message);
    }

    fn on_error(&self, message: &str) {
        error!(target: "rustlitsearch::status", "{}", message);
    }
}
