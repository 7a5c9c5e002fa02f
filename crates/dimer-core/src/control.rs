//! Cooperative checkpoints for long running operations.
//!
//! The max-flow phases and the CFTP epoch loop call into a [`Monitor`] at safe
//! points (end of a BFS level phase, end of an epoch). A monitor may record
//! progress and may request cancellation; cancelled work leaves no partial
//! state behind because every epoch restarts from the extremal chains and the
//! matching initializer only publishes a result on success.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::errors::{ErrorInfo, TilingError};

/// Progress notifications emitted at checkpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum ProgressEvent {
    /// A Dinic BFS level phase finished.
    FlowPhase {
        /// One-based phase counter.
        phase: usize,
        /// Flow value after the phase.
        flow: usize,
        /// Flow required for a perfect matching.
        target: usize,
    },
    /// A CFTP epoch finished without coalescing.
    Epoch {
        /// One-based epoch counter.
        epoch: usize,
        /// Total number of replayed steps in this epoch.
        window: u64,
        /// Cells on which the lower and upper chains still disagree.
        gap: usize,
    },
}

/// Observer consulted at every checkpoint.
pub trait Monitor: Send + Sync {
    /// Receives a progress notification.
    fn on_progress(&self, _event: &ProgressEvent) {}

    /// Returns true when the caller wants the running operation to stop.
    fn should_cancel(&self) -> bool {
        false
    }
}

/// Monitor that ignores progress and never cancels.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopMonitor;

impl Monitor for NoopMonitor {}

/// Shareable cancellation flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    /// Creates a token in the non-cancelled state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Requests cancellation at the next checkpoint.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

impl Monitor for CancelToken {
    fn should_cancel(&self) -> bool {
        self.is_cancelled()
    }
}

/// Runs one checkpoint: reports `event` and converts a cancellation request into an error.
pub fn checkpoint(
    monitor: &dyn Monitor,
    stage: &str,
    event: ProgressEvent,
) -> Result<(), TilingError> {
    monitor.on_progress(&event);
    if monitor.should_cancel() {
        return Err(TilingError::Cancelled(
            ErrorInfo::new("cancelled", format!("{stage} cancelled at checkpoint"))
                .with_context("stage", stage),
        ));
    }
    Ok(())
}
