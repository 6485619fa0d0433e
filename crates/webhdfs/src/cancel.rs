//! Cancellation tokens for long-running scans.
//!
//! A scan checks its token before expanding each directory, so a cancelled
//! scan stops after at most one in-flight listing.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag that stops a scan when set. Clones observe the same flag.
#[derive(Clone, Debug, Default)]
pub struct CancellationToken {
    cancelled: Arc<AtomicBool>,
}

impl CancellationToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a token that nobody else holds, so it is never cancelled.
    pub fn noop() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    /// Returns `Some(())` while active and `None` once cancelled,
    /// so callers can bail out with `?`.
    #[inline]
    pub fn is_cancelled(&self) -> Option<()> {
        if self.cancelled.load(Ordering::Relaxed) {
            None
        } else {
            Some(())
        }
    }
}
