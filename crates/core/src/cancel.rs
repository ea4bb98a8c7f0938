//! Cooperative cancellation
//!
//! A [`CancelToken`] is a cheaply clonable handle to one shared flag. The CLI
//! flips it from its Ctrl-C handler; the process runner polls it while waiting
//! for a child. Nothing in the runner ever clears it, so a caller that observes
//! an interrupted result can still see that cancellation was requested.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

/// Shared cancellation flag
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    cancelled: Arc<AtomicBool>,
}

impl CancelToken {
    /// Create a token that is not cancelled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation for every clone of this token
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    /// Check whether cancellation has been requested
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}
