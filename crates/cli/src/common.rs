//! Common types shared across CLI commands

use precommit_config::RunConfig;
use precommit_core::CancelToken;
use std::path::{Path, PathBuf};

/// Shared state for command execution
#[derive(Debug, Clone)]
pub struct RuntimeContext {
    /// Settings loaded from file, before command-line overrides
    pub settings: RunConfig,
    base_dir: PathBuf,
    cancel: CancelToken,
}

impl RuntimeContext {
    /// Create a context for an absolute base directory
    #[must_use]
    pub fn new(base_dir: PathBuf, settings: RunConfig) -> Self {
        Self {
            settings,
            base_dir,
            cancel: CancelToken::new(),
        }
    }

    /// Project base directory
    #[must_use]
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Token cancelled when the user interrupts the run
    #[must_use]
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Cancel the token on Ctrl-C (and SIGTERM on Unix)
    ///
    /// A handler can only be installed once per process; later attempts are
    /// logged and ignored.
    pub fn install_interrupt_handler(&self) {
        let token = self.cancel.clone();
        if let Err(e) = ctrlc::set_handler(move || {
            tracing::warn!("Interrupt received, stopping pre-commit");
            token.cancel();
        }) {
            tracing::debug!("Failed to install interrupt handler: {}", e);
        }
    }
}
