//! # precommit-run engine
//!
//! Runs hooks of the external `pre-commit` tool on behalf of a build:
//!
//! - **Process execution**: `pre-commit run <hook> --files ...` with a time
//!   budget, merged output capture and cooperative cancellation
//! - **Session policy**: availability, configuration and file checks that
//!   decide whether to skip, fail or run

pub mod hooks;

// Re-export error types from core
pub use precommit_core::{CancelToken, Error, Result};

// Re-export commonly used types
pub use hooks::{
    HookExecutor, HookOutcome, HookReport, HookResult, HookSession, ProcessRunner,
    SessionOutcome, SkipReason,
};
