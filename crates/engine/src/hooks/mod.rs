//! Pre-commit hook execution
//!
//! ## Module Organization
//!
//! - `result`: Exit code and output of one invocation
//! - `runner`: Child process execution with timeout and cancellation
//! - `files`: Resolution of literal and glob file entries
//! - `session`: Skip/fail policy and sequential execution of configured hooks

pub mod files;
pub mod result;
pub mod runner;
pub mod session;

// Re-export main types for convenience
pub use files::ResolvedFiles;
pub use result::{HookOutcome, HookResult, LOCAL_FAILURE_EXIT_CODE};
pub use runner::{HookExecutor, ProcessRunner};
pub use session::{HookReport, HookSession, SessionOutcome, SkipReason};
