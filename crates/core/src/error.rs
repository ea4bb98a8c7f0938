//! Base error types for precommit-run
//!
//! Expected operational failures of the process runner, the glob matcher and
//! the config lookup never surface here; they degrade to typed return values.
//! These variants cover the policy decisions the hook session makes on top.

use std::path::PathBuf;
use thiserror::Error;

/// Base error type for shared functionality
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// No hook ids were requested
    #[error("'hooks' must be specified and contain at least one hook id")]
    NoHooks,

    /// The external tool is missing or failed its version probe
    #[error("{executable} is not installed or not in PATH")]
    NotInstalled {
        /// Executable name or path that was probed
        executable: String,
    },

    /// The hook configuration file does not exist
    #[error(".pre-commit-config.yaml not found in {}", basedir.display())]
    ConfigNotFound {
        /// Directory that was searched
        basedir: PathBuf,
    },

    /// A requested hook is not declared in the hook configuration file
    #[error("Hook '{hook}' not found in .pre-commit-config.yaml")]
    HookNotFound {
        /// Requested hook id or alias
        hook: String,
    },

    /// A hook reported a failure (exit code other than 0 or 1)
    #[error("Hook '{hook}' failed with exit code {exit_code}")]
    HookFailed {
        /// Hook id or alias
        hook: String,
        /// Exit code reported by the tool, -1 for local execution errors
        exit_code: i32,
    },

    /// A hook modified files and modifications are configured to fail the run
    #[error(
        "Hook '{hook}' modified files. Review the changes and commit them, or set fail_on_modification = false"
    )]
    HookModified {
        /// Hook id or alias
        hook: String,
    },

    /// The run was cancelled while probing for or running the tool
    #[error("Execution interrupted")]
    Interrupted,

    /// Run settings could not be loaded or are inconsistent
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error message
    #[error("{0}")]
    Message(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hook_failed_message_names_hook_and_code() {
        let err = Error::HookFailed {
            hook: "hook1".to_string(),
            exit_code: 2,
        };
        let msg = err.to_string();
        assert!(msg.contains("hook1"));
        assert!(msg.contains("failed"));
        assert!(msg.contains('2'));
    }

    #[test]
    fn test_config_not_found_message_includes_basedir() {
        let err = Error::ConfigNotFound {
            basedir: PathBuf::from("/work/project"),
        };
        assert_eq!(
            err.to_string(),
            ".pre-commit-config.yaml not found in /work/project"
        );
    }

    #[test]
    fn test_io_error_converts() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
