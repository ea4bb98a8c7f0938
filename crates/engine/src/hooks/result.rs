//! Result of a single hook invocation

/// Exit code reserved for failures on our side: launch failure, timeout, interruption
pub const LOCAL_FAILURE_EXIT_CODE: i32 = -1;

/// Classification of a hook exit code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookOutcome {
    /// Exit code 0: the hook passed and changed nothing
    Passed,
    /// Exit code 1: the hook modified files
    Modified,
    /// Any other exit code, including [`LOCAL_FAILURE_EXIT_CODE`]
    Failed,
}

/// Exit code and combined stdout/stderr of one pre-commit invocation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookResult {
    exit_code: i32,
    output: String,
}

impl HookResult {
    /// Create a result from an exit code and captured output
    pub fn new(exit_code: i32, output: impl Into<String>) -> Self {
        Self {
            exit_code,
            output: output.into(),
        }
    }

    /// Create a result for a failure that happened before or around the tool
    pub fn local_failure(message: impl Into<String>) -> Self {
        Self::new(LOCAL_FAILURE_EXIT_CODE, message)
    }

    /// Process exit code
    #[must_use]
    pub fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Captured output, lines joined with the platform line separator
    #[must_use]
    pub fn output(&self) -> &str {
        &self.output
    }

    /// Classify the exit code
    #[must_use]
    pub fn outcome(&self) -> HookOutcome {
        match self.exit_code {
            0 => HookOutcome::Passed,
            1 => HookOutcome::Modified,
            _ => HookOutcome::Failed,
        }
    }

    /// True if the hook passed without modifications (exit code 0)
    #[must_use]
    pub fn is_passed(&self) -> bool {
        self.outcome() == HookOutcome::Passed
    }

    /// True if the hook modified files (exit code 1)
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.outcome() == HookOutcome::Modified
    }

    /// True if the hook failed (exit code > 1 or < 0)
    #[must_use]
    pub fn is_failed(&self) -> bool {
        self.outcome() == HookOutcome::Failed
    }
}
