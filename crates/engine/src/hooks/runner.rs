//! Process execution for pre-commit
//!
//! Runs `pre-commit --version` and `pre-commit run <hook> [--files ...]` as
//! child processes with a time budget. Expected failures never surface as
//! errors: a missing executable, a timeout or a cancellation all come back as a
//! `false` probe or a [`HookResult`] with exit code -1 and a message.
//!
//! Merged stdout/stderr is drained on a separate thread while this thread
//! polls the child for exit, so a chatty child can never fill the pipe and
//! stall the wait. Exit is detected on the child alone: a background process
//! that inherits the output pipe cannot hold the result back for longer than
//! the output grace period.

use super::result::HookResult;
use indexmap::IndexMap;
use precommit_config::RunConfig;
use precommit_config::config::{DEFAULT_INSTALL_CHECK_TIMEOUT_SECS, DEFAULT_TIMEOUT_SECS};
use precommit_core::CancelToken;
use precommit_core::platform::join_lines;
use std::ffi::OsString;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitStatus;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// Upper bound on how long a cancellation request can go unnoticed
const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// How long to keep collecting output after the child has exited
pub const DEFAULT_OUTPUT_GRACE: Duration = Duration::from_secs(5);

/// Read size for the output drain
const CHUNK_SIZE: usize = 8192;

/// Anything that can probe for and run pre-commit hooks
///
/// [`ProcessRunner`] is the real implementation; the hook session is generic
/// over this trait so its policy can be exercised without spawning processes.
pub trait HookExecutor {
    /// Check whether `executable --version` succeeds
    fn is_available(&self, executable: &str) -> bool;

    /// Run `executable run <hook_id> [--files ...]` in `working_dir`
    fn run_hook(
        &self,
        executable: &str,
        hook_id: &str,
        files: &[PathBuf],
        working_dir: &Path,
        environment: Option<&IndexMap<String, String>>,
    ) -> HookResult;

    /// True once the run has been asked to stop
    ///
    /// Lets callers tell an interrupted probe or hook apart from a genuine
    /// failure.
    fn is_cancelled(&self) -> bool {
        false
    }
}

/// How a wait for a child process ended
enum WaitOutcome {
    Exited(ExitStatus),
    TimedOut,
    Interrupted,
}

/// Child process that can be polled for exit and killed
trait ChildProcess {
    /// Exit status if the child has exited, without blocking
    fn poll_exit(&self) -> io::Result<Option<ExitStatus>>;

    fn kill(&self) -> io::Result<()>;
}

impl ChildProcess for duct::Handle {
    fn poll_exit(&self) -> io::Result<Option<ExitStatus>> {
        Ok(self.try_wait()?.map(|output| output.status))
    }

    fn kill(&self) -> io::Result<()> {
        duct::Handle::kill(self)
    }
}

impl ChildProcess for duct::ReaderHandle {
    fn poll_exit(&self) -> io::Result<Option<ExitStatus>> {
        Ok(self.try_wait()?.map(|output| output.status))
    }

    fn kill(&self) -> io::Result<()> {
        duct::ReaderHandle::kill(self)
    }
}

/// Merged child output, read on a background thread
///
/// The thread owns one reference to the reader and forwards chunks over a
/// channel. It ends when the last writer closes the pipe, which may be long
/// after the child itself has exited.
struct OutputDrain {
    chunks: Receiver<Vec<u8>>,
}

impl OutputDrain {
    fn spawn(reader: Arc<duct::ReaderHandle>) -> io::Result<Self> {
        let (sender, chunks) = mpsc::channel();

        thread::Builder::new()
            .name("precommit-output".to_string())
            .spawn(move || {
                let mut source = &*reader;
                let mut buffer = [0u8; CHUNK_SIZE];
                loop {
                    match source.read(&mut buffer) {
                        Ok(0) => break,
                        Ok(n) => {
                            if sender.send(buffer[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                        Err(e) => {
                            tracing::debug!("Output reader stopped: {}", e);
                            break;
                        }
                    }
                }
            })?;

        Ok(Self { chunks })
    }

    /// Collect output until the pipe closes or `grace` elapses
    fn collect(self, grace: Duration) -> Vec<u8> {
        let deadline = Instant::now() + grace;
        let mut output = Vec::new();

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.chunks.recv_timeout(remaining) {
                Ok(chunk) => output.extend_from_slice(&chunk),
                Err(RecvTimeoutError::Disconnected) => break,
                Err(RecvTimeoutError::Timeout) => {
                    tracing::warn!(
                        "Output pipe still open {} after the hook exited, using output received so far",
                        describe(grace)
                    );
                    break;
                }
            }
        }

        output
    }
}

/// Runs the pre-commit executable with bounded time
///
/// Timeouts and the cancellation token are fixed at construction. One runner
/// can be shared between threads; every call owns its own child process and
/// output buffer.
#[derive(Debug, Clone)]
pub struct ProcessRunner {
    timeout: Duration,
    install_check_timeout: Duration,
    output_grace: Duration,
    cancel: CancelToken,
}

impl ProcessRunner {
    /// Create a runner with the default timeouts (300s run, 10s probe)
    #[must_use]
    pub fn new() -> Self {
        Self::with_timeouts(
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            Duration::from_secs(DEFAULT_INSTALL_CHECK_TIMEOUT_SECS),
        )
    }

    /// Create a runner with explicit timeouts
    #[must_use]
    pub fn with_timeouts(timeout: Duration, install_check_timeout: Duration) -> Self {
        Self {
            timeout,
            install_check_timeout,
            output_grace: DEFAULT_OUTPUT_GRACE,
            cancel: CancelToken::new(),
        }
    }

    /// Create a runner using the timeouts from run settings
    #[must_use]
    pub fn from_config(config: &RunConfig) -> Self {
        Self::with_timeouts(config.timeout(), config.install_check_timeout())
    }

    /// Observe `token` while waiting for child processes
    ///
    /// Once the token is cancelled, running children are killed and every
    /// later call fails fast. The runner never resets the token.
    #[must_use]
    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = token;
        self
    }

    /// Keep collecting output for at most `grace` once the hook has exited
    #[must_use]
    pub fn with_output_grace(mut self, grace: Duration) -> Self {
        self.output_grace = grace;
        self
    }

    /// True once the cancellation token has been set
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// Timeout for a hook run
    #[must_use]
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Timeout for the availability probe
    #[must_use]
    pub fn install_check_timeout(&self) -> Duration {
        self.install_check_timeout
    }

    /// Check if the pre-commit executable is installed and working
    ///
    /// Runs `<executable> --version` with its output discarded. Returns true
    /// only if the process exits with code 0 within the probe timeout.
    #[tracing::instrument(skip(self), fields(timeout = ?self.install_check_timeout))]
    pub fn is_available(&self, executable: &str) -> bool {
        let expression = duct::cmd(executable, ["--version"])
            .stderr_to_stdout()
            .stdout_null()
            .unchecked();

        let handle = match expression.start() {
            Ok(handle) => handle,
            Err(e) => {
                tracing::debug!("Failed to start '{}': {}", executable, e);
                return false;
            }
        };

        match self.wait(&handle, self.install_check_timeout) {
            Ok(WaitOutcome::Exited(status)) => status.success(),
            Ok(WaitOutcome::TimedOut) => {
                tracing::debug!(
                    "'{} --version' timed out after {}",
                    executable,
                    describe(self.install_check_timeout)
                );
                false
            }
            Ok(WaitOutcome::Interrupted) => false,
            Err(e) => {
                tracing::debug!("Failed to wait for '{}': {}", executable, e);
                false
            }
        }
    }

    /// Run a pre-commit hook
    ///
    /// `files` are passed as absolute paths after `--files`, in the given
    /// order. With an empty list `--files` is left out entirely, which the tool
    /// treats as "run on all files".
    ///
    /// `environment` is merged over the inherited environment of this process.
    #[tracing::instrument(
        skip(self, files, environment),
        fields(working_dir = %working_dir.display(), files = files.len(), timeout = ?self.timeout)
    )]
    pub fn run_hook(
        &self,
        executable: &str,
        hook_id: &str,
        files: &[PathBuf],
        working_dir: &Path,
        environment: Option<&IndexMap<String, String>>,
    ) -> HookResult {
        let args = build_args(hook_id, files);
        tracing::debug!("Executing command: {} {:?}", executable, args);

        // Build command - inherits parent env by default
        let mut expression = duct::cmd(executable, args)
            .dir(working_dir)
            .stderr_to_stdout()
            .unchecked();

        for (key, value) in environment.into_iter().flatten() {
            expression = expression.env(key, value);
        }

        let reader = match expression.reader() {
            Ok(reader) => Arc::new(reader),
            Err(e) => {
                return HookResult::local_failure(format!(
                    "Failed to execute pre-commit ({executable}): {e}"
                ));
            }
        };

        let drain = match OutputDrain::spawn(Arc::clone(&reader)) {
            Ok(drain) => drain,
            Err(e) => {
                terminate(reader.as_ref());
                return HookResult::local_failure(format!(
                    "Failed to execute pre-commit ({executable}): {e}"
                ));
            }
        };

        match self.wait(reader.as_ref(), self.timeout) {
            Ok(WaitOutcome::Exited(status)) => {
                let output = drain.collect(self.output_grace);
                HookResult::new(
                    exit_code(status),
                    join_lines(&String::from_utf8_lossy(&output)),
                )
            }
            Ok(WaitOutcome::TimedOut) => HookResult::local_failure(format!(
                "Process timed out after {}",
                describe(self.timeout)
            )),
            Ok(WaitOutcome::Interrupted) => HookResult::local_failure("Execution interrupted"),
            Err(e) => HookResult::local_failure(format!(
                "Failed to execute pre-commit ({executable}): {e}"
            )),
        }
    }

    /// Wait for `child` until it exits, `timeout` elapses or cancellation is requested
    ///
    /// The child is killed in the latter two cases.
    fn wait<C: ChildProcess>(&self, child: &C, timeout: Duration) -> io::Result<WaitOutcome> {
        let deadline = Instant::now() + timeout;

        loop {
            if self.cancel.is_cancelled() {
                tracing::debug!("Cancellation requested, killing child process");
                terminate(child);
                return Ok(WaitOutcome::Interrupted);
            }

            if let Some(status) = child.poll_exit()? {
                return Ok(WaitOutcome::Exited(status));
            }

            let now = Instant::now();
            if now >= deadline {
                terminate(child);
                return Ok(WaitOutcome::TimedOut);
            }

            thread::sleep((deadline - now).min(POLL_INTERVAL));
        }
    }
}

impl Default for ProcessRunner {
    fn default() -> Self {
        Self::new()
    }
}

impl HookExecutor for ProcessRunner {
    fn is_available(&self, executable: &str) -> bool {
        ProcessRunner::is_available(self, executable)
    }

    fn run_hook(
        &self,
        executable: &str,
        hook_id: &str,
        files: &[PathBuf],
        working_dir: &Path,
        environment: Option<&IndexMap<String, String>>,
    ) -> HookResult {
        ProcessRunner::run_hook(self, executable, hook_id, files, working_dir, environment)
    }

    fn is_cancelled(&self) -> bool {
        ProcessRunner::is_cancelled(self)
    }
}

/// Arguments after the executable: `run <hook_id> [--files <abs paths...>]`
fn build_args(hook_id: &str, files: &[PathBuf]) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["run".into(), hook_id.into()];

    if !files.is_empty() {
        args.push("--files".into());
        args.extend(
            files
                .iter()
                .map(|file| std::path::absolute(file).unwrap_or_else(|_| file.clone()))
                .map(PathBuf::into_os_string),
        );
    }

    args
}

/// Forcibly kill the child; there is no grace period beyond the timeout itself
fn terminate<C: ChildProcess>(child: &C) {
    if let Err(e) = child.kill() {
        tracing::debug!("Failed to kill child process: {}", e);
    }
}

/// Exit code of a finished child; a child killed by a signal reports 128 + signal
fn exit_code(status: ExitStatus) -> i32 {
    if let Some(code) = status.code() {
        return code;
    }

    #[cfg(unix)]
    {
        use std::os::unix::process::ExitStatusExt;
        if let Some(signal) = status.signal() {
            return 128 + signal;
        }
    }

    super::result::LOCAL_FAILURE_EXIT_CODE
}

/// Render a timeout for messages: "300 seconds", "0.250 seconds"
fn describe(timeout: Duration) -> String {
    if timeout.subsec_nanos() == 0 {
        format!("{} seconds", timeout.as_secs())
    } else {
        format!("{:.3} seconds", timeout.as_secs_f64())
    }
}
