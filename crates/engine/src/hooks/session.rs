//! Hook session: the policy around running pre-commit hooks
//!
//! A session takes run settings and a project base directory and walks the
//! checks in order:
//!
//! 1. `skip` set → nothing runs
//! 2. no hooks requested → error
//! 3. tool not installed → skip or error
//! 4. `.pre-commit-config.yaml` missing → skip or error
//! 5. undeclared hooks → dropped or error
//! 6. files resolved (globs expanded, missing files warned about and dropped)
//! 7. hooks run one after another, stopping at the first failure
//!
//! Exit code 1 (files modified) is only fatal with `fail_on_modification`.
//! Once the executor reports cancellation, a failed probe or hook ends the
//! session with [`Error::Interrupted`] instead of a skip or a hook failure.

use super::files::{self, ResolvedFiles};
use super::result::{HookOutcome, HookResult};
use super::runner::{HookExecutor, ProcessRunner};
use precommit_config::{CONFIG_FILE_NAME, ConfigLookup, GlobMatcher, RunConfig};
use precommit_core::{Error, Result};
use std::path::{Path, PathBuf};

/// Why a session ended without running any hook
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// `skip` was set
    Disabled,
    /// The tool is not installed and `skip_if_not_installed` is set
    NotInstalled,
    /// The hook configuration file is missing and `skip_if_config_not_found` is set
    ConfigNotFound,
    /// None of the requested hooks is declared
    NoConfiguredHooks,
    /// No files were requested, or none of them exist
    NoFiles,
}

/// Hook id paired with the result of running it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookReport {
    /// Hook id or alias as requested
    pub hook: String,
    /// Result of the invocation
    pub result: HookResult,
}

/// How a session ended when it did not fail
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionOutcome {
    /// Nothing ran
    Skipped(SkipReason),
    /// Every hook ran and none failed
    Completed(Vec<HookReport>),
}

impl SessionOutcome {
    /// True if any completed hook modified files
    #[must_use]
    pub fn modified_files(&self) -> bool {
        match self {
            Self::Skipped(_) => false,
            Self::Completed(reports) => reports.iter().any(|r| r.result.is_modified()),
        }
    }
}

/// One run of the configured hooks against a project
///
/// # Examples
///
/// ```ignore
/// let config = RunConfig::load_from_base_dir(base_dir)?;
/// let outcome = HookSession::new(&config, base_dir).run()?;
/// ```
pub struct HookSession<'a, E = ProcessRunner>
where
    E: HookExecutor,
{
    config: &'a RunConfig,
    base_dir: &'a Path,
    executor: E,
    lookup: ConfigLookup,
    matcher: GlobMatcher,
}

impl<'a> HookSession<'a, ProcessRunner> {
    /// Create a session that runs hooks with a [`ProcessRunner`] built from `config`
    #[must_use]
    pub fn new(config: &'a RunConfig, base_dir: &'a Path) -> Self {
        Self {
            config,
            base_dir,
            executor: ProcessRunner::from_config(config),
            lookup: ConfigLookup::new(),
            matcher: GlobMatcher::new(),
        }
    }
}

impl<'a, E> HookSession<'a, E>
where
    E: HookExecutor,
{
    /// Replace the executor
    ///
    /// Transforms the session to use a specific executor type.
    pub fn executor<X>(self, executor: X) -> HookSession<'a, X>
    where
        X: HookExecutor,
    {
        HookSession {
            config: self.config,
            base_dir: self.base_dir,
            executor,
            lookup: self.lookup,
            matcher: self.matcher,
        }
    }

    /// Replace the glob matcher (e.g. to collect expansion warnings)
    #[must_use]
    pub fn glob_matcher(mut self, matcher: GlobMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Path of the hook configuration file for this project
    #[must_use]
    pub fn config_file(&self) -> PathBuf {
        self.base_dir.join(CONFIG_FILE_NAME)
    }

    /// Run the session
    ///
    /// # Errors
    ///
    /// Returns an error when no hooks are requested, when a check fails and the
    /// matching `skip_if_*` flag is off, when a hook fails, when a hook
    /// modifies files and `fail_on_modification` is set, or when the run is
    /// cancelled
    #[tracing::instrument(skip(self), fields(base_dir = %self.base_dir.display()))]
    pub fn run(&self) -> Result<SessionOutcome> {
        if self.config.skip {
            tracing::info!("Skipping pre-commit hook execution");
            return Ok(SessionOutcome::Skipped(SkipReason::Disabled));
        }

        if self.config.hooks.is_empty() {
            return Err(Error::NoHooks);
        }

        if !self.check_installed()? {
            return Ok(SessionOutcome::Skipped(SkipReason::NotInstalled));
        }

        let config_file = self.config_file();
        if !self.check_config_file(&config_file)? {
            return Ok(SessionOutcome::Skipped(SkipReason::ConfigNotFound));
        }

        let hooks = self.configured_hooks(&config_file)?;
        if hooks.is_empty() {
            tracing::info!("None of the requested hooks are configured, skipping execution");
            return Ok(SessionOutcome::Skipped(SkipReason::NoConfiguredHooks));
        }

        let files = self.resolve_files();
        if files.is_empty() {
            return Ok(SessionOutcome::Skipped(SkipReason::NoFiles));
        }

        let mut reports = Vec::with_capacity(hooks.len());
        for hook in hooks {
            if self.executor.is_cancelled() {
                return Err(Error::Interrupted);
            }
            let result = self.run_hook(hook, &files)?;
            reports.push(HookReport {
                hook: hook.to_string(),
                result,
            });
        }

        Ok(SessionOutcome::Completed(reports))
    }

    fn check_installed(&self) -> Result<bool> {
        let executable = &self.config.executable;
        if self.executor.is_available(executable) {
            return Ok(true);
        }
        if self.executor.is_cancelled() {
            return Err(Error::Interrupted);
        }
        if self.config.skip_if_not_installed {
            tracing::warn!(
                "{} is not installed or not in PATH, skipping execution",
                executable
            );
            return Ok(false);
        }
        Err(Error::NotInstalled {
            executable: executable.clone(),
        })
    }

    fn check_config_file(&self, config_file: &Path) -> Result<bool> {
        if config_file.exists() {
            return Ok(true);
        }
        if self.config.skip_if_config_not_found {
            tracing::info!("No {} found, skipping execution", CONFIG_FILE_NAME);
            return Ok(false);
        }
        Err(Error::ConfigNotFound {
            basedir: self.base_dir.to_path_buf(),
        })
    }

    /// Requested hooks that are declared, in request order
    fn configured_hooks(&self, config_file: &Path) -> Result<Vec<&'a str>> {
        let mut hooks = Vec::with_capacity(self.config.hooks.len());

        for hook in &self.config.hooks {
            if self.lookup.is_hook_configured(config_file, hook) {
                hooks.push(hook.as_str());
            } else if self.config.skip_if_hook_not_found {
                tracing::info!(
                    "Hook '{}' not found in {}, skipping",
                    hook,
                    CONFIG_FILE_NAME
                );
            } else {
                return Err(Error::HookNotFound { hook: hook.clone() });
            }
        }

        Ok(hooks)
    }

    fn resolve_files(&self) -> Vec<PathBuf> {
        if self.config.files.is_empty() {
            tracing::info!("No files specified, skipping execution");
            return Vec::new();
        }

        let ResolvedFiles { existing, missing } =
            files::resolve(&self.config.files, self.base_dir, &self.matcher);

        if !missing.is_empty() {
            let listed: Vec<String> = missing.iter().map(|p| p.display().to_string()).collect();
            tracing::warn!("Files not found: {}", listed.join(", "));
        }

        if existing.is_empty() {
            tracing::info!("No existing files to run on, skipping execution");
        }

        existing
    }

    fn run_hook(&self, hook: &str, files: &[PathBuf]) -> Result<HookResult> {
        tracing::info!(
            "Running pre-commit hook '{}' on {} file(s)",
            hook,
            files.len()
        );

        let result = self.executor.run_hook(
            &self.config.executable,
            hook,
            files,
            self.base_dir,
            Some(&self.config.environment),
        );

        for line in result.output().lines() {
            tracing::info!("{}", line);
        }

        match result.outcome() {
            HookOutcome::Passed => {
                tracing::info!("Hook '{}' passed (no changes needed)", hook);
            }
            HookOutcome::Modified if self.config.fail_on_modification => {
                return Err(Error::HookModified {
                    hook: hook.to_string(),
                });
            }
            HookOutcome::Modified => {
                tracing::info!("Hook '{}' modified files", hook);
            }
            HookOutcome::Failed if self.executor.is_cancelled() => {
                return Err(Error::Interrupted);
            }
            HookOutcome::Failed => {
                return Err(Error::HookFailed {
                    hook: hook.to_string(),
                    exit_code: result.exit_code(),
                });
            }
        }

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;
    use indexmap::IndexMap;
    use std::cell::RefCell;
    use std::collections::HashMap;
    use std::fs;
    use tempfile::TempDir;

    /// Recorded arguments of one `run_hook` call
    #[derive(Debug, Clone)]
    struct Call {
        executable: String,
        hook: String,
        files: Vec<PathBuf>,
        working_dir: PathBuf,
        environment: Option<IndexMap<String, String>>,
    }

    /// Executor that records calls and answers with canned results
    struct FakeExecutor {
        installed: bool,
        cancelled: bool,
        results: HashMap<String, HookResult>,
        calls: RefCell<Vec<Call>>,
    }

    impl FakeExecutor {
        fn installed() -> Self {
            Self {
                installed: true,
                cancelled: false,
                results: HashMap::new(),
                calls: RefCell::new(Vec::new()),
            }
        }

        fn not_installed() -> Self {
            Self {
                installed: false,
                ..Self::installed()
            }
        }

        fn cancelled(self) -> Self {
            Self {
                cancelled: true,
                ..self
            }
        }

        fn returning(mut self, hook: &str, exit_code: i32, output: &str) -> Self {
            self.results
                .insert(hook.to_string(), HookResult::new(exit_code, output));
            self
        }

        fn hooks_run(&self) -> Vec<String> {
            self.calls.borrow().iter().map(|c| c.hook.clone()).collect()
        }
    }

    impl HookExecutor for &FakeExecutor {
        fn is_available(&self, _executable: &str) -> bool {
            self.installed
        }

        fn run_hook(
            &self,
            executable: &str,
            hook_id: &str,
            files: &[PathBuf],
            working_dir: &Path,
            environment: Option<&IndexMap<String, String>>,
        ) -> HookResult {
            self.calls.borrow_mut().push(Call {
                executable: executable.to_string(),
                hook: hook_id.to_string(),
                files: files.to_vec(),
                working_dir: working_dir.to_path_buf(),
                environment: environment.cloned(),
            });
            self.results
                .get(hook_id)
                .cloned()
                .unwrap_or_else(|| HookResult::new(0, "Passed"))
        }

        fn is_cancelled(&self) -> bool {
            self.cancelled
        }
    }

    struct Project {
        temp: TempDir,
    }

    impl Project {
        fn new() -> Self {
            Self {
                temp: TempDir::new().unwrap(),
            }
        }

        fn with_hooks(self, hooks: &[&str]) -> Self {
            let mut yaml = String::from("repos:\n  - repo: local\n    hooks:\n");
            for hook in hooks {
                yaml.push_str(&format!("      - id: {hook}\n"));
            }
            fs::write(self.temp.path().join(CONFIG_FILE_NAME), yaml).unwrap();
            self
        }

        fn with_file(self, path: &str) -> Self {
            let file_path = self.temp.path().join(path);
            fs::create_dir_all(file_path.parent().unwrap()).unwrap();
            fs::write(file_path, "{}").unwrap();
            self
        }

        fn path(&self) -> &Path {
            self.temp.path()
        }
    }

    fn config(hooks: &[&str], files: &[&str]) -> RunConfig {
        RunConfig {
            hooks: hooks.iter().map(ToString::to_string).collect(),
            files: files.iter().map(ToString::to_string).collect(),
            ..RunConfig::default()
        }
    }

    fn run_with(
        config: &RunConfig,
        project: &Project,
        executor: &FakeExecutor,
    ) -> Result<SessionOutcome> {
        HookSession::new(config, project.path())
            .executor(executor)
            .run()
    }

    #[test]
    fn test_skip_flag_short_circuits() {
        let project = Project::new();
        let executor = FakeExecutor::installed();
        let config = RunConfig {
            skip: true,
            ..config(&[], &[])
        };

        let outcome = run_with(&config, &project, &executor).unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped(SkipReason::Disabled));
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_no_hooks_is_an_error() {
        let project = Project::new();
        let executor = FakeExecutor::installed();

        let err = run_with(&config(&[], &["test.json"]), &project, &executor).unwrap_err();

        assert!(matches!(err, Error::NoHooks));
        assert!(err.to_string().contains("'hooks' must be specified"));
    }

    #[test]
    fn test_not_installed_skips_by_default() {
        let project = Project::new().with_hooks(&["test-hook"]).with_file("test.json");
        let executor = FakeExecutor::not_installed();

        let outcome = run_with(&config(&["test-hook"], &["test.json"]), &project, &executor)
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped(SkipReason::NotInstalled));
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_not_installed_fails_when_not_skipping() {
        let project = Project::new();
        let executor = FakeExecutor::not_installed();
        let config = RunConfig {
            skip_if_not_installed: false,
            ..config(&["test-hook"], &["test.json"])
        };

        let err = run_with(&config, &project, &executor).unwrap_err();

        assert!(matches!(err, Error::NotInstalled { .. }));
        assert!(err.to_string().contains("pre-commit is not installed"));
    }

    #[test]
    fn test_cancelled_availability_check_is_interrupted() {
        let project = Project::new().with_hooks(&["test-hook"]).with_file("test.json");
        let executor = FakeExecutor::not_installed().cancelled();

        let err = run_with(&config(&["test-hook"], &["test.json"]), &project, &executor)
            .unwrap_err();

        assert!(matches!(err, Error::Interrupted));
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_cancelled_hook_is_interrupted() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2"])
            .with_file("test.json");
        let executor = FakeExecutor::installed()
            .returning("hook1", -1, "Execution interrupted")
            .cancelled();

        let err = run_with(&config(&["hook1", "hook2"], &["test.json"]), &project, &executor)
            .unwrap_err();

        assert!(matches!(err, Error::Interrupted));
        assert_eq!(err.to_string(), "Execution interrupted");
    }

    #[cfg(unix)]
    #[test]
    fn test_cancelled_runner_fails_session_with_installed_tool() {
        let project = Project::new().with_hooks(&["test-hook"]).with_file("test.json");
        let token = precommit_core::CancelToken::new();
        token.cancel();
        let config = RunConfig {
            executable: "true".to_string(),
            ..config(&["test-hook"], &["test.json"])
        };
        let runner = ProcessRunner::from_config(&config).with_cancel_token(token);

        let err = HookSession::new(&config, project.path())
            .executor(runner)
            .run()
            .unwrap_err();

        assert!(matches!(err, Error::Interrupted));
    }

    #[test]
    fn test_missing_config_skips_by_default() {
        let project = Project::new().with_file("test.json");
        let executor = FakeExecutor::installed();

        let outcome = run_with(&config(&["test-hook"], &["test.json"]), &project, &executor)
            .unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped(SkipReason::ConfigNotFound));
    }

    #[test]
    fn test_missing_config_fails_when_not_skipping() {
        let project = Project::new();
        let executor = FakeExecutor::installed();
        let config = RunConfig {
            skip_if_config_not_found: false,
            ..config(&["test-hook"], &["test.json"])
        };

        let err = run_with(&config, &project, &executor).unwrap_err();

        assert!(matches!(err, Error::ConfigNotFound { .. }));
    }

    #[test]
    fn test_missing_hook_skips_by_default() {
        let project = Project::new().with_hooks(&["other-hook"]).with_file("test.json");
        let executor = FakeExecutor::installed();

        let outcome = run_with(&config(&["test-hook"], &["test.json"]), &project, &executor)
            .unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Skipped(SkipReason::NoConfiguredHooks)
        );
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_missing_hook_fails_when_not_skipping() {
        let project = Project::new().with_hooks(&["other-hook"]).with_file("test.json");
        let executor = FakeExecutor::installed();
        let config = RunConfig {
            skip_if_hook_not_found: false,
            ..config(&["test-hook"], &["test.json"])
        };

        let err = run_with(&config, &project, &executor).unwrap_err();

        match err {
            Error::HookNotFound { hook } => assert_eq!(hook, "test-hook"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_only_configured_hooks_run() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2"])
            .with_file("test.json");
        let executor = FakeExecutor::installed();

        let outcome = run_with(
            &config(&["hook1", "missing-hook", "hook2"], &["test.json"]),
            &project,
            &executor,
        )
        .unwrap();

        assert_eq!(executor.hooks_run(), vec!["hook1", "hook2"]);
        match outcome {
            SessionOutcome::Completed(reports) => assert_eq!(reports.len(), 2),
            other => panic!("unexpected outcome: {other:?}"),
        }
    }

    #[test]
    fn test_hooks_run_sequentially_with_same_arguments() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2", "hook3"])
            .with_file("test.json");
        let executor = FakeExecutor::installed();

        run_with(
            &config(&["hook1", "hook2", "hook3"], &["test.json"]),
            &project,
            &executor,
        )
        .unwrap();

        let calls = executor.calls.borrow();
        assert_eq!(executor.hooks_run(), vec!["hook1", "hook2", "hook3"]);
        for call in calls.iter() {
            assert_eq!(call.executable, "pre-commit");
            assert_eq!(call.files, vec![project.path().join("test.json")]);
            assert_eq!(call.working_dir, project.path());
        }
    }

    #[test]
    fn test_stops_on_first_failing_hook() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2"])
            .with_file("test.json");
        let executor = FakeExecutor::installed().returning("hook1", 2, "Error");

        let err = run_with(&config(&["hook1", "hook2"], &["test.json"]), &project, &executor)
            .unwrap_err();

        assert!(err.to_string().contains("hook1"));
        assert!(err.to_string().contains("failed"));
        assert_eq!(executor.hooks_run(), vec!["hook1"]);
    }

    #[test]
    fn test_local_failure_is_fatal() {
        let project = Project::new().with_hooks(&["hook1"]).with_file("test.json");
        let executor =
            FakeExecutor::installed().returning("hook1", -1, "Process timed out after 300 seconds");

        let err = run_with(&config(&["hook1"], &["test.json"]), &project, &executor).unwrap_err();

        match err {
            Error::HookFailed { hook, exit_code } => {
                assert_eq!(hook, "hook1");
                assert_eq!(exit_code, -1);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_modification_continues_by_default() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2"])
            .with_file("test.json");
        let executor = FakeExecutor::installed().returning("hook1", 1, "Fixing test.json");

        let outcome = run_with(&config(&["hook1", "hook2"], &["test.json"]), &project, &executor)
            .unwrap();

        assert_eq!(executor.hooks_run(), vec!["hook1", "hook2"]);
        assert!(outcome.modified_files());
    }

    #[test]
    fn test_modification_fails_when_configured() {
        let project = Project::new()
            .with_hooks(&["hook1", "hook2"])
            .with_file("test.json");
        let executor = FakeExecutor::installed().returning("hook1", 1, "Fixing test.json");
        let config = RunConfig {
            fail_on_modification: true,
            ..config(&["hook1", "hook2"], &["test.json"])
        };

        let err = run_with(&config, &project, &executor).unwrap_err();

        assert!(matches!(err, Error::HookModified { .. }));
        assert!(err.to_string().contains("modified files"));
        assert_eq!(executor.hooks_run(), vec!["hook1"]);
    }

    #[test]
    fn test_no_files_specified_skips() {
        let project = Project::new().with_hooks(&["test-hook"]);
        let executor = FakeExecutor::installed();

        let outcome = run_with(&config(&["test-hook"], &[]), &project, &executor).unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped(SkipReason::NoFiles));
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_only_missing_files_skips() {
        let project = Project::new().with_hooks(&["test-hook"]);
        let executor = FakeExecutor::installed();

        let outcome = run_with(
            &config(&["test-hook"], &["non-existent-file.json"]),
            &project,
            &executor,
        )
        .unwrap();

        assert_eq!(outcome, SessionOutcome::Skipped(SkipReason::NoFiles));
        assert!(executor.hooks_run().is_empty());
    }

    #[test]
    fn test_missing_files_are_dropped() {
        let project = Project::new()
            .with_hooks(&["test-hook"])
            .with_file("docs/openapi.json");
        let executor = FakeExecutor::installed();

        run_with(
            &config(&["test-hook"], &["docs/openapi.json", "gone.json"]),
            &project,
            &executor,
        )
        .unwrap();

        let calls = executor.calls.borrow();
        assert_eq!(
            calls[0].files,
            vec![project.path().join("docs/openapi.json")]
        );
    }

    #[test]
    fn test_glob_files_are_expanded() {
        let project = Project::new()
            .with_hooks(&["test-hook"])
            .with_file("src/main/java/App.java")
            .with_file("src/test/java/AppTest.java")
            .with_file("docs/readme.md");
        let executor = FakeExecutor::installed();

        run_with(
            &config(&["test-hook"], &["src/**/*.java"]),
            &project,
            &executor,
        )
        .unwrap();

        let calls = executor.calls.borrow();
        let names: Vec<String> = calls[0]
            .files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["App.java", "AppTest.java"]);
    }

    #[test]
    fn test_environment_is_forwarded() {
        let project = Project::new().with_hooks(&["test-hook"]).with_file("test.json");
        let executor = FakeExecutor::installed();
        let mut environment = IndexMap::new();
        environment.insert(
            "GIT_CONFIG_PARAMETERS".to_string(),
            "'core.autocrlf=false'".to_string(),
        );
        let config = RunConfig {
            environment: environment.clone(),
            ..config(&["test-hook"], &["test.json"])
        };

        run_with(&config, &project, &executor).unwrap();

        let calls = executor.calls.borrow();
        assert_eq!(calls[0].environment, Some(environment));
    }

    #[test]
    fn test_alias_counts_as_configured() {
        let project = Project::new().with_file("test.json");
        fs::write(
            project.path().join(CONFIG_FILE_NAME),
            "repos:\n  - repo: local\n    hooks:\n      - id: pretty-format-json\n        alias: format-openapi\n",
        )
        .unwrap();
        let executor = FakeExecutor::installed();

        run_with(&config(&["format-openapi"], &["test.json"]), &project, &executor).unwrap();

        assert_eq!(executor.hooks_run(), vec!["format-openapi"]);
    }

    #[test]
    fn test_completed_reports_carry_results() {
        let project = Project::new().with_hooks(&["hook1"]).with_file("test.json");
        let executor = FakeExecutor::installed().returning("hook1", 0, "hook1....Passed");

        let outcome = run_with(&config(&["hook1"], &["test.json"]), &project, &executor).unwrap();

        assert_eq!(
            outcome,
            SessionOutcome::Completed(vec![HookReport {
                hook: "hook1".to_string(),
                result: HookResult::new(0, "hook1....Passed"),
            }])
        );
        assert!(!outcome.modified_files());
    }
}
