//! Run command implementation
//!
//! Merges command-line flags over the loaded settings and runs a hook session.

use anyhow::{Context, Result};
use clap::Args;
use owo_colors::OwoColorize;
use precommit_config::RunConfig;
use precommit_engine::{HookSession, ProcessRunner, SessionOutcome, SkipReason};

use crate::command::Command;
use crate::common::RuntimeContext;

/// Run hooks on the requested files
#[derive(Debug, Default, Args)]
pub struct RunCommand {
    /// Hook id or alias to run (repeatable, replaces configured hooks)
    #[arg(long = "hook", value_name = "ID")]
    pub hooks: Vec<String>,

    /// File or glob pattern relative to the base directory (repeatable, replaces configured files)
    #[arg(long = "file", value_name = "PATH")]
    pub files: Vec<String>,

    /// pre-commit executable name or path
    #[arg(long, env = "PRECOMMIT_RUN_EXECUTABLE", value_name = "EXE")]
    pub executable: Option<String>,

    /// Extra environment variable for pre-commit (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub environment: Vec<(String, String)>,

    /// Fail when a hook modifies files
    #[arg(long)]
    pub fail_on_modification: bool,

    /// Fail instead of skipping when pre-commit is not installed
    #[arg(long)]
    pub no_skip_if_not_installed: bool,

    /// Fail instead of skipping when .pre-commit-config.yaml is missing
    #[arg(long)]
    pub no_skip_if_config_not_found: bool,

    /// Fail instead of skipping when a hook is not declared
    #[arg(long)]
    pub no_skip_if_hook_not_found: bool,

    /// Skip hook execution entirely
    #[arg(long)]
    pub skip: bool,

    /// Timeout for each hook, in seconds
    #[arg(long, value_name = "SECS")]
    pub timeout: Option<u64>,
}

impl RunCommand {
    /// Layer these flags over `settings`
    ///
    /// Repeatable lists replace the configured lists when given at least once;
    /// environment entries are merged, flags win on conflicts.
    pub fn apply(&self, mut settings: RunConfig) -> Result<RunConfig> {
        if !self.hooks.is_empty() {
            settings.hooks.clone_from(&self.hooks);
        }
        if !self.files.is_empty() {
            settings.files.clone_from(&self.files);
        }
        if let Some(executable) = &self.executable {
            settings.executable.clone_from(executable);
        }
        for (key, value) in &self.environment {
            settings.environment.insert(key.clone(), value.clone());
        }
        if let Some(timeout) = self.timeout {
            settings.timeout_secs = timeout;
        }

        settings.skip |= self.skip;
        settings.fail_on_modification |= self.fail_on_modification;
        settings.skip_if_not_installed &= !self.no_skip_if_not_installed;
        settings.skip_if_config_not_found &= !self.no_skip_if_config_not_found;
        settings.skip_if_hook_not_found &= !self.no_skip_if_hook_not_found;

        settings.validate().context("Invalid command-line settings")?;
        Ok(settings)
    }
}

impl Command for RunCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let settings = self.apply(context.settings.clone())?;

        context.install_interrupt_handler();
        let runner =
            ProcessRunner::from_config(&settings).with_cancel_token(context.cancel_token().clone());

        let outcome = HookSession::new(&settings, context.base_dir())
            .executor(runner)
            .run()?;

        print_summary(&outcome);
        Ok(())
    }
}

fn print_summary(outcome: &SessionOutcome) {
    match outcome {
        SessionOutcome::Skipped(reason) => {
            println!("{} {}", "Skipped:".yellow(), describe_skip(*reason));
        }
        SessionOutcome::Completed(reports) => {
            for report in reports {
                if report.result.is_modified() {
                    println!("{} {}", "✎".yellow(), report.hook.bold());
                } else {
                    println!("{} {}", "✓".green(), report.hook.bold());
                }
            }
            if outcome.modified_files() {
                println!("{}", "Some hooks modified files".yellow());
            }
        }
    }
}

fn describe_skip(reason: SkipReason) -> &'static str {
    match reason {
        SkipReason::Disabled => "hook execution disabled",
        SkipReason::NotInstalled => "pre-commit is not installed",
        SkipReason::ConfigNotFound => "no .pre-commit-config.yaml",
        SkipReason::NoConfiguredHooks => "none of the requested hooks are configured",
        SkipReason::NoFiles => "no files to run on",
    }
}

/// Parse a `KEY=VALUE` environment entry
fn parse_env(entry: &str) -> Result<(String, String), String> {
    match entry.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{entry}'")),
    }
}
