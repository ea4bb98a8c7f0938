//! Check command implementation
//!
//! Reports what a run would find without running any hook.

use anyhow::Result;
use clap::Args;
use owo_colors::OwoColorize;
use precommit_config::{CONFIG_FILE_NAME, ConfigLookup};
use precommit_engine::ProcessRunner;
use std::path::Path;

use crate::command::Command;
use crate::common::RuntimeContext;

/// Show whether pre-commit and the requested hooks are available
#[derive(Debug, Default, Args)]
pub struct CheckCommand {
    /// Hook id or alias to look up (repeatable, replaces configured hooks)
    #[arg(long = "hook", value_name = "ID")]
    pub hooks: Vec<String>,

    /// pre-commit executable name or path
    #[arg(long, env = "PRECOMMIT_RUN_EXECUTABLE", value_name = "EXE")]
    pub executable: Option<String>,
}

/// Findings of a check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckReport {
    /// Executable that was probed
    pub executable: String,
    /// `<executable> --version` succeeded
    pub installed: bool,
    /// `.pre-commit-config.yaml` exists in the base directory
    pub config_exists: bool,
    /// Each requested hook and whether it is declared
    pub hooks: Vec<(String, bool)>,
}

impl CheckCommand {
    /// Gather the report for `base_dir` using `runner` for the probe
    pub fn report(
        &self,
        context: &RuntimeContext,
        runner: &ProcessRunner,
    ) -> CheckReport {
        let settings = &context.settings;
        let executable = self
            .executable
            .clone()
            .unwrap_or_else(|| settings.executable.clone());
        let hooks = if self.hooks.is_empty() {
            &settings.hooks
        } else {
            &self.hooks
        };

        let config_file = context.base_dir().join(CONFIG_FILE_NAME);
        let lookup = ConfigLookup::new();

        CheckReport {
            installed: runner.is_available(&executable),
            executable,
            config_exists: config_file.is_file(),
            hooks: hooks
                .iter()
                .map(|hook| (hook.clone(), lookup.is_hook_configured(&config_file, hook)))
                .collect(),
        }
    }
}

impl Command for CheckCommand {
    type Output = ();

    fn execute(&self, context: &RuntimeContext) -> Result<()> {
        let runner = ProcessRunner::from_config(&context.settings);
        let report = self.report(context, &runner);
        print_report(&report, context.base_dir());
        Ok(())
    }
}

fn print_report(report: &CheckReport, base_dir: &Path) {
    println!("Base directory: {}", base_dir.display().cyan());
    println!(
        "{} {}",
        status(report.installed),
        format!("{} installed", report.executable).bold()
    );
    println!("{} {}", status(report.config_exists), CONFIG_FILE_NAME.bold());

    if report.hooks.is_empty() {
        println!("{}", "No hooks requested".dimmed());
        return;
    }

    for (hook, declared) in &report.hooks {
        println!("{} hook {}", status(*declared), hook.bold());
    }
}

fn status(ok: bool) -> String {
    if ok {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}
