//! precommit-run CLI library
//!
//! Runs selected hooks of the `pre-commit` tool against a project as a build
//! step. Settings come from `precommit-run.toml` in the project base directory
//! with command-line flags layered on top.

pub mod cmd;
pub mod command;
pub mod common;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use precommit_config::RunConfig;
use std::path::{Path, PathBuf};

use command::Command;
use common::RuntimeContext;

/// precommit-run - run pre-commit hooks as part of a build
#[derive(Parser)]
#[command(name = "precommit-run")]
#[command(about = "Run pre-commit hooks as part of a build")]
#[command(version)]
#[command(long_about = "Run pre-commit hooks as part of a build

Invokes `pre-commit run <hook> --files ...` for each requested hook, in
order, against the project in the base directory.

By default a missing pre-commit installation, a missing
.pre-commit-config.yaml or an undeclared hook skips execution instead of
failing the build. Settings are read from precommit-run.toml in the base
directory when present.")]
pub struct Cli {
    /// Project base directory (default: current directory)
    #[arg(long, global = true, env = "PRECOMMIT_RUN_BASEDIR", value_name = "DIR")]
    pub basedir: Option<PathBuf>,

    /// Settings file (default: <basedir>/precommit-run.toml)
    #[arg(long, global = true, env = "PRECOMMIT_RUN_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Enable verbose output (shows DEBUG level logs)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Write logs to a file (useful for debugging)
    #[arg(long, global = true, env = "PRECOMMIT_RUN_LOG_FILE", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for precommit-run
#[derive(Subcommand)]
pub enum Commands {
    /// Run hooks on the requested files
    #[command(long_about = "Run hooks on the requested files

Hooks run one after another and execution stops at the first hook that
fails. A hook that modifies files (exit code 1) only fails the run with
--fail-on-modification.

Examples:
  • precommit-run run --hook pretty-format-json --file docs/openapi.json
      → Format one file

  • precommit-run run --hook mixed-line-ending --file 'src/**/*.yaml'
      → Glob patterns are expanded relative to the base directory

  • precommit-run run --hook trailing-whitespace --file README.md --fail-on-modification
      → Fail the build when the hook had to change something")]
    Run(cmd::run::RunCommand),

    /// Show whether pre-commit and the requested hooks are available
    Check(cmd::check::CheckCommand),
}

/// Main entry point for the CLI application
pub fn run(cli: Cli) -> Result<()> {
    precommit_config::logging::init(cli.verbose, cli.log_file.as_deref())?;

    let base_dir = resolve_base_dir(cli.basedir.as_deref())?;
    let settings = load_settings(cli.config.as_deref(), &base_dir)?;
    tracing::debug!("Base directory: {}", base_dir.display());

    let context = RuntimeContext::new(base_dir, settings);

    match cli.command {
        Commands::Run(command) => command.execute(&context),
        Commands::Check(command) => command.execute(&context),
    }
}

/// Absolute base directory, defaulting to the current directory
fn resolve_base_dir(basedir: Option<&Path>) -> Result<PathBuf> {
    let base_dir = match basedir {
        Some(dir) => dir.to_path_buf(),
        None => std::env::current_dir().context("Failed to determine current directory")?,
    };

    let base_dir = std::path::absolute(&base_dir)
        .with_context(|| format!("Invalid base directory: {}", base_dir.display()))?;

    if !base_dir.is_dir() {
        anyhow::bail!("Base directory does not exist: {}", base_dir.display());
    }

    Ok(base_dir)
}

/// Load settings from an explicit file or from the base directory
fn load_settings(config: Option<&Path>, base_dir: &Path) -> Result<RunConfig> {
    let settings = match config {
        Some(path) => RunConfig::load(path)?,
        None => RunConfig::load_from_base_dir(base_dir)?,
    };
    Ok(settings)
}
