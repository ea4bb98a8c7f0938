//! Logging configuration for the precommit-run CLI
//!
//! Hook progress and tool output are reported through `tracing`; this module
//! installs the subscriber that prints them.

use crate::Result;
use precommit_core::Error;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Crate targets that receive the default log level
const TARGETS: [&str; 4] = [
    "precommit_run",
    "precommit_engine",
    "precommit_config",
    "precommit_core",
];

/// Initialize the logging system
///
/// # Arguments
/// * `verbose` - Enable debug level logging (command lines, timeouts, glob matches)
/// * `log_file` - Optional path to append a detailed debug log to
///
/// `RUST_LOG` overrides the console filter when set.
///
/// # Examples
/// ```ignore
/// // Basic usage with info level
/// init(false, None)?;
///
/// // Verbose mode with a debug log file
/// init(true, Some(Path::new("precommit-run.log")))?;
/// ```
///
/// # Errors
///
/// Returns error if the filter cannot be built or the log file cannot be opened
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(default_directives(level))
            .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?,
    };

    let stdout_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_ansi(true);

    // Timestamps only in verbose mode
    let stdout_layer: BoxedLayer = if verbose {
        stdout_layer.with_filter(env_filter).boxed()
    } else {
        stdout_layer.without_time().with_filter(env_filter).boxed()
    };

    let file_layer: Option<BoxedLayer> = match log_file {
        Some(log_path) => {
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(log_path)?;

            let debug_filter = EnvFilter::try_new("debug")
                .map_err(|e| Error::Message(format!("Invalid log filter: {e}")))?;

            Some(
                fmt::layer()
                    .with_writer(file)
                    .with_ansi(false)
                    .with_target(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .pretty()
                    .with_filter(debug_filter)
                    .boxed(),
            )
        }
        None => None,
    };

    let layers: Vec<BoxedLayer> = std::iter::once(stdout_layer).chain(file_layer).collect();

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| Error::Message(format!("Failed to initialize logging: {e}")))
}

fn default_directives(level: &str) -> String {
    TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
