//! Command trait for precommit-run
//!
//! Every subcommand implements [`Command`] and receives the same
//! [`RuntimeContext`], so commands can be tested without going through
//! argument parsing.

use crate::common::RuntimeContext;
use anyhow::Result;

/// Trait for all precommit-run commands
///
/// # Example
///
/// ```rust,ignore
/// use crate::command::Command;
/// use crate::common::RuntimeContext;
/// use anyhow::Result;
/// use clap::Args;
///
/// #[derive(Debug, Args)]
/// pub struct MyCommand {
///     #[arg(long)]
///     pub some_flag: bool,
/// }
///
/// impl Command for MyCommand {
///     type Output = ();
///
///     fn execute(&self, context: &RuntimeContext) -> Result<()> {
///         // Access settings: context.settings
///         // Access paths: context.base_dir()
///         Ok(())
///     }
/// }
/// ```
pub trait Command {
    /// The type returned by this command
    type Output;

    /// Execute the command with the given runtime context
    ///
    /// # Errors
    ///
    /// Returns an error if the command fails; the process then exits with code 1
    fn execute(&self, context: &RuntimeContext) -> Result<Self::Output>;
}
