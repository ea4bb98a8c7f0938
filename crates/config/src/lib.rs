//! Configuration management for precommit-run
//!
//! This crate handles:
//! - Run settings loading and validation
//! - Hook declaration lookup in `.pre-commit-config.yaml`
//! - Glob expansion of requested file lists
//! - Logging initialization

pub mod config;
pub mod logging;
pub mod lookup;
pub mod patterns;

// Re-export error types from core
pub use precommit_core::{Error, Result};

// Re-export main types
pub use config::{RunConfig, SETTINGS_FILE_NAME};
pub use lookup::{CONFIG_FILE_NAME, ConfigLookup};
pub use patterns::GlobMatcher;
