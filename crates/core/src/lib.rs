//! Core types and utilities for precommit-run
//!
//! This is the foundation crate (Layer 0) that all other precommit crates depend on.
//! It provides:
//! - Base error types
//! - Cooperative cancellation shared between the CLI and running hooks
//! - Platform conventions (line separator)
//!
//! This crate has no dependencies on other precommit crates.

pub mod cancel;
pub mod error;
pub mod platform;

pub use cancel::CancelToken;
pub use error::{Error, Result};
