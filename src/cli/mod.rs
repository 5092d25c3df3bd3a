//! CLI module for aeroapi
//!
//! Provides command-line interface for:
//! - serve: Load config, seed the store and serve the API
//! - check: Validate config and print the registered types

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{build_registry, check, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};
