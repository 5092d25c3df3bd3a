//! CLI argument definitions using clap
//!
//! Commands:
//! - aeroapi serve --config <path>
//! - aeroapi check --config <path>

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// aeroapi - A JSON:API server over an in-memory store
#[derive(Parser, Debug)]
#[command(name = "aeroapi")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Load the configuration, seed the store and serve the API
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroapi.json")]
        config: PathBuf,
    },

    /// Validate the configuration and print the registered types
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./aeroapi.json")]
        config: PathBuf,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
