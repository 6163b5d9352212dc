//! CLI argument definitions

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "sqlvet")]
#[command(author, version, about = "Composable SQL lint tool")]
#[command(propagate_version = true)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Lint SQL files
    Check {
        /// SQL files to check (supports glob patterns)
        files: Vec<PathBuf>,

        /// Configuration file (defaults to the nearest sqlvet.toml)
        #[arg(short, long, value_name = "FILE")]
        config: Option<PathBuf>,

        /// SQL dialect
        #[arg(short, long, env = "SQLVET_DIALECT")]
        dialect: Option<String>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Rule codes or names to disable
        #[arg(long, value_name = "RULE")]
        disable: Vec<String>,

        /// Template variable substituted for {{ NAME }}
        #[arg(long = "var", value_name = "NAME=VALUE")]
        vars: Vec<String>,

        /// User id reported to validators
        #[arg(long, default_value = "0")]
        uid: i64,

        /// Engine id reported to validators
        #[arg(long, default_value = "0")]
        engine_id: i64,
    },

    /// List the available lint rules
    Rules,

    /// Tokenize SQL and display the tokens (for debugging)
    Tokens {
        /// SQL file to tokenize
        file: PathBuf,

        /// SQL dialect
        #[arg(short, long, default_value = "postgresql")]
        dialect: String,
    },
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output
    Json,
    /// SARIF output (for GitHub Code Scanning)
    Sarif,
}
