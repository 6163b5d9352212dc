//! Configuration file handling

use indexmap::IndexMap;
use miette::{IntoDiagnostic, Result};
use serde::{Deserialize, Serialize};
use sqlvet_core::RuleOptions;
use std::path::{Path, PathBuf};

use crate::args::OutputFormat;

const CONFIG_FILE: &str = "sqlvet.toml";

/// Configuration for sqlvet
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Query file patterns to check
    #[serde(default)]
    pub files: Vec<String>,

    /// SQL dialect (postgresql, mysql, generic)
    #[serde(default)]
    pub dialect: Option<String>,

    /// Output format (human, json, sarif)
    #[serde(default)]
    pub format: Option<OutputFormat>,

    /// Rules to disable (e.g., ["L001", "union-distinct"])
    #[serde(default)]
    pub disable: Vec<String>,

    /// Per-rule overrides keyed by rule code or name
    #[serde(default)]
    pub rules: IndexMap<String, RuleOptions>,

    /// Template variables
    #[serde(default)]
    pub vars: IndexMap<String, String>,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).into_diagnostic()?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        toml::from_str(contents).into_diagnostic()
    }

    /// Try to find and load sqlvet.toml in current directory or parent directories
    pub fn find_and_load() -> Result<Option<Self>> {
        let mut current_dir = std::env::current_dir().into_diagnostic()?;

        loop {
            let config_path = current_dir.join(CONFIG_FILE);
            if config_path.exists() {
                tracing::debug!(path = %config_path.display(), "using configuration file");
                return Ok(Some(Self::from_file(&config_path)?));
            }

            // Try parent directory
            if !current_dir.pop() {
                break;
            }
        }

        Ok(None)
    }

    /// Merge CLI arguments into configuration
    /// CLI arguments take precedence over config file values
    pub fn merge_with_args(
        mut self,
        files: &[PathBuf],
        dialect: &Option<String>,
        format: &Option<OutputFormat>,
        disable: &[String],
        vars: &[String],
    ) -> Result<Self> {
        if !files.is_empty() {
            self.files = files.iter().map(|p| p.display().to_string()).collect();
        }

        if dialect.is_some() {
            self.dialect = dialect.clone();
        }

        if format.is_some() {
            self.format = *format;
        }

        if !disable.is_empty() {
            self.disable = disable.to_vec();
        }

        // Individual variables override file values instead of replacing the table
        for var in vars {
            let (name, value) = parse_var(var)?;
            self.vars.insert(name, value);
        }

        Ok(self)
    }
}

/// Split `NAME=VALUE`
fn parse_var(raw: &str) -> Result<(String, String)> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => miette::bail!("Invalid --var '{}': expected NAME=VALUE", raw),
    }
}
