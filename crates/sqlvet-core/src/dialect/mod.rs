//! SQL dialect support

use sqlparser::dialect::{Dialect, GenericDialect, MySqlDialect, PostgreSqlDialect};
use std::str::FromStr;

/// Supported SQL dialects
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SqlDialect {
    #[default]
    PostgreSQL,
    MySQL,
    Generic,
}

impl SqlDialect {
    /// All dialects, in the order they are listed to users
    pub const ALL: [SqlDialect; 3] = [SqlDialect::PostgreSQL, SqlDialect::MySQL, SqlDialect::Generic];

    /// Get the sqlparser dialect driving the tokenizer
    pub fn tokenizer_dialect(&self) -> Box<dyn Dialect> {
        match self {
            SqlDialect::PostgreSQL => Box::new(PostgreSqlDialect {}),
            SqlDialect::MySQL => Box::new(MySqlDialect {}),
            SqlDialect::Generic => Box::new(GenericDialect {}),
        }
    }

    /// Canonical language name, as engines report it
    pub fn name(&self) -> &'static str {
        match self {
            SqlDialect::PostgreSQL => "postgresql",
            SqlDialect::MySQL => "mysql",
            SqlDialect::Generic => "generic",
        }
    }
}

impl FromStr for SqlDialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgresql" | "postgres" | "pg" => Ok(SqlDialect::PostgreSQL),
            "mysql" | "mysql8" => Ok(SqlDialect::MySQL),
            "generic" | "ansi" => Ok(SqlDialect::Generic),
            _ => Err(format!(
                "Unknown dialect: '{}'. Supported dialects: postgresql, mysql, generic.",
                s
            )),
        }
    }
}

impl std::fmt::Display for SqlDialect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}
