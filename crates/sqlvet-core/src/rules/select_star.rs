//! L001: projecting every column with `*`

use crate::error::Result;
use crate::result::Severity;
use crate::token::{significant, Token};
use crate::validator::{Finding, LintRule, ValidationContext};

pub struct SelectStar;

impl LintRule for SelectStar {
    fn code(&self) -> &'static str {
        "L001"
    }

    fn name(&self) -> &'static str {
        "select-star"
    }

    fn message(&self) -> &str {
        "Avoid SELECT *; list the columns you need explicitly"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, _ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<Finding>> {
        let tokens = significant(tokens);
        let findings = tokens
            .windows(2)
            .filter(|pair| pair[1].is_symbol("*") && starts_projection(pair[0]))
            .map(|pair| Finding::at(pair[1]))
            .collect();
        Ok(findings)
    }
}

/// Whether a `*` following this token is a wildcard projection
fn starts_projection(prev: &Token) -> bool {
    prev.is_keyword("SELECT")
        || prev.is_keyword("DISTINCT")
        || prev.is_keyword("ALL")
        || prev.is_symbol(",")
        || prev.is_symbol(".")
}
