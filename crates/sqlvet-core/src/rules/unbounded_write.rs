//! L004: `UPDATE`/`DELETE` that touch every row

use crate::error::Result;
use crate::result::Severity;
use crate::token::{significant, Token};
use crate::validator::{Finding, LintRule, ValidationContext};

pub struct UnboundedWrite;

impl LintRule for UnboundedWrite {
    fn code(&self) -> &'static str {
        "L004"
    }

    fn name(&self) -> &'static str {
        "unbounded-write"
    }

    fn message(&self) -> &str {
        "Statement without a WHERE clause affects every row"
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn check(&self, _ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<Finding>> {
        let tokens = significant(tokens);
        let mut findings = Vec::new();

        for statement in tokens.split(|t| t.is_symbol(";")) {
            let (Some(first), Some(last)) = (statement.first(), statement.last()) else {
                continue;
            };
            let verb = if first.is_keyword("UPDATE") {
                "UPDATE"
            } else if first.is_keyword("DELETE") {
                "DELETE"
            } else {
                continue;
            };

            if !has_top_level_where(statement) {
                findings.push(
                    Finding::between(first, last)
                        .with_message(format!("{} without a WHERE clause affects every row", verb)),
                );
            }
        }

        Ok(findings)
    }
}

/// WHERE outside any parentheses, so subquery filters do not count
fn has_top_level_where(statement: &[&Token]) -> bool {
    let mut depth = 0usize;
    for token in statement {
        if token.is_symbol("(") {
            depth += 1;
        } else if token.is_symbol(")") {
            depth = depth.saturating_sub(1);
        } else if depth == 0 && token.is_keyword("WHERE") {
            return true;
        }
    }
    false
}
