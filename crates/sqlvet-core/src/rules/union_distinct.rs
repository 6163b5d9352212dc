//! L002: `UNION` that silently deduplicates

use crate::error::Result;
use crate::result::Severity;
use crate::token::{significant, Token};
use crate::validator::{Finding, LintRule, ValidationContext};

pub struct UnionDistinct;

impl LintRule for UnionDistinct {
    fn code(&self) -> &'static str {
        "L002"
    }

    fn name(&self) -> &'static str {
        "union-distinct"
    }

    fn message(&self) -> &str {
        "UNION removes duplicate rows with an extra sort; use UNION ALL if duplicates are acceptable"
    }

    fn severity(&self) -> Severity {
        Severity::Info
    }

    fn check(&self, _ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<Finding>> {
        let tokens = significant(tokens);
        let mut findings = Vec::new();

        for (i, token) in tokens.iter().enumerate() {
            if !token.is_keyword("UNION") {
                continue;
            }
            let explicit = tokens
                .get(i + 1)
                .is_some_and(|next| next.is_keyword("ALL") || next.is_keyword("DISTINCT"));
            if !explicit {
                findings.push(Finding::at(token).with_suggestion("UNION ALL"));
            }
        }

        Ok(findings)
    }
}
