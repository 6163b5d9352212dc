//! L003: `LIKE '%...'` patterns

use crate::error::Result;
use crate::result::Severity;
use crate::token::{significant, Token, TokenKind};
use crate::validator::{Finding, LintRule, ValidationContext};

pub struct LeadingWildcard;

impl LintRule for LeadingWildcard {
    fn code(&self) -> &'static str {
        "L003"
    }

    fn name(&self) -> &'static str {
        "leading-wildcard"
    }

    fn message(&self) -> &str {
        "A leading wildcard in a LIKE pattern prevents index use"
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn check(&self, _ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<Finding>> {
        let tokens = significant(tokens);
        let findings = tokens
            .windows(2)
            .filter(|pair| {
                (pair[0].is_keyword("LIKE") || pair[0].is_keyword("ILIKE"))
                    && pair[1].kind == TokenKind::String
                    && pattern_body(&pair[1].text).is_some_and(|body| body.starts_with('%'))
            })
            .map(|pair| Finding::between(pair[0], pair[1]))
            .collect();
        Ok(findings)
    }
}

/// Literal text after the opening quote, skipping prefixes such as `E` or `N`
fn pattern_body(literal: &str) -> Option<&str> {
    let quote = literal.find('\'')?;
    Some(&literal[quote + 1..])
}
