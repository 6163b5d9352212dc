//! Built-in lint rules

mod leading_wildcard;
mod select_star;
mod unbounded_write;
mod union_distinct;

use crate::error::{Result, ValidationError};
use crate::validator::LintRule;

pub use leading_wildcard::LeadingWildcard;
pub use select_star::SelectStar;
pub use unbounded_write::UnboundedWrite;
pub use union_distinct::UnionDistinct;

/// Every built-in rule, ordered by code
pub fn builtin_rules() -> Vec<Box<dyn LintRule>> {
    vec![
        Box::new(SelectStar),
        Box::new(UnionDistinct),
        Box::new(LeadingWildcard),
        Box::new(UnboundedWrite),
    ]
}

/// Look up a built-in rule by code ("L001") or name ("select-star")
pub fn rule_by_code(code: &str) -> Result<Box<dyn LintRule>> {
    builtin_rules()
        .into_iter()
        .find(|rule| rule.code().eq_ignore_ascii_case(code) || rule.name() == code)
        .ok_or_else(|| ValidationError::UnknownRule(code.to_string()))
}
