//! Lint rule contract

use serde::{Deserialize, Serialize};

use super::ValidationContext;
use crate::error::Result;
use crate::result::{ResultCategory, Severity};
use crate::token::Token;

/// Per-rule overrides, as accepted from configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleOptions {
    /// Replaces the rule's default message
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub severity: Option<Severity>,
    #[serde(default)]
    pub category: Option<ResultCategory>,
}

/// A rule's raw finding, anchored by character offsets
///
/// Unset fields fall back to the owning decorator's defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Finding {
    pub start: usize,
    pub end: usize,
    pub message: Option<String>,
    pub suggestion: Option<String>,
    pub category: Option<ResultCategory>,
}

impl Finding {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            message: None,
            suggestion: None,
            category: None,
        }
    }

    /// Finding covering a single token
    pub fn at(token: &Token) -> Self {
        Self::new(token.start, token.end)
    }

    /// Finding from the start of `first` to the end of `last`
    pub fn between(first: &Token, last: &Token) -> Self {
        Self::new(first.start, last.end)
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    pub fn with_category(mut self, category: ResultCategory) -> Self {
        self.category = Some(category);
        self
    }
}

/// A single lint check over a tokenized query
///
/// Rules only see tokens; wrapping a rule in a
/// [`ValidationDecorator`](super::ValidationDecorator) turns it into a
/// validator that can be chained.
pub trait LintRule: Send + Sync {
    /// Stable code, e.g. "L001"
    fn code(&self) -> &'static str;

    /// Short kebab-case name
    fn name(&self) -> &'static str;

    /// Default message for findings that do not carry their own
    fn message(&self) -> &str;

    fn severity(&self) -> Severity;

    fn check(&self, ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<Finding>>;
}
