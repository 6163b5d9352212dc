//! Validation decorator - wraps a validator with one lint rule

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::rule::{Finding, LintRule, RuleOptions};
use super::{resolve_tokens, ValidationContext, Validator};
use crate::error::Result;
use crate::result::{ResultCategory, Severity, ValidationResult};
use crate::token::{Token, Tokenize};

/// Where a layer's own findings go relative to the wrapped validator's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MergeOrder {
    /// Wrapped findings first, then this layer's
    #[default]
    InnerFirst,
    /// This layer's findings first, then the wrapped ones
    OuterFirst,
}

/// A validator that runs one [`LintRule`] on top of an inner validator
///
/// On `validate` the decorator resolves tokens (tokenizing only if the
/// context carries none), hands the resolved tokens down to the inner
/// validator, runs its rule over the same tokens and merges both result
/// lists according to its [`MergeOrder`].
pub struct ValidationDecorator {
    rule: Box<dyn LintRule>,
    options: RuleOptions,
    inner: Box<dyn Validator>,
    tokenizer: Arc<dyn Tokenize>,
    merge_order: MergeOrder,
}

impl ValidationDecorator {
    pub fn new(
        rule: Box<dyn LintRule>,
        inner: Box<dyn Validator>,
        tokenizer: Arc<dyn Tokenize>,
    ) -> Self {
        Self {
            rule,
            options: RuleOptions::default(),
            inner,
            tokenizer,
            merge_order: MergeOrder::default(),
        }
    }

    pub fn with_options(mut self, options: RuleOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }

    pub fn code(&self) -> &'static str {
        self.rule.code()
    }

    /// Message used when a finding does not carry its own
    pub fn message(&self) -> &str {
        self.options
            .message
            .as_deref()
            .unwrap_or_else(|| self.rule.message())
    }

    pub fn severity(&self) -> Severity {
        self.options.severity.unwrap_or_else(|| self.rule.severity())
    }

    pub fn category(&self) -> ResultCategory {
        self.options.category.unwrap_or_default()
    }

    pub fn tokenizer(&self) -> &dyn Tokenize {
        self.tokenizer.as_ref()
    }

    /// Build one result for this layer, filling unset fields from its defaults
    pub fn build_result(
        &self,
        query: &str,
        start: usize,
        end: usize,
        suggestion: Option<String>,
        category: Option<ResultCategory>,
        message: Option<String>,
    ) -> Result<ValidationResult> {
        ValidationResult::from_offsets(
            query,
            start,
            end,
            self.severity(),
            message.unwrap_or_else(|| self.message().to_string()),
            category.unwrap_or_else(|| self.category()),
            suggestion,
        )
        .map(|result| result.with_code(self.code()))
    }

    fn own_results(&self, ctx: &ValidationContext<'_>, tokens: &[Token]) -> Result<Vec<ValidationResult>> {
        self.rule
            .check(ctx, tokens)?
            .into_iter()
            .map(|finding: Finding| {
                self.build_result(
                    ctx.query,
                    finding.start,
                    finding.end,
                    finding.suggestion,
                    finding.category,
                    finding.message,
                )
            })
            .collect()
    }
}

impl Validator for ValidationDecorator {
    fn name(&self) -> &str {
        self.rule.code()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
        let tokens = resolve_tokens(ctx, self.tokenizer.as_ref())?;
        let forwarded = ctx.forward(Arc::clone(&tokens));

        let inner = self.inner.validate(&forwarded)?;
        let own = self.own_results(&forwarded, &tokens)?;
        debug!(
            rule = self.code(),
            inner = inner.len(),
            own = own.len(),
            "layer validated"
        );

        let (mut first, second) = match self.merge_order {
            MergeOrder::InnerFirst => (inner, own),
            MergeOrder::OuterFirst => (own, inner),
        };
        first.extend(second);
        Ok(first)
    }
}
