//! Linear decorator chains

use std::sync::Arc;

use tracing::debug_span;

use super::decorator::{MergeOrder, ValidationDecorator};
use super::rule::{LintRule, RuleOptions};
use super::{BaseValidator, ValidationContext, Validator};
use crate::error::Result;
use crate::result::ValidationResult;
use crate::token::Tokenize;

/// Builds a chain of decorators over a [`BaseValidator`]
///
/// Each added rule wraps everything added before it, so the last rule is
/// the outermost layer. With the default [`MergeOrder::InnerFirst`] the
/// chain emits findings in the order the rules were added.
pub struct ChainBuilder {
    name: String,
    tokenizer: Arc<dyn Tokenize>,
    layers: Vec<(Box<dyn LintRule>, RuleOptions)>,
    merge_order: MergeOrder,
}

impl ChainBuilder {
    pub fn new(name: impl Into<String>, tokenizer: Arc<dyn Tokenize>) -> Self {
        Self {
            name: name.into(),
            tokenizer,
            layers: Vec::new(),
            merge_order: MergeOrder::default(),
        }
    }

    pub fn rule(self, rule: impl LintRule + 'static) -> Self {
        self.boxed_rule(Box::new(rule), RuleOptions::default())
    }

    pub fn rule_with_options(self, rule: impl LintRule + 'static, options: RuleOptions) -> Self {
        self.boxed_rule(Box::new(rule), options)
    }

    pub fn boxed_rule(mut self, rule: Box<dyn LintRule>, options: RuleOptions) -> Self {
        self.layers.push((rule, options));
        self
    }

    /// Merge order applied to every layer
    pub fn merge_order(mut self, merge_order: MergeOrder) -> Self {
        self.merge_order = merge_order;
        self
    }

    pub fn build(self) -> ValidatorChain {
        let mut codes = Vec::with_capacity(self.layers.len());
        let mut root: Box<dyn Validator> = Box::new(BaseValidator::new(Arc::clone(&self.tokenizer)));

        for (rule, options) in self.layers {
            codes.push(rule.code());
            root = Box::new(
                ValidationDecorator::new(rule, root, Arc::clone(&self.tokenizer))
                    .with_options(options)
                    .with_merge_order(self.merge_order),
            );
        }

        ValidatorChain {
            name: self.name,
            root,
            codes,
        }
    }
}

/// A named, fully built validator chain
pub struct ValidatorChain {
    name: String,
    root: Box<dyn Validator>,
    /// Rule codes, innermost first
    codes: Vec<&'static str>,
}

impl ValidatorChain {
    /// Number of decorator layers
    pub fn depth(&self) -> usize {
        self.codes.len()
    }

    pub fn rule_codes(&self) -> &[&'static str] {
        &self.codes
    }
}

impl Validator for ValidatorChain {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
        let _span = debug_span!("validate", chain = %self.name, uid = ctx.uid, engine_id = ctx.engine_id)
            .entered();
        self.root.validate(ctx)
    }
}
