//! Validator contract and composition
//!
//! A validator receives a [`ValidationContext`] and returns findings in
//! emission order. Token sequences are resolved once at the outermost layer
//! with [`resolve_tokens`] and forwarded unchanged to everything beneath it,
//! so a chain of any depth tokenizes a query at most once.

mod chain;
mod decorator;
mod rule;

use std::sync::Arc;

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::error::Result;
use crate::result::ValidationResult;
use crate::token::{Token, Tokenize};

pub use chain::{ChainBuilder, ValidatorChain};
pub use decorator::{MergeOrder, ValidationDecorator};
pub use rule::{Finding, LintRule, RuleOptions};

/// Open bag of rule-specific parameters
pub type Extra = IndexMap<String, serde_json::Value>;

/// Everything a validator needs for one `validate` call
#[derive(Debug, Clone)]
pub struct ValidationContext<'q> {
    pub query: &'q str,
    pub uid: i64,
    pub engine_id: i64,
    /// Tokens of `query`, once resolved
    tokens: Option<Arc<[Token]>>,
    pub extra: Extra,
}

impl<'q> ValidationContext<'q> {
    pub fn new(query: &'q str, uid: i64, engine_id: i64) -> Self {
        Self {
            query,
            uid,
            engine_id,
            tokens: None,
            extra: Extra::new(),
        }
    }

    /// Supply a precomputed token sequence for `query`
    pub fn with_tokens(mut self, tokens: impl Into<Arc<[Token]>>) -> Self {
        self.tokens = Some(tokens.into());
        self
    }

    pub fn with_extra(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    pub fn tokens(&self) -> Option<&[Token]> {
        self.tokens.as_deref()
    }

    pub fn extra(&self, key: &str) -> Option<&serde_json::Value> {
        self.extra.get(key)
    }

    /// Copy of this context carrying the resolved tokens
    pub(crate) fn forward(&self, tokens: Arc<[Token]>) -> Self {
        Self {
            query: self.query,
            uid: self.uid,
            engine_id: self.engine_id,
            tokens: Some(tokens),
            extra: self.extra.clone(),
        }
    }
}

/// Tokens already on the context, or a fresh tokenization of its query
///
/// A tokenizer failure is returned as-is; callers must not continue with a
/// partial or empty sequence.
pub fn resolve_tokens(ctx: &ValidationContext<'_>, tokenizer: &dyn Tokenize) -> Result<Arc<[Token]>> {
    match &ctx.tokens {
        Some(tokens) => {
            trace!(count = tokens.len(), "reusing supplied tokens");
            Ok(Arc::clone(tokens))
        }
        None => {
            let tokens = tokenizer.tokenize(ctx.query)?;
            debug!(count = tokens.len(), "tokenized query");
            Ok(Arc::from(tokens))
        }
    }
}

/// Anything that turns a query into findings
pub trait Validator: Send + Sync {
    fn name(&self) -> &str;

    /// Run validation; findings are returned in emission order
    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>>;

    fn validate_query(&self, query: &str, uid: i64, engine_id: i64) -> Result<Vec<ValidationResult>> {
        self.validate(&ValidationContext::new(query, uid, engine_id))
    }
}

impl<V: Validator + ?Sized> Validator for Box<V> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
        (**self).validate(ctx)
    }
}

/// Chain terminator: resolves tokens and contributes nothing
pub struct BaseValidator {
    tokenizer: Arc<dyn Tokenize>,
}

impl BaseValidator {
    pub fn new(tokenizer: Arc<dyn Tokenize>) -> Self {
        Self { tokenizer }
    }
}

impl Validator for BaseValidator {
    fn name(&self) -> &str {
        "base"
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
        resolve_tokens(ctx, self.tokenizer.as_ref())?;
        Ok(Vec::new())
    }
}

/// Runs several validators over one shared token sequence
///
/// Results are concatenated in registration order.
pub struct CompositeValidator {
    name: String,
    tokenizer: Arc<dyn Tokenize>,
    validators: Vec<Box<dyn Validator>>,
}

impl CompositeValidator {
    pub fn new(name: impl Into<String>, tokenizer: Arc<dyn Tokenize>) -> Self {
        Self {
            name: name.into(),
            tokenizer,
            validators: Vec::new(),
        }
    }

    pub fn with(mut self, validator: impl Validator + 'static) -> Self {
        self.validators.push(Box::new(validator));
        self
    }

    pub fn len(&self) -> usize {
        self.validators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.validators.is_empty()
    }
}

impl Validator for CompositeValidator {
    fn name(&self) -> &str {
        &self.name
    }

    fn validate(&self, ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
        let tokens = resolve_tokens(ctx, self.tokenizer.as_ref())?;
        let forwarded = ctx.forward(tokens);

        let mut results = Vec::new();
        for validator in &self.validators {
            results.extend(validator.validate(&forwarded)?);
        }
        Ok(results)
    }
}
