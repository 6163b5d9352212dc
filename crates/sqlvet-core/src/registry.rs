//! Named validators and per-engine dispatch

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Result, ValidationError};
use crate::result::ValidationResult;
use crate::template::{validate_with_templated_vars, TemplateVars};
use crate::validator::Validator;

/// A query engine as far as validation is concerned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryEngine {
    pub id: i64,
    /// Query language the engine speaks, e.g. "postgresql"
    pub language: String,
    /// Name of the validator configured for this engine
    #[serde(default)]
    pub validator: Option<String>,
}

struct Registered {
    validator: Box<dyn Validator>,
    languages: Vec<String>,
}

/// Validators by name, each with the languages it understands
#[derive(Default)]
pub struct ValidatorRegistry {
    validators: IndexMap<String, Registered>,
}

impl ValidatorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a validator under its own name, replacing any previous one
    pub fn register<I, S>(&mut self, validator: impl Validator + 'static, languages: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let name = validator.name().to_string();
        let languages = languages
            .into_iter()
            .map(|l| Into::<String>::into(l).to_lowercase())
            .collect();
        self.validators.insert(
            name,
            Registered {
                validator: Box::new(validator),
                languages,
            },
        );
    }

    pub fn get(&self, name: &str) -> Result<&dyn Validator> {
        self.validators
            .get(name)
            .map(|r| r.validator.as_ref())
            .ok_or_else(|| ValidationError::UnknownValidator(name.to_string()))
    }

    pub fn languages(&self, name: &str) -> Option<&[String]> {
        self.validators.get(name).map(|r| r.languages.as_slice())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.validators.keys().map(String::as_str)
    }

    pub fn supports(&self, name: &str, language: &str) -> bool {
        self.languages(name)
            .is_some_and(|langs| langs.iter().any(|l| l.eq_ignore_ascii_case(language)))
    }

    /// Validate a (possibly templated) query with the engine's validator
    pub fn check_query(
        &self,
        engine: &QueryEngine,
        query: &str,
        uid: i64,
        vars: &TemplateVars,
    ) -> Result<Vec<ValidationResult>> {
        let name = engine
            .validator
            .as_deref()
            .ok_or(ValidationError::NoValidatorConfigured {
                engine_id: engine.id,
            })?;
        let validator = self.get(name)?;

        if !self.supports(name, &engine.language) {
            return Err(ValidationError::UnsupportedLanguage {
                validator: name.to_string(),
                language: engine.language.clone(),
            });
        }

        debug!(validator = name, engine_id = engine.id, "checking query");
        validate_with_templated_vars(validator, query, uid, engine.id, vars)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::rules::SelectStar;
    use crate::token::SqlTokenizer;
    use crate::validator::ChainBuilder;

    fn registry() -> ValidatorRegistry {
        let chain = ChainBuilder::new("pg-lint", Arc::new(SqlTokenizer::default()))
            .rule(SelectStar)
            .build();
        let mut registry = ValidatorRegistry::new();
        registry.register(chain, ["PostgreSQL"]);
        registry
    }

    fn engine(validator: Option<&str>, language: &str) -> QueryEngine {
        QueryEngine {
            id: 3,
            language: language.to_string(),
            validator: validator.map(str::to_string),
        }
    }

    #[test]
    fn test_check_query_runs_validator() {
        let results = registry()
            .check_query(&engine(Some("pg-lint"), "postgresql"), "SELECT * FROM t", 1, &TemplateVars::new())
            .unwrap();
        assert_eq!(results.len(), 1);
    }

    #[test]
    fn test_engine_without_validator() {
        let err = registry()
            .check_query(&engine(None, "postgresql"), "SELECT 1", 1, &TemplateVars::new())
            .unwrap_err();
        assert_eq!(err, ValidationError::NoValidatorConfigured { engine_id: 3 });
    }

    #[test]
    fn test_unknown_validator() {
        let err = registry()
            .check_query(&engine(Some("presto"), "postgresql"), "SELECT 1", 1, &TemplateVars::new())
            .unwrap_err();
        assert_eq!(err, ValidationError::UnknownValidator("presto".to_string()));
    }

    #[test]
    fn test_language_mismatch() {
        let err = registry()
            .check_query(&engine(Some("pg-lint"), "mysql"), "SELECT 1", 1, &TemplateVars::new())
            .unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedLanguage {
                validator: "pg-lint".to_string(),
                language: "mysql".to_string(),
            }
        );
    }

    #[test]
    fn test_names_keep_registration_order() {
        let mut registry = registry();
        registry.register(
            ChainBuilder::new("generic", Arc::new(SqlTokenizer::default())).build(),
            ["generic"],
        );
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["pg-lint", "generic"]);
        assert_eq!(registry.languages("pg-lint"), Some(&["postgresql".to_string()][..]));
    }
}
