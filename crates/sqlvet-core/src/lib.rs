//! sqlvet-core: composable SQL lint validation
//!
//! This library tokenizes a query once and runs a chain of lint rules over
//! the shared tokens, producing position-anchored findings with line and
//! column coordinates.

pub mod coordinate;
pub mod dialect;
pub mod error;
pub mod registry;
pub mod result;
pub mod rules;
pub mod template;
pub mod token;
pub mod validator;

pub use coordinate::{coordinate_of, Coordinate};
pub use dialect::SqlDialect;
pub use error::{Result, ValidationError};
pub use registry::{QueryEngine, ValidatorRegistry};
pub use result::{ResultCategory, Severity, ValidationResult};
pub use template::{validate_with_templated_vars, TemplateVars};
pub use token::{SqlTokenizer, Token, TokenKind, Tokenize};
pub use validator::{
    ChainBuilder, Finding, LintRule, MergeOrder, RuleOptions, ValidationContext,
    ValidationDecorator, Validator, ValidatorChain,
};
