//! Error types for the validation pipeline

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

/// Result alias used throughout the validation pipeline
pub type Result<T, E = ValidationError> = std::result::Result<T, E>;

/// Errors raised while running a validator chain
///
/// Any of these surfacing from `validate` means validation did not run to
/// completion; it never means the query is clean.
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
pub enum ValidationError {
    /// The tokenizer could not process the query
    #[error("failed to tokenize query at line {line}, column {column}: {message}")]
    #[diagnostic(code(sqlvet::tokenize))]
    Tokenize {
        message: String,
        /// Line reported by the tokenizer (1-indexed)
        line: u64,
        /// Column reported by the tokenizer (1-indexed)
        column: u64,
        /// Byte span of the failure, when it lies inside the query
        #[label("tokenizer stopped here")]
        span: Option<SourceSpan>,
    },

    /// A character index outside `[0, len]` was handed to the coordinate mapper
    #[error("index {index} is outside the query bounds [0, {len}]")]
    #[diagnostic(
        code(sqlvet::invalid_coordinate),
        help("a rule computed an offset outside the query text")
    )]
    InvalidCoordinate { index: usize, len: usize },

    /// A result was requested with its start after its end
    #[error("result range is inverted: start {start} is after end {end}")]
    #[diagnostic(code(sqlvet::inverted_range))]
    InvertedRange { start: usize, end: usize },

    /// A template placeholder names a variable that was not supplied
    #[error("undefined template variable '{name}'")]
    #[diagnostic(code(sqlvet::template::undefined_variable))]
    UndefinedVariable {
        name: String,
        /// Character offset of the placeholder in the original query
        start: usize,
        end: usize,
        #[label("not defined")]
        span: SourceSpan,
    },

    /// `{{` without a matching `}}`
    #[error("unterminated template expression starting at index {start}")]
    #[diagnostic(code(sqlvet::template::unterminated))]
    UnterminatedTemplate {
        start: usize,
        #[label("opened here")]
        span: SourceSpan,
    },

    #[error("validator '{0}' is not registered")]
    #[diagnostic(code(sqlvet::unknown_validator))]
    UnknownValidator(String),

    #[error("engine {engine_id} has no validator configured")]
    #[diagnostic(code(sqlvet::no_validator))]
    NoValidatorConfigured { engine_id: i64 },

    #[error("validator '{validator}' does not support language '{language}'")]
    #[diagnostic(code(sqlvet::unsupported_language))]
    UnsupportedLanguage { validator: String, language: String },

    #[error("unknown rule '{0}'")]
    #[diagnostic(code(sqlvet::unknown_rule), help("run `sqlvet rules` to list rule codes"))]
    UnknownRule(String),
}

impl ValidationError {
    /// Whether this error comes from template rendering rather than analysis
    pub fn is_template_error(&self) -> bool {
        matches!(
            self,
            ValidationError::UndefinedVariable { .. } | ValidationError::UnterminatedTemplate { .. }
        )
    }

    /// Character range in the original query this error points at, if any
    pub fn offsets(&self) -> Option<(usize, usize)> {
        match self {
            ValidationError::UndefinedVariable { start, end, .. } => Some((*start, *end)),
            ValidationError::UnterminatedTemplate { start, .. } => Some((*start, *start)),
            _ => None,
        }
    }
}

/// Byte span of the character range `start..end` in `text`
pub(crate) fn char_span(text: &str, start: usize, end: usize) -> SourceSpan {
    let byte = |index: usize| {
        text.char_indices()
            .nth(index)
            .map_or(text.len(), |(byte, _)| byte)
    };
    let start = byte(start);
    let end = byte(end).max(start);
    SourceSpan::new(start.into(), end - start)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_tokenize() {
        let err = ValidationError::Tokenize {
            message: "Unterminated string literal".to_string(),
            line: 1,
            column: 8,
            span: None,
        };
        assert_eq!(
            err.to_string(),
            "failed to tokenize query at line 1, column 8: Unterminated string literal"
        );
    }

    #[test]
    fn test_template_error_offsets() {
        let err = ValidationError::UndefinedVariable {
            name: "table".to_string(),
            start: 14,
            end: 25,
            span: (14, 11).into(),
        };
        assert!(err.is_template_error());
        assert_eq!(err.offsets(), Some((14, 25)));

        let err = ValidationError::UnknownValidator("presto".to_string());
        assert!(!err.is_template_error());
        assert_eq!(err.offsets(), None);
    }

    #[test]
    fn test_char_span_counts_bytes() {
        let text = "SELECT 'é', {{ x }}";
        assert_eq!(char_span(text, 12, 19), SourceSpan::new(13.into(), 7));
        assert_eq!(char_span(text, 19, 19), SourceSpan::new(20.into(), 0));
    }
}
