//! Validation findings

use serde::{Deserialize, Serialize};

use crate::coordinate::{coordinate_of, Coordinate};
use crate::error::{Result, ValidationError};

/// Finding severity level
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Class of a finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultCategory {
    /// Style or performance advice from a lint rule
    #[default]
    Lint,
    /// Anything else, e.g. a query that could not be rendered
    General,
}

/// One position-anchored finding
///
/// Lines and columns are 0-indexed; the start never comes after the end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    pub start_line: usize,
    pub start_ch: usize,
    pub end_line: usize,
    pub end_ch: usize,
    pub severity: Severity,
    pub message: String,
    pub category: ResultCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    /// Code of the rule that reported this, e.g. `L001`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

impl ValidationResult {
    /// Build a result from character offsets into `query`
    pub fn from_offsets(
        query: &str,
        start: usize,
        end: usize,
        severity: Severity,
        message: impl Into<String>,
        category: ResultCategory,
        suggestion: Option<String>,
    ) -> Result<Self> {
        if start > end {
            return Err(ValidationError::InvertedRange { start, end });
        }
        let start = coordinate_of(query, start)?;
        let end = coordinate_of(query, end)?;
        Ok(Self::from_coordinates(
            start, end, severity, message, category, suggestion,
        ))
    }

    pub(crate) fn from_coordinates(
        start: Coordinate,
        end: Coordinate,
        severity: Severity,
        message: impl Into<String>,
        category: ResultCategory,
        suggestion: Option<String>,
    ) -> Self {
        Self {
            start_line: start.line,
            start_ch: start.column,
            end_line: end.line,
            end_ch: end.column,
            severity,
            message: message.into(),
            category,
            suggestion,
            code: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }

    pub fn start(&self) -> Coordinate {
        Coordinate::new(self.start_line, self.start_ch)
    }

    pub fn end(&self) -> Coordinate {
        Coordinate::new(self.end_line, self.end_ch)
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_offsets_maps_both_ends() {
        let query = "SELECT *\nFROM t\nUNION SELECT 1";
        let result = ValidationResult::from_offsets(
            query,
            16,
            21,
            Severity::Info,
            "use UNION ALL",
            ResultCategory::Lint,
            Some("UNION ALL".to_string()),
        )
        .unwrap();

        assert_eq!(
            result,
            ValidationResult {
                start_line: 2,
                start_ch: 0,
                end_line: 2,
                end_ch: 5,
                severity: Severity::Info,
                message: "use UNION ALL".to_string(),
                category: ResultCategory::Lint,
                suggestion: Some("UNION ALL".to_string()),
                code: None,
            }
        );
    }

    #[test]
    fn test_inverted_range_rejected() {
        let err = ValidationResult::from_offsets(
            "SELECT 1",
            5,
            2,
            Severity::Error,
            "x",
            ResultCategory::Lint,
            None,
        )
        .unwrap_err();
        assert_eq!(err, ValidationError::InvertedRange { start: 5, end: 2 });
    }

    #[test]
    fn test_end_past_query_rejected() {
        let err = ValidationResult::from_offsets(
            "SELECT 1",
            0,
            9,
            Severity::Error,
            "x",
            ResultCategory::Lint,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCoordinate { index: 9, .. }));
    }

    #[test]
    fn test_serialized_shape() {
        let result = ValidationResult::from_offsets(
            "SELECT *",
            7,
            8,
            Severity::Warning,
            "avoid *",
            ResultCategory::Lint,
            None,
        )
        .unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "start_line": 0,
                "start_ch": 7,
                "end_line": 0,
                "end_ch": 8,
                "severity": "warning",
                "message": "avoid *",
                "category": "lint",
            })
        );
    }

    #[test]
    fn test_code_serialized_when_set() {
        let result = ValidationResult::from_offsets(
            "SELECT *",
            7,
            8,
            Severity::Warning,
            "avoid *",
            ResultCategory::Lint,
            None,
        )
        .unwrap()
        .with_code("L001");
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["code"], "L001");
        assert!(!result.is_error());
    }
}
