//! `{{ variable }}` templating for queries under validation
//!
//! A templated query is rendered before validation and every finding is
//! mapped back onto the original text, so positions always refer to what
//! the user wrote.

use indexmap::IndexMap;
use tracing::warn;

use crate::coordinate::{Coordinate, LineIndex};
use crate::error::{char_span, Result, ValidationError};
use crate::result::{ResultCategory, Severity, ValidationResult};
use crate::validator::{ValidationContext, Validator};

/// Template variables by name
pub type TemplateVars = IndexMap<String, String>;

/// Which side of a range an index belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bias {
    Start,
    End,
}

#[derive(Debug, Clone)]
struct Segment {
    rendered_start: usize,
    rendered_end: usize,
    original_start: usize,
    original_end: usize,
    substituted: bool,
}

/// A rendered query plus the mapping back to its template
#[derive(Debug, Clone)]
pub struct RenderedQuery {
    text: String,
    segments: Vec<Segment>,
    original_lines: LineIndex,
    rendered_lines: LineIndex,
}

/// Substitute every `{{ name }}` in `query` from `vars`
pub fn render_template(query: &str, vars: &TemplateVars) -> Result<RenderedQuery> {
    let chars: Vec<char> = query.chars().collect();
    let mut text = String::with_capacity(query.len());
    let mut segments = Vec::new();
    let mut rendered_len = 0;
    let mut literal_start = 0;
    let mut i = 0;

    while i < chars.len() {
        if !(chars[i] == '{' && chars.get(i + 1) == Some(&'{')) {
            i += 1;
            continue;
        }

        let close = find_close(&chars, i + 2).ok_or_else(|| ValidationError::UnterminatedTemplate {
            start: i,
            span: char_span(query, i, i + 2),
        })?;
        let name: String = chars[i + 2..close].iter().collect();
        let name = name.trim();
        let value = vars
            .get(name)
            .ok_or_else(|| ValidationError::UndefinedVariable {
                name: name.to_string(),
                start: i,
                end: close + 2,
                span: char_span(query, i, close + 2),
            })?;

        if literal_start < i {
            text.extend(&chars[literal_start..i]);
            segments.push(Segment {
                rendered_start: rendered_len,
                rendered_end: rendered_len + (i - literal_start),
                original_start: literal_start,
                original_end: i,
                substituted: false,
            });
            rendered_len += i - literal_start;
        }

        let value_len = value.chars().count();
        text.push_str(value);
        segments.push(Segment {
            rendered_start: rendered_len,
            rendered_end: rendered_len + value_len,
            original_start: i,
            original_end: close + 2,
            substituted: true,
        });
        rendered_len += value_len;

        i = close + 2;
        literal_start = i;
    }

    if literal_start < chars.len() {
        text.extend(&chars[literal_start..]);
        segments.push(Segment {
            rendered_start: rendered_len,
            rendered_end: rendered_len + (chars.len() - literal_start),
            original_start: literal_start,
            original_end: chars.len(),
            substituted: false,
        });
    }

    Ok(RenderedQuery {
        rendered_lines: LineIndex::new(&text),
        original_lines: LineIndex::new(query),
        text,
        segments,
    })
}

fn find_close(chars: &[char], from: usize) -> Option<usize> {
    (from..chars.len().saturating_sub(1)).find(|&j| chars[j] == '}' && chars[j + 1] == '}')
}

impl RenderedQuery {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether any placeholder was substituted
    pub fn is_templated(&self) -> bool {
        self.segments.iter().any(|s| s.substituted)
    }

    /// Map a character index in the rendered text back to the template
    ///
    /// Indices inside substituted text snap to the placeholder: its start
    /// for [`Bias::Start`], its end for [`Bias::End`].
    pub fn original_index(&self, rendered: usize, bias: Bias) -> usize {
        let segment = self
            .segments
            .iter()
            .find(|s| s.rendered_start <= rendered && rendered < s.rendered_end);

        match segment {
            None => self.original_lines.len(),
            Some(s) if !s.substituted => s.original_start + (rendered - s.rendered_start),
            Some(s) if bias == Bias::End && rendered > s.rendered_start => s.original_end,
            Some(s) => s.original_start,
        }
    }

    /// Re-anchor a result produced against the rendered text
    pub fn map_result(&self, result: ValidationResult) -> Result<ValidationResult> {
        let start = self.rendered_lines.offset(result.start())?;
        let end = self.rendered_lines.offset(result.end())?;
        let start = self
            .original_lines
            .coordinate(self.original_index(start, Bias::Start))?;
        let end = self
            .original_lines
            .coordinate(self.original_index(end, Bias::End))?;

        Ok(ValidationResult {
            start_line: start.line,
            start_ch: start.column,
            end_line: end.line,
            end_ch: end.column,
            ..result
        })
    }

    /// Re-anchor a tokenizer failure on the rendered text onto `query`
    ///
    /// Anything else, and any error on an untemplated query, passes through.
    pub fn map_error(&self, query: &str, err: ValidationError) -> ValidationError {
        let (message, line, column) = match err {
            ValidationError::Tokenize {
                message,
                line,
                column,
                ..
            } if self.is_templated() => (message, line, column),
            other => return other,
        };

        let rendered = Coordinate::new(
            line.saturating_sub(1) as usize,
            column.saturating_sub(1) as usize,
        );
        let mapped = self.rendered_lines.offset(rendered).and_then(|index| {
            let index = self.original_index(index, Bias::Start);
            Ok((index, self.original_lines.coordinate(index)?))
        });

        match mapped {
            Ok((index, at)) => ValidationError::Tokenize {
                message,
                line: at.line as u64 + 1,
                column: at.column as u64 + 1,
                span: Some(char_span(query, index, index)),
            },
            Err(_) => ValidationError::Tokenize {
                message,
                line,
                column,
                span: None,
            },
        }
    }
}

/// Render `query` and validate the result, reporting positions in `query`
///
/// A template that cannot be rendered yields a single general error
/// anchored on the offending placeholder instead of failing the call.
pub fn validate_with_templated_vars<V: Validator + ?Sized>(
    validator: &V,
    query: &str,
    uid: i64,
    engine_id: i64,
    vars: &TemplateVars,
) -> Result<Vec<ValidationResult>> {
    let rendered = match render_template(query, vars) {
        Ok(rendered) => rendered,
        Err(err) if err.is_template_error() => {
            warn!(error = %err, "query template could not be rendered");
            let (start, end) = err.offsets().unwrap_or((0, 0));
            return Ok(vec![ValidationResult::from_offsets(
                query,
                start,
                end,
                Severity::Error,
                err.to_string(),
                ResultCategory::General,
                None,
            )?]);
        }
        Err(err) => return Err(err),
    };

    let ctx = ValidationContext::new(rendered.text(), uid, engine_id);
    validator
        .validate(&ctx)
        .map_err(|err| rendered.map_error(query, err))?
        .into_iter()
        .map(|result| rendered.map_result(result))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::rules::{SelectStar, UnionDistinct};
    use crate::token::SqlTokenizer;
    use crate::validator::{ChainBuilder, ValidatorChain};

    fn vars(pairs: &[(&str, &str)]) -> TemplateVars {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn chain() -> ValidatorChain {
        ChainBuilder::new("test", Arc::new(SqlTokenizer::default()))
            .rule(SelectStar)
            .rule(UnionDistinct)
            .build()
    }

    #[test]
    fn test_render_substitutes() {
        let rendered = render_template(
            "SELECT * FROM {{ table }} WHERE d = '{{date}}'",
            &vars(&[("table", "events"), ("date", "2024-01-01")]),
        )
        .unwrap();
        assert_eq!(rendered.text(), "SELECT * FROM events WHERE d = '2024-01-01'");
        assert!(rendered.is_templated());
    }

    #[test]
    fn test_render_without_placeholders_is_identity() {
        let rendered = render_template("SELECT {1}", &TemplateVars::new()).unwrap();
        assert_eq!(rendered.text(), "SELECT {1}");
        assert!(!rendered.is_templated());
        assert_eq!(rendered.original_index(8, Bias::Start), 8);
    }

    #[test]
    fn test_undefined_variable() {
        let err = render_template("SELECT {{ missing }}", &TemplateVars::new()).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UndefinedVariable {
                name: "missing".to_string(),
                start: 7,
                end: 20,
                span: (7, 13).into(),
            }
        );
    }

    #[test]
    fn test_unterminated() {
        let err = render_template("SELECT {{ x", &vars(&[("x", "1")])).unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnterminatedTemplate {
                start: 7,
                span: (7, 2).into(),
            }
        );
    }

    #[test]
    fn test_positions_after_placeholder_are_shifted_back() {
        let query = "SELECT * FROM {{ t }} UNION SELECT 1";
        let results = validate_with_templated_vars(
            &chain(),
            query,
            0,
            0,
            &vars(&[("t", "a_much_longer_table_name")]),
        )
        .unwrap();

        let spans: Vec<(usize, usize)> = results.iter().map(|r| (r.start_ch, r.end_ch)).collect();
        assert_eq!(spans, vec![(7, 8), (22, 27)]);
    }

    #[test]
    fn test_positions_inside_substitution_cover_placeholder() {
        let query = "SELECT {{ cols }} FROM t";
        let results =
            validate_with_templated_vars(&chain(), query, 0, 0, &vars(&[("cols", "*")])).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].start_ch, results[0].end_ch), (7, 17));
    }

    #[test]
    fn test_multiline_substitution_maps_lines() {
        let query = "SELECT {{ cols }}\nUNION SELECT 1";
        let results =
            validate_with_templated_vars(&chain(), query, 0, 0, &vars(&[("cols", "a,\nb")])).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!((results[0].start_line, results[0].start_ch), (1, 0));
        assert_eq!((results[0].end_line, results[0].end_ch), (1, 5));
    }

    #[test]
    fn test_render_failure_is_reported_as_general_error() {
        let results =
            validate_with_templated_vars(&chain(), "SELECT {{ missing }}", 0, 0, &TemplateVars::new())
                .unwrap();
        assert_eq!(results.len(), 1);
        let result = &results[0];
        assert_eq!(result.severity, Severity::Error);
        assert_eq!(result.category, ResultCategory::General);
        assert_eq!((result.start_ch, result.end_ch), (7, 20));
        assert!(result.message.contains("missing"));
    }

    #[test]
    fn test_tokenize_error_reported_against_template() {
        let query = "SELECT {{ cols }},\n  'oops";
        let err = validate_with_templated_vars(
            &chain(),
            query,
            0,
            0,
            &vars(&[("cols", "a_long_column, another_column")]),
        )
        .unwrap_err();

        let ValidationError::Tokenize { line, column, span, .. } = err else {
            panic!("expected a tokenize error, got {err:?}");
        };
        // Line 2 is untouched by the substitution
        assert_eq!(line, 2);
        assert!(column >= 3);
        let span = span.expect("location inside the template");
        assert!(span.offset() >= query.find('\'').unwrap());
        assert!(span.offset() <= query.len());
    }

    /// Reports a finding whose end column is far past any line
    struct Overreach;

    impl Validator for Overreach {
        fn name(&self) -> &str {
            "overreach"
        }

        fn validate(&self, _ctx: &ValidationContext<'_>) -> Result<Vec<ValidationResult>> {
            Ok(vec![ValidationResult {
                start_line: 0,
                start_ch: 0,
                end_line: 0,
                end_ch: usize::MAX,
                severity: Severity::Warning,
                message: "x".to_string(),
                category: ResultCategory::Lint,
                suggestion: None,
                code: None,
            }])
        }
    }

    #[test]
    fn test_result_past_line_end_is_rejected() {
        let err = validate_with_templated_vars(
            &Overreach,
            "SELECT {{ c }}",
            0,
            0,
            &vars(&[("c", "1")]),
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCoordinate { .. }));
    }
}
