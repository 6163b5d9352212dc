//! Tokenizer backed by sqlparser

use sqlparser::keywords::Keyword;
use sqlparser::tokenizer::{Location, Token as SqlToken, Tokenizer, Whitespace};
use tracing::trace;

use super::{Token, TokenKind, Tokenize};
use crate::coordinate::{Coordinate, LineIndex};
use crate::dialect::SqlDialect;
use crate::error::{char_span, Result, ValidationError};

/// Tokenizes queries with sqlparser's lexer for a given dialect
#[derive(Debug, Clone, Copy, Default)]
pub struct SqlTokenizer {
    dialect: SqlDialect,
}

impl SqlTokenizer {
    pub fn new(dialect: SqlDialect) -> Self {
        Self { dialect }
    }
}

impl Tokenize for SqlTokenizer {
    fn tokenize(&self, query: &str) -> Result<Vec<Token>> {
        let dialect = self.dialect.tokenizer_dialect();
        // sqlparser reports 1-indexed line/column spans; convert them back
        // into character offsets and slice the raw text out of the query.
        let lines = LineIndex::new(query);
        let spanned = Tokenizer::new(dialect.as_ref(), query)
            .tokenize_with_location()
            .map_err(|e| {
                let span = char_offset(&lines, e.location)
                    .ok()
                    .map(|at| char_span(query, at, at));
                ValidationError::Tokenize {
                    message: e.message,
                    line: e.location.line,
                    column: e.location.column,
                    span,
                }
            })?;

        let byte_at: Vec<usize> = query
            .char_indices()
            .map(|(byte, _)| byte)
            .chain(std::iter::once(query.len()))
            .collect();

        let mut tokens = Vec::with_capacity(spanned.len());
        for item in spanned {
            let Some(kind) = classify(&item.token) else {
                continue;
            };
            let start = char_offset(&lines, item.span.start)?;
            let end = char_offset(&lines, item.span.end)?;
            tokens.push(Token::new(
                kind,
                start,
                end,
                &query[byte_at[start]..byte_at[end]],
            ));
        }

        trace!(dialect = %self.dialect, count = tokens.len(), "tokenized query");
        Ok(tokens)
    }
}

fn char_offset(lines: &LineIndex, location: Location) -> Result<usize> {
    lines.offset(Coordinate::new(
        location.line.saturating_sub(1) as usize,
        location.column.saturating_sub(1) as usize,
    ))
}

fn classify(token: &SqlToken) -> Option<TokenKind> {
    let kind = match token {
        SqlToken::EOF => return None,
        SqlToken::Word(word) if word.quote_style.is_some() => TokenKind::QuotedIdentifier,
        SqlToken::Word(word) if word.keyword == Keyword::NoKeyword => TokenKind::Identifier,
        SqlToken::Word(_) => TokenKind::Keyword,
        SqlToken::Number(..) => TokenKind::Number,
        SqlToken::SingleQuotedString(_)
        | SqlToken::DoubleQuotedString(_)
        | SqlToken::NationalStringLiteral(_)
        | SqlToken::EscapedStringLiteral(_)
        | SqlToken::HexStringLiteral(_)
        | SqlToken::DollarQuotedString(_) => TokenKind::String,
        SqlToken::Placeholder(_) => TokenKind::Placeholder,
        SqlToken::Whitespace(Whitespace::SingleLineComment { .. })
        | SqlToken::Whitespace(Whitespace::MultiLineComment(_)) => TokenKind::Comment,
        SqlToken::Whitespace(_) => TokenKind::Whitespace,
        SqlToken::Comma
        | SqlToken::Period
        | SqlToken::SemiColon
        | SqlToken::LParen
        | SqlToken::RParen
        | SqlToken::LBracket
        | SqlToken::RBracket
        | SqlToken::LBrace
        | SqlToken::RBrace
        | SqlToken::Colon
        | SqlToken::DoubleColon => TokenKind::Punctuation,
        _ => TokenKind::Operator,
    };
    Some(kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds_and_text(query: &str) -> Vec<(TokenKind, String)> {
        SqlTokenizer::default()
            .tokenize(query)
            .unwrap()
            .into_iter()
            .filter(|t| !t.is_trivia())
            .map(|t| (t.kind, t.text))
            .collect()
    }

    #[test]
    fn test_tokenize_simple_select() {
        let tokens = kinds_and_text("SELECT * FROM t_users WHERE user_id = 1");
        assert_eq!(
            tokens,
            vec![
                (TokenKind::Keyword, "SELECT".to_string()),
                (TokenKind::Operator, "*".to_string()),
                (TokenKind::Keyword, "FROM".to_string()),
                (TokenKind::Identifier, "t_users".to_string()),
                (TokenKind::Keyword, "WHERE".to_string()),
                (TokenKind::Identifier, "user_id".to_string()),
                (TokenKind::Operator, "=".to_string()),
                (TokenKind::Number, "1".to_string()),
            ]
        );
    }

    #[test]
    fn test_offsets_cover_query() {
        let query = "SELECT a,\n  \"b\" -- note\nFROM t;";
        let tokens = SqlTokenizer::default().tokenize(query).unwrap();

        // Contiguous and slice-exact
        let mut expected_start = 0;
        for token in &tokens {
            assert_eq!(token.start, expected_start, "gap before {:?}", token);
            expected_start = token.end;
        }
        assert_eq!(expected_start, query.chars().count());
        let rebuilt: String = tokens.iter().map(|t| t.text.as_str()).collect();
        assert_eq!(rebuilt, query);
    }

    #[test]
    fn test_offsets_are_characters() {
        let query = "SELECT 'é', x";
        let tokens = SqlTokenizer::default().tokenize(query).unwrap();
        let x = tokens.iter().find(|t| t.text == "x").unwrap();
        assert_eq!((x.start, x.end), (12, 13));

        let literal = tokens.iter().find(|t| t.kind == TokenKind::String).unwrap();
        assert_eq!(literal.text, "'é'");
        assert_eq!((literal.start, literal.end), (7, 10));
    }

    #[test]
    fn test_quoted_identifier_and_comment() {
        let tokens = SqlTokenizer::default()
            .tokenize("SELECT \"Name\" /* c */ FROM t")
            .unwrap();
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::QuotedIdentifier && t.text == "\"Name\""));
        assert!(tokens
            .iter()
            .any(|t| t.kind == TokenKind::Comment && t.text == "/* c */"));
    }

    #[test]
    fn test_unterminated_string_fails() {
        let err = SqlTokenizer::default()
            .tokenize("SELECT 'oops")
            .unwrap_err();
        assert!(matches!(err, ValidationError::Tokenize { line: 1, .. }));
    }

    #[test]
    fn test_tokenize_error_points_into_query() {
        let query = "SELECT 1,\n  'oops";
        let Err(ValidationError::Tokenize { line, span, .. }) = SqlTokenizer::default().tokenize(query)
        else {
            panic!("expected a tokenize error");
        };
        assert_eq!(line, 2);
        let span = span.expect("location inside the query");
        assert!(span.offset() >= query.find('\n').unwrap());
        assert!(span.offset() <= query.len());
    }
}
