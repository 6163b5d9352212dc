//! Tokens and the tokenizer capability injected into validators

mod sql;

use serde::Serialize;

use crate::error::Result;

pub use sql::SqlTokenizer;

/// Coarse classification of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    QuotedIdentifier,
    Number,
    String,
    Placeholder,
    Comment,
    Whitespace,
    Punctuation,
    Operator,
}

/// A token with its position in the query text
///
/// `start` and `end` are character offsets, `end` exclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Token {
    pub kind: TokenKind,
    pub start: usize,
    pub end: usize,
    pub text: String,
}

impl Token {
    pub fn new(kind: TokenKind, start: usize, end: usize, text: impl Into<String>) -> Self {
        Self {
            kind,
            start,
            end,
            text: text.into(),
        }
    }

    /// Comments and whitespace
    pub fn is_trivia(&self) -> bool {
        matches!(self.kind, TokenKind::Comment | TokenKind::Whitespace)
    }

    /// Case-insensitive keyword match
    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.kind == TokenKind::Keyword && self.text.eq_ignore_ascii_case(keyword)
    }

    pub fn is_symbol(&self, symbol: &str) -> bool {
        matches!(self.kind, TokenKind::Punctuation | TokenKind::Operator) && self.text == symbol
    }
}

/// Tokens with trivia removed, preserving order
pub fn significant(tokens: &[Token]) -> Vec<&Token> {
    tokens.iter().filter(|t| !t.is_trivia()).collect()
}

/// Capability turning query text into an ordered token sequence
///
/// Implementations must not cache across calls and must report failure
/// instead of returning a partial sequence.
pub trait Tokenize: Send + Sync {
    fn tokenize(&self, query: &str) -> Result<Vec<Token>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keyword_match_ignores_case() {
        let token = Token::new(TokenKind::Keyword, 0, 6, "select");
        assert!(token.is_keyword("SELECT"));
        assert!(!token.is_keyword("FROM"));

        let ident = Token::new(TokenKind::Identifier, 0, 6, "select");
        assert!(!ident.is_keyword("SELECT"));
    }

    #[test]
    fn test_significant_skips_trivia() {
        let tokens = vec![
            Token::new(TokenKind::Keyword, 0, 6, "SELECT"),
            Token::new(TokenKind::Whitespace, 6, 7, " "),
            Token::new(TokenKind::Comment, 7, 14, "/* x */"),
            Token::new(TokenKind::Operator, 14, 15, "*"),
        ];
        let kept: Vec<&str> = significant(&tokens).iter().map(|t| t.text.as_str()).collect();
        assert_eq!(kept, vec!["SELECT", "*"]);
    }
}
