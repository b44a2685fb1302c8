//! Syntax errors produced by the lexer and parser.

use std::fmt;

use crate::Span;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SyntaxErrorKind {
    /// E15
    InvalidExpression(String),
    /// E114 / E115
    MissingQuote(String),
    /// E488
    TrailingCharacters(String),
    /// E697
    MissingListEnd,
    /// E723
    MissingDictEnd,
    /// E720
    MissingColon,
    /// E110
    MissingParen,
    /// E111
    MissingBracket,
    /// E475: left side of `:let` or operand of `:unlet` is not assignable
    InvalidTarget(String),
}

/// A lexing or parsing failure with the offending span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SyntaxError {
    pub kind: SyntaxErrorKind,
    pub span: Span,
}

impl SyntaxError {
    pub fn new(kind: SyntaxErrorKind, span: Span) -> Self {
        SyntaxError { kind, span }
    }

    #[cold]
    pub fn invalid_expression(source: &str, span: Span) -> Self {
        Self::new(
            SyntaxErrorKind::InvalidExpression(source.trim().to_string()),
            span,
        )
    }

    #[cold]
    pub fn trailing(rest: &str, span: Span) -> Self {
        Self::new(
            SyntaxErrorKind::TrailingCharacters(rest.trim().to_string()),
            span,
        )
    }
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            SyntaxErrorKind::InvalidExpression(src) => {
                write!(f, "E15: Invalid expression: \"{src}\"")
            }
            SyntaxErrorKind::MissingQuote(src) => write!(f, "E114: Missing quote: {src}"),
            SyntaxErrorKind::TrailingCharacters(rest) => {
                write!(f, "E488: Trailing characters: {rest}")
            }
            SyntaxErrorKind::MissingListEnd => f.write_str("E697: Missing end of List ']'"),
            SyntaxErrorKind::MissingDictEnd => {
                f.write_str("E723: Missing end of Dictionary '}'")
            }
            SyntaxErrorKind::MissingColon => f.write_str("E720: Missing colon in Dictionary"),
            SyntaxErrorKind::MissingParen => f.write_str("E110: Missing ')'"),
            SyntaxErrorKind::MissingBracket => f.write_str("E111: Missing ']'"),
            SyntaxErrorKind::InvalidTarget(src) => write!(f, "E475: Invalid argument: {src}"),
        }
    }
}

impl std::error::Error for SyntaxError {}
