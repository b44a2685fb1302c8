//! Lexer for Vim script expressions using logos.
//!
//! Raw tokens come from the logos DFA; [`tokenize`] converts them into
//! [`Token`]s carrying decoded payloads (numbers, cooked strings, scoped
//! names) so the parser never looks at source text again.

use std::rc::Rc;

use logos::Logos;

use crate::ast::{AssignOp, BinaryOp, CaseMode, ScopeKind};
use crate::{Span, SyntaxError, SyntaxErrorKind};

/// Raw token from logos (before payload decoding).
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n]+")]
enum RawToken {
    // === Literals ===
    #[regex(r"[0-9]+\.[0-9]+([eE][+-]?[0-9]+)?")]
    Float,
    #[regex(r"0[xX][0-9a-fA-F]+|0[bB][01]+|0[oO][0-7]+|[0-9]+")]
    Number,
    #[regex(r"0[zZ][0-9a-fA-F.]*")]
    Blob,
    #[regex(r"'([^']|'')*'")]
    SingleQuoted,
    #[regex(r#""([^"\\]|\\.)*""#)]
    DoubleQuoted,

    // === Names ===
    #[regex(r"[gbwtslav]:[a-zA-Z0-9_#]*")]
    Scoped,
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*(#[a-zA-Z0-9_]+)*")]
    Name,
    #[regex(r"&([lg]:)?[a-zA-Z]+")]
    OptionRef,
    #[regex(r"\$[a-zA-Z_][a-zA-Z0-9_]*")]
    EnvRef,

    // === Keyword comparisons ===
    #[token("is")]
    Is,
    #[token("is#")]
    IsCase,
    #[token("is?")]
    IsIcase,
    #[token("isnot")]
    IsNot,
    #[token("isnot#")]
    IsNotCase,
    #[token("isnot?")]
    IsNotIcase,

    // === Symbols ===
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,
    #[token("{")]
    LBrace,
    #[token("#{")]
    HashBrace,
    #[token("}")]
    RBrace,
    #[token(",")]
    Comma,
    #[token(":")]
    Colon,
    #[token(";")]
    Semicolon,
    #[token("?")]
    Question,
    #[token("??")]
    QuestionQuestion,
    #[token("->")]
    Arrow,
    #[token(".")]
    Dot,
    #[token("..")]
    DotDot,

    // === Operators ===
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,
    #[token("!")]
    Bang,
    #[token("&&")]
    AmpAmp,
    #[token("||")]
    PipePipe,
    #[token("<<")]
    Shl,
    #[token(">>")]
    Shr,
    #[token("==")]
    EqEq,
    #[token("==#")]
    EqEqCase,
    #[token("==?")]
    EqEqIcase,
    #[token("!=")]
    NotEq,
    #[token("!=#")]
    NotEqCase,
    #[token("!=?")]
    NotEqIcase,
    #[token("<")]
    Lt,
    #[token("<#")]
    LtCase,
    #[token("<?")]
    LtIcase,
    #[token("<=")]
    LtEq,
    #[token("<=#")]
    LtEqCase,
    #[token("<=?")]
    LtEqIcase,
    #[token(">")]
    Gt,
    #[token(">#")]
    GtCase,
    #[token(">?")]
    GtIcase,
    #[token(">=")]
    GtEq,
    #[token(">=#")]
    GtEqCase,
    #[token(">=?")]
    GtEqIcase,
    #[token("=~")]
    Match,
    #[token("=~#")]
    MatchCase,
    #[token("=~?")]
    MatchIcase,
    #[token("!~")]
    NoMatch,
    #[token("!~#")]
    NoMatchCase,
    #[token("!~?")]
    NoMatchIcase,

    // === Assignment ===
    #[token("=")]
    Assign,
    #[token("+=")]
    PlusAssign,
    #[token("-=")]
    MinusAssign,
    #[token("*=")]
    StarAssign,
    #[token("/=")]
    SlashAssign,
    #[token("%=")]
    PercentAssign,
    #[token(".=")]
    DotAssign,
    #[token("..=")]
    DotDotAssign,
}

/// Token with decoded payload.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    Number(i64),
    Float(f64),
    String(Rc<str>),
    Blob(Rc<[u8]>),
    Name(Rc<str>),
    /// `g:name`; an empty name is the scope dictionary itself.
    Scoped(ScopeKind, Rc<str>),
    Option(Rc<str>),
    Env(Rc<str>),

    LParen,
    RParen,
    LBracket,
    RBracket,
    LBrace,
    HashBrace,
    RBrace,
    Comma,
    Colon,
    Semicolon,
    Question,
    QuestionQuestion,
    Arrow,
    Dot,
    DotDot,

    Plus,
    Minus,
    Star,
    Slash,
    Percent,
    Bang,
    AmpAmp,
    PipePipe,
    Shl,
    Shr,
    /// Any comparison operator, case mode included.
    Compare(BinaryOp),
    Assign(AssignOp),
}

#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

/// Tokenize one expression or `:let` argument.
pub fn tokenize(source: &str) -> Result<Vec<Token>, SyntaxError> {
    let mut lexer = RawToken::lexer(source);
    let mut tokens = Vec::new();
    while let Some(raw) = lexer.next() {
        let span = Span::from_range(lexer.span());
        let slice = lexer.slice();
        let Ok(raw) = raw else {
            return Err(lex_error(source, span));
        };
        let kind = convert(raw, slice, source, span)?;
        tokens.push(Token { kind, span });
    }
    Ok(tokens)
}

#[cold]
fn lex_error(source: &str, span: Span) -> SyntaxError {
    let rest = source.get(span.start as usize..).unwrap_or("");
    if rest.starts_with('"') || rest.starts_with('\'') {
        SyntaxError::new(SyntaxErrorKind::MissingQuote(rest.to_string()), span)
    } else {
        SyntaxError::invalid_expression(rest, span)
    }
}

fn convert(raw: RawToken, slice: &str, source: &str, span: Span) -> Result<TokenKind, SyntaxError> {
    let compare = |op: fn(CaseMode) -> BinaryOp, case| -> Result<TokenKind, SyntaxError> {
        Ok(TokenKind::Compare(op(case)))
    };
    match raw {
        RawToken::Float => slice
            .parse::<f64>()
            .map(TokenKind::Float)
            .map_err(|_| SyntaxError::invalid_expression(slice, span)),
        RawToken::Number => Ok(TokenKind::Number(parse_number_literal(slice))),
        RawToken::Blob => parse_blob_literal(slice)
            .map(|bytes| TokenKind::Blob(bytes.into()))
            .ok_or_else(|| SyntaxError::invalid_expression(slice, span)),
        RawToken::SingleQuoted => Ok(TokenKind::String(cook_single_quoted(slice).into())),
        RawToken::DoubleQuoted => Ok(TokenKind::String(cook_double_quoted(slice).into())),
        RawToken::Scoped => {
            let mut chars = slice.chars();
            let scope = chars
                .next()
                .and_then(ScopeKind::from_char)
                .ok_or_else(|| SyntaxError::invalid_expression(source, span))?;
            Ok(TokenKind::Scoped(scope, slice.get(2..).unwrap_or("").into()))
        }
        RawToken::Name => Ok(TokenKind::Name(slice.into())),
        RawToken::OptionRef => Ok(TokenKind::Option(slice.get(1..).unwrap_or("").into())),
        RawToken::EnvRef => Ok(TokenKind::Env(slice.get(1..).unwrap_or("").into())),

        RawToken::Is => compare(BinaryOp::Is, CaseMode::Default),
        RawToken::IsCase => compare(BinaryOp::Is, CaseMode::MatchCase),
        RawToken::IsIcase => compare(BinaryOp::Is, CaseMode::IgnoreCase),
        RawToken::IsNot => compare(BinaryOp::IsNot, CaseMode::Default),
        RawToken::IsNotCase => compare(BinaryOp::IsNot, CaseMode::MatchCase),
        RawToken::IsNotIcase => compare(BinaryOp::IsNot, CaseMode::IgnoreCase),

        RawToken::LParen => Ok(TokenKind::LParen),
        RawToken::RParen => Ok(TokenKind::RParen),
        RawToken::LBracket => Ok(TokenKind::LBracket),
        RawToken::RBracket => Ok(TokenKind::RBracket),
        RawToken::LBrace => Ok(TokenKind::LBrace),
        RawToken::HashBrace => Ok(TokenKind::HashBrace),
        RawToken::RBrace => Ok(TokenKind::RBrace),
        RawToken::Comma => Ok(TokenKind::Comma),
        RawToken::Colon => Ok(TokenKind::Colon),
        RawToken::Semicolon => Ok(TokenKind::Semicolon),
        RawToken::Question => Ok(TokenKind::Question),
        RawToken::QuestionQuestion => Ok(TokenKind::QuestionQuestion),
        RawToken::Arrow => Ok(TokenKind::Arrow),
        RawToken::Dot => Ok(TokenKind::Dot),
        RawToken::DotDot => Ok(TokenKind::DotDot),

        RawToken::Plus => Ok(TokenKind::Plus),
        RawToken::Minus => Ok(TokenKind::Minus),
        RawToken::Star => Ok(TokenKind::Star),
        RawToken::Slash => Ok(TokenKind::Slash),
        RawToken::Percent => Ok(TokenKind::Percent),
        RawToken::Bang => Ok(TokenKind::Bang),
        RawToken::AmpAmp => Ok(TokenKind::AmpAmp),
        RawToken::PipePipe => Ok(TokenKind::PipePipe),
        RawToken::Shl => Ok(TokenKind::Shl),
        RawToken::Shr => Ok(TokenKind::Shr),

        RawToken::EqEq => compare(BinaryOp::Eq, CaseMode::Default),
        RawToken::EqEqCase => compare(BinaryOp::Eq, CaseMode::MatchCase),
        RawToken::EqEqIcase => compare(BinaryOp::Eq, CaseMode::IgnoreCase),
        RawToken::NotEq => compare(BinaryOp::NotEq, CaseMode::Default),
        RawToken::NotEqCase => compare(BinaryOp::NotEq, CaseMode::MatchCase),
        RawToken::NotEqIcase => compare(BinaryOp::NotEq, CaseMode::IgnoreCase),
        RawToken::Lt => compare(BinaryOp::Lt, CaseMode::Default),
        RawToken::LtCase => compare(BinaryOp::Lt, CaseMode::MatchCase),
        RawToken::LtIcase => compare(BinaryOp::Lt, CaseMode::IgnoreCase),
        RawToken::LtEq => compare(BinaryOp::LtEq, CaseMode::Default),
        RawToken::LtEqCase => compare(BinaryOp::LtEq, CaseMode::MatchCase),
        RawToken::LtEqIcase => compare(BinaryOp::LtEq, CaseMode::IgnoreCase),
        RawToken::Gt => compare(BinaryOp::Gt, CaseMode::Default),
        RawToken::GtCase => compare(BinaryOp::Gt, CaseMode::MatchCase),
        RawToken::GtIcase => compare(BinaryOp::Gt, CaseMode::IgnoreCase),
        RawToken::GtEq => compare(BinaryOp::GtEq, CaseMode::Default),
        RawToken::GtEqCase => compare(BinaryOp::GtEq, CaseMode::MatchCase),
        RawToken::GtEqIcase => compare(BinaryOp::GtEq, CaseMode::IgnoreCase),
        RawToken::Match => compare(BinaryOp::Match, CaseMode::Default),
        RawToken::MatchCase => compare(BinaryOp::Match, CaseMode::MatchCase),
        RawToken::MatchIcase => compare(BinaryOp::Match, CaseMode::IgnoreCase),
        RawToken::NoMatch => compare(BinaryOp::NoMatch, CaseMode::Default),
        RawToken::NoMatchCase => compare(BinaryOp::NoMatch, CaseMode::MatchCase),
        RawToken::NoMatchIcase => compare(BinaryOp::NoMatch, CaseMode::IgnoreCase),

        RawToken::Assign => Ok(TokenKind::Assign(AssignOp::Assign)),
        RawToken::PlusAssign => Ok(TokenKind::Assign(AssignOp::Add)),
        RawToken::MinusAssign => Ok(TokenKind::Assign(AssignOp::Sub)),
        RawToken::StarAssign => Ok(TokenKind::Assign(AssignOp::Mul)),
        RawToken::SlashAssign => Ok(TokenKind::Assign(AssignOp::Div)),
        RawToken::PercentAssign => Ok(TokenKind::Assign(AssignOp::Mod)),
        RawToken::DotAssign | RawToken::DotDotAssign => Ok(TokenKind::Assign(AssignOp::Concat)),
    }
}

/// Decode a number literal. A leading `0` followed only by octal digits is
/// octal; values beyond `i64` saturate.
pub fn parse_number_literal(text: &str) -> i64 {
    let (digits, radix) = if let Some(hex) = text
        .strip_prefix("0x")
        .or_else(|| text.strip_prefix("0X"))
    {
        (hex, 16)
    } else if let Some(bin) = text
        .strip_prefix("0b")
        .or_else(|| text.strip_prefix("0B"))
    {
        (bin, 2)
    } else if let Some(oct) = text
        .strip_prefix("0o")
        .or_else(|| text.strip_prefix("0O"))
    {
        (oct, 8)
    } else if text.len() > 1 && text.starts_with('0') && text.bytes().all(|b| (b'0'..=b'7').contains(&b)) {
        (&text[1..], 8)
    } else {
        (text, 10)
    };
    let mut value: i64 = 0;
    for c in digits.chars() {
        let Some(d) = c.to_digit(radix) else { break };
        value = value
            .saturating_mul(i64::from(radix))
            .saturating_add(i64::from(d));
    }
    value
}

/// `0zFF00.ED01` -> bytes; `None` for an odd number of hex digits.
fn parse_blob_literal(text: &str) -> Option<Vec<u8>> {
    let hex: Vec<u32> = text
        .get(2..)?
        .chars()
        .filter(|c| *c != '.')
        .map(|c| c.to_digit(16))
        .collect::<Option<_>>()?;
    if hex.len() % 2 != 0 {
        return None;
    }
    hex.chunks(2)
        .map(|pair| u8::try_from(pair[0] * 16 + pair[1]).ok())
        .collect()
}

/// `'it''s'` -> `it's`
fn cook_single_quoted(slice: &str) -> String {
    let inner = slice
        .get(1..slice.len().saturating_sub(1))
        .unwrap_or("");
    inner.replace("''", "'")
}

/// Process backslash escapes of a double-quoted string.
fn cook_double_quoted(slice: &str) -> String {
    let inner = slice
        .get(1..slice.len().saturating_sub(1))
        .unwrap_or("");
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        let Some(esc) = chars.next() else {
            out.push('\\');
            break;
        };
        match esc {
            'n' => out.push('\n'),
            't' => out.push('\t'),
            'r' => out.push('\r'),
            'e' => out.push('\u{1b}'),
            'b' => out.push('\u{8}'),
            'f' => out.push('\u{c}'),
            'x' | 'X' | 'u' | 'U' => {
                let max = match esc {
                    'x' | 'X' => 2,
                    'u' => 4,
                    _ => 8,
                };
                let code = take_digits(&mut chars, 16, max).map(|(value, _)| value);
                match code.and_then(char::from_u32) {
                    Some(ch) => out.push(ch),
                    None => out.push(esc),
                }
            }
            '0'..='7' => {
                let mut code = esc.to_digit(8).unwrap_or(0);
                if let Some((rest, count)) = take_digits(&mut chars, 8, 2) {
                    code = code * 8u32.pow(count) + rest;
                }
                out.push(char::from_u32(code).unwrap_or('\u{fffd}'));
            }
            '<' => {
                let mut name = String::new();
                let mut closed = false;
                while let Some(&next) = chars.peek() {
                    chars.next();
                    if next == '>' {
                        closed = true;
                        break;
                    }
                    name.push(next);
                }
                match special_key(&name).filter(|_| closed) {
                    Some(ch) => out.push(ch),
                    None => {
                        out.push('<');
                        out.push_str(&name);
                        if closed {
                            out.push('>');
                        }
                    }
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Consume up to `max` digits; returns the value and the digit count.
fn take_digits(
    chars: &mut std::iter::Peekable<std::str::Chars<'_>>,
    radix: u32,
    max: u32,
) -> Option<(u32, u32)> {
    let mut value = 0u32;
    let mut count = 0u32;
    while count < max {
        let Some(d) = chars.peek().and_then(|c| c.to_digit(radix)) else {
            break;
        };
        chars.next();
        value = value.saturating_mul(radix).saturating_add(d);
        count += 1;
    }
    (count > 0).then_some((value, count))
}

fn special_key(name: &str) -> Option<char> {
    match name.to_ascii_lowercase().as_str() {
        "esc" => Some('\u{1b}'),
        "cr" | "return" | "enter" => Some('\r'),
        "nl" | "newline" | "lf" | "linefeed" => Some('\n'),
        "tab" => Some('\t'),
        "space" => Some(' '),
        "bs" | "backspace" => Some('\u{8}'),
        "lt" => Some('<'),
        "bslash" => Some('\\'),
        "bar" => Some('|'),
        _ => None,
    }
}
