//! Translation of Vim regular expressions into `regex`-crate syntax.
//!
//! Supports the magic levels `\v`, `\m` (default), `\M` and `\V`, groups,
//! alternation, the common quantifiers, word boundaries, character classes
//! and the `\c`/`\C` case overrides. The result is a plain pattern string;
//! compiling it is up to the caller.

use std::fmt;

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
enum Magic {
    VeryMagic,
    Magic,
    NoMagic,
    VeryNoMagic,
}

impl Magic {
    /// Whether `c` acts as an operator when written without a backslash.
    fn is_bare_operator(self, c: char) -> bool {
        match self {
            Magic::VeryMagic => matches!(
                c,
                '(' | ')' | '|' | '+' | '?' | '=' | '{' | '<' | '>' | '.' | '*' | '[' | '~' | '^' | '$' | '@' | '%'
            ),
            Magic::Magic => matches!(c, '.' | '*' | '[' | '~' | '^' | '$'),
            Magic::NoMagic => matches!(c, '^' | '$'),
            Magic::VeryNoMagic => false,
        }
    }
}

/// Vim pattern converted for the `regex` crate.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TranslatedPattern {
    pub regex: String,
    /// `Some(true)` for `\c`, `Some(false)` for `\C`.
    pub ignore_case: Option<bool>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PatternError {
    TrailingBackslash,
    UnmatchedBrace,
    UnmatchedBracket,
}

impl fmt::Display for PatternError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PatternError::TrailingBackslash => f.write_str("E10: \\ should be followed by /, ? or &"),
            PatternError::UnmatchedBrace => f.write_str("E554: Syntax error in \\{...}"),
            PatternError::UnmatchedBracket => f.write_str("E769: Missing ] after ["),
        }
    }
}

impl std::error::Error for PatternError {}

/// Translate a Vim pattern.
pub fn translate(pattern: &str) -> Result<TranslatedPattern, PatternError> {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut ignore_case = None;
    let mut magic = Magic::Magic;
    let chars: Vec<char> = pattern.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        i += 1;
        let escaped = c == '\\';
        let c = if escaped {
            let Some(&next) = chars.get(i) else {
                return Err(PatternError::TrailingBackslash);
            };
            i += 1;
            next
        } else {
            c
        };

        if escaped {
            match c {
                'c' => {
                    ignore_case = Some(true);
                    continue;
                }
                'C' => {
                    ignore_case = Some(false);
                    continue;
                }
                'v' => {
                    magic = Magic::VeryMagic;
                    continue;
                }
                'm' => {
                    magic = Magic::Magic;
                    continue;
                }
                'M' => {
                    magic = Magic::NoMagic;
                    continue;
                }
                'V' => {
                    magic = Magic::VeryNoMagic;
                    continue;
                }
                's' | 'S' | 'd' | 'D' | 'w' | 'W' => {
                    out.push('\\');
                    out.push(c);
                    continue;
                }
                'a' => {
                    out.push_str("[A-Za-z]");
                    continue;
                }
                'l' => {
                    out.push_str("[a-z]");
                    continue;
                }
                'u' => {
                    out.push_str("[A-Z]");
                    continue;
                }
                'x' => {
                    out.push_str("[0-9A-Fa-f]");
                    continue;
                }
                'h' => {
                    out.push_str("[A-Za-z_]");
                    continue;
                }
                'n' => {
                    out.push_str("\\n");
                    continue;
                }
                't' => {
                    out.push_str("\\t");
                    continue;
                }
                'e' => {
                    out.push_str("\\x1b");
                    continue;
                }
                _ => {}
            }
        }

        // An operator is a bare char the current level treats as special,
        // or an escaped char it does not.
        let operator = escaped != magic.is_bare_operator(c);
        if !operator {
            push_literal(&mut out, c);
            continue;
        }
        match c {
            '(' => {
                out.push('(');
            }
            '%' if chars.get(i) == Some(&'(') => {
                i += 1;
                out.push_str("(?:");
            }
            ')' => out.push(')'),
            '|' => out.push('|'),
            '+' => out.push('+'),
            '=' | '?' => out.push('?'),
            '<' | '>' => out.push_str("\\b"),
            '.' => out.push('.'),
            '*' => out.push('*'),
            '^' => out.push('^'),
            '$' => out.push('$'),
            '~' => push_literal(&mut out, '~'),
            '{' => {
                i = translate_brace(&chars, i, &mut out)?;
            }
            '[' => {
                i = translate_class(&chars, i, &mut out)?;
            }
            other => push_literal(&mut out, other),
        }
    }
    Ok(TranslatedPattern {
        regex: out,
        ignore_case,
    })
}

fn push_literal(out: &mut String, c: char) {
    if "\\.+*?()|[]{}^$#&-~".contains(c) {
        out.push('\\');
    }
    out.push(c);
}

/// `\{n,m}`, `\{-n,m}` (lazy), `\{}`; returns the index after the `}`.
fn translate_brace(chars: &[char], start: usize, out: &mut String) -> Result<usize, PatternError> {
    let mut i = start;
    let lazy = chars.get(i) == Some(&'-');
    if lazy {
        i += 1;
    }
    let mut body = String::new();
    loop {
        match chars.get(i) {
            Some('}') => {
                i += 1;
                break;
            }
            // `\}` closes too
            Some('\\') if chars.get(i + 1) == Some(&'}') => {
                i += 2;
                break;
            }
            Some(c) if c.is_ascii_digit() || *c == ',' => {
                body.push(*c);
                i += 1;
            }
            _ => return Err(PatternError::UnmatchedBrace),
        }
    }
    match body.as_str() {
        "" | "," => out.push('*'),
        _ if body.starts_with(',') => {
            out.push_str("{0");
            out.push_str(&body);
            out.push('}');
        }
        _ => {
            out.push('{');
            out.push_str(&body);
            out.push('}');
        }
    }
    if lazy {
        out.push('?');
    }
    Ok(i)
}

/// `[...]` collection; returns the index after the closing `]`.
fn translate_class(chars: &[char], start: usize, out: &mut String) -> Result<usize, PatternError> {
    let mut i = start;
    out.push('[');
    if chars.get(i) == Some(&'^') {
        out.push('^');
        i += 1;
    }
    // A leading `]` is literal.
    if chars.get(i) == Some(&']') {
        out.push_str("\\]");
        i += 1;
    }
    loop {
        match chars.get(i) {
            None => return Err(PatternError::UnmatchedBracket),
            Some(']') => {
                out.push(']');
                return Ok(i + 1);
            }
            Some('\\') => {
                match chars.get(i + 1) {
                    Some('n') => out.push_str("\\n"),
                    Some('t') => out.push_str("\\t"),
                    Some(c) => {
                        out.push('\\');
                        out.push(*c);
                    }
                    None => return Err(PatternError::UnmatchedBracket),
                }
                i += 2;
            }
            Some(c @ ('[' | '&' | '~')) => {
                out.push('\\');
                out.push(*c);
                i += 1;
            }
            Some(c) => {
                out.push(*c);
                i += 1;
            }
        }
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn regex(p: &str) -> String {
        translate(p).unwrap().regex
    }

    #[test]
    fn magic_groups_and_alternation() {
        assert_eq!(regex(r"\(foo\|bar\)\+"), "(foo|bar)+");
        assert_eq!(regex(r"a\{2,3}"), "a{2,3}");
        assert_eq!(regex(r"a\{-}"), "a*?");
        assert_eq!(regex(r"\<word\>"), r"\bword\b");
    }

    #[test]
    fn bare_parens_are_literal_in_magic_mode() {
        assert_eq!(regex("f(x)+1"), r"f\(x\)\+1");
        assert_eq!(regex("^a.*b$"), "^a.*b$");
    }

    #[test]
    fn very_magic() {
        assert_eq!(regex(r"\v(a|b)+"), "(a|b)+");
        assert_eq!(regex(r"\va\{1}"), r"a\{1\}");
    }

    #[test]
    fn very_nomagic_is_literal() {
        assert_eq!(regex(r"\Va.b"), r"a\.b");
    }

    #[test]
    fn case_flags() {
        assert_eq!(translate(r"\cFoo").unwrap().ignore_case, Some(true));
        assert_eq!(translate(r"Foo\C").unwrap().ignore_case, Some(false));
        assert_eq!(translate("Foo").unwrap().ignore_case, None);
    }

    #[test]
    fn collections() {
        assert_eq!(regex("[abc]"), "[abc]");
        assert_eq!(regex("[^]x]"), r"[^\]x]");
        assert_eq!(regex("[[]"), r"[\[]");
        assert_eq!(translate("[abc"), Err(PatternError::UnmatchedBracket));
    }

    #[test]
    fn trailing_backslash() {
        assert_eq!(translate("abc\\"), Err(PatternError::TrailingBackslash));
    }
}
