//! Implicit conversions.
//!
//! Number and String convert into each other freely. Float widens from
//! Number but never converts from or to String implicitly. Containers and
//! Funcrefs never convert: each refused conversion has its own
//! [`CoercionKind`](crate::CoercionKind).

use std::rc::Rc;

use crate::errors::{coercion, EvalError};
use crate::{CoercionKind, Value, VimInt};

/// Leading integer of a string, the way Vim reads `"12abc" + 0`.
///
/// Accepts an optional `-`, then `0x`/`0X` hex, `0b`/`0B` binary, `0o`/`0O`
/// or leading-zero octal, or decimal digits. Anything else yields 0. The
/// result saturates at the 32-bit bounds.
pub fn str_to_number(s: &str) -> VimInt {
    let bytes = s.as_bytes();
    let (negative, rest) = match bytes.first() {
        Some(b'-') => (true, &bytes[1..]),
        _ => (false, bytes),
    };
    let magnitude = parse_unsigned_prefix(rest);
    let signed = if negative { -magnitude } else { magnitude };
    VimInt::saturating_from_i64(signed)
}

/// Parses without sign; clamps to a little past the 32-bit range so the
/// caller can saturate.
fn parse_unsigned_prefix(bytes: &[u8]) -> i64 {
    const LIMIT: i64 = 1 << 33;
    let (radix, digits) = match bytes {
        [b'0', b'x' | b'X', d, ..] if d.is_ascii_hexdigit() => (16, &bytes[2..]),
        [b'0', b'b' | b'B', d, ..] if matches!(d, b'0' | b'1') => (2, &bytes[2..]),
        [b'0', b'o' | b'O', d, ..] if (b'0'..=b'7').contains(d) => (8, &bytes[2..]),
        [b'0', d, ..] if d.is_ascii_digit() => {
            // Leading zero means octal only when every digit is octal.
            let run = bytes.iter().take_while(|b| b.is_ascii_digit()).count();
            if bytes[..run].iter().all(|b| (b'0'..=b'7').contains(b)) {
                (8, bytes)
            } else {
                (10, bytes)
            }
        }
        _ => (10, bytes),
    };
    let mut value: i64 = 0;
    for &b in digits {
        let Some(digit) = char::from(b).to_digit(radix) else {
            break;
        };
        value = (value * i64::from(radix) + i64::from(digit)).min(LIMIT);
    }
    value
}

/// Leading float of a string, as `str2float()` reads it. Returns 0.0 when
/// no number is present.
pub fn str_to_float(s: &str) -> f64 {
    let s = s.trim_start();
    let lower = s.to_ascii_lowercase();
    for (word, value) in [("inf", f64::INFINITY), ("-inf", f64::NEG_INFINITY), ("nan", f64::NAN)] {
        if lower.starts_with(word) {
            return value;
        }
    }
    let bytes = s.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'-' | b'+')) {
        end = 1;
    }
    let int_start = end;
    while bytes.get(end).is_some_and(u8::is_ascii_digit) {
        end += 1;
    }
    if end == int_start {
        return 0.0;
    }
    if bytes.get(end) == Some(&b'.') && bytes.get(end + 1).is_some_and(u8::is_ascii_digit) {
        end += 1;
        while bytes.get(end).is_some_and(u8::is_ascii_digit) {
            end += 1;
        }
    }
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'-' | b'+')) {
            exp_end += 1;
        }
        if bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
            while bytes.get(exp_end).is_some_and(u8::is_ascii_digit) {
                exp_end += 1;
            }
            end = exp_end;
        }
    }
    s[..end].parse().unwrap_or(0.0)
}

impl Value {
    /// Number context (arithmetic, indexes, conditions).
    pub fn to_number(&self) -> Result<VimInt, EvalError> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(str_to_number(s)),
            other => Err(refused(CoercionKind::to_number(other.value_type()))),
        }
    }

    /// Float context: Numbers widen, Strings are refused.
    pub fn to_float(&self) -> Result<f64, EvalError> {
        match self {
            Value::Number(n) => Ok(n.to_f64()),
            Value::Float(f) => Ok(*f),
            other => Err(refused(CoercionKind::to_float(other.value_type()))),
        }
    }

    /// String context (`.`/`..`, keys, `:execute`).
    pub fn to_concat_string(&self) -> Result<Rc<str>, EvalError> {
        match self {
            Value::String(s) => Ok(Rc::clone(s)),
            Value::Number(n) => Ok(Rc::from(n.to_string())),
            other => Err(refused(CoercionKind::to_string(other.value_type()))),
        }
    }

    /// Condition context: non-zero after Number conversion.
    pub fn to_bool(&self) -> Result<bool, EvalError> {
        self.to_number().map(|n| !n.is_zero())
    }

    /// Index or count argument; same rules as [`Value::to_number`].
    pub fn to_i64(&self) -> Result<i64, EvalError> {
        self.to_number().map(VimInt::to_i64)
    }
}

#[cold]
fn refused(kind: Option<CoercionKind>) -> EvalError {
    match kind {
        Some(kind) => coercion(kind),
        None => EvalError::new("E685: Internal error: coercion"),
    }
}

#[cfg(test)]
#[expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]
mod tests {
    use super::*;
    use crate::errors::EvalErrorKind;

    #[test]
    fn string_prefixes() {
        assert_eq!(str_to_number("42abc").raw(), 42);
        assert_eq!(str_to_number("abc").raw(), 0);
        assert_eq!(str_to_number("-17").raw(), -17);
        assert_eq!(str_to_number("0x1F").raw(), 31);
        assert_eq!(str_to_number("0b101").raw(), 5);
        assert_eq!(str_to_number("0o17").raw(), 15);
        assert_eq!(str_to_number("017").raw(), 15);
        assert_eq!(str_to_number("019").raw(), 19);
        assert_eq!(str_to_number("0x").raw(), 0);
        assert_eq!(str_to_number(" 12").raw(), 0);
        assert_eq!(str_to_number("").raw(), 0);
    }

    #[test]
    fn string_to_number_saturates() {
        assert_eq!(str_to_number("99999999999"), VimInt::MAX);
        assert_eq!(str_to_number("-99999999999"), VimInt::MIN);
    }

    #[test]
    fn floats_from_strings() {
        assert!((str_to_float("1.5e3xyz") - 1500.0).abs() < f64::EPSILON);
        assert!((str_to_float("  -2") + 2.0).abs() < f64::EPSILON);
        assert!(str_to_float("1.") - 1.0 < f64::EPSILON);
        assert!(str_to_float("x").abs() < f64::EPSILON);
        assert!(str_to_float("inf").is_infinite());
    }

    #[test]
    fn containers_refuse_numbers() {
        let err = Value::list(vec![]).to_number().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::ListAsNumber));
        let err = Value::dict::<&str>([]).to_number().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::DictAsNumber));
        let err = Value::float(1.0).to_number().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::FloatAsNumber));
    }

    #[test]
    fn strings_never_become_floats() {
        let err = Value::string("1.5").to_float().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::StringAsFloat));
        assert!((Value::int(3).to_float().unwrap() - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn concat_strings() {
        assert_eq!(&*Value::int(-5).to_concat_string().unwrap(), "-5");
        let err = Value::float(1.0).to_concat_string().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::FloatAsString));
        let err = Value::dict::<&str>([]).to_concat_string().unwrap_err();
        assert_eq!(err.kind, EvalErrorKind::TypeCoercion(CoercionKind::DictAsString));
    }

    #[test]
    fn truthiness() {
        assert!(Value::string("1x").to_bool().unwrap());
        assert!(!Value::string("x1").to_bool().unwrap());
        assert!(Value::float(1.0).to_bool().is_err());
    }
}
