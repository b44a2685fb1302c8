//! Text forms of values.
//!
//! [`string_repr`] is `string()`: Strings come out quoted and Funcrefs as
//! `function('name')`. [`echo_string`] is what `:echo` prints: the same,
//! except that a top-level String or Funcref appears bare. Containers
//! that contain themselves print the re-entered occurrence as `[...]` or
//! `{...}`.

use std::fmt::Write as _;

use rustc_hash::FxHashSet;
use vim_syntax::ensure_sufficient_stack;

use crate::{Funcref, Value};

/// Vim's float formatting: `%g` with six significant digits, always
/// showing a decimal point, and a bare exponent (`1.0e6`, `1.5e-7`).
pub fn format_float(f: f64) -> String {
    if f.is_nan() {
        return "nan".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "inf" } else { "-inf" }.to_string();
    }
    if f == 0.0 {
        return if f.is_sign_negative() { "-0.0" } else { "0.0" }.to_string();
    }
    let sci = format!("{f:.5e}");
    let Some((mantissa, exp)) = sci.split_once('e') else {
        return sci;
    };
    let exponent: i32 = exp.parse().unwrap_or(0);
    if (-4..6).contains(&exponent) {
        let decimals = usize::try_from(5 - exponent).unwrap_or(0);
        let fixed = format!("{f:.decimals$}");
        let trimmed = trim_fraction(&fixed);
        if trimmed.contains('.') {
            trimmed.to_string()
        } else {
            format!("{trimmed}.0")
        }
    } else {
        let trimmed = trim_fraction(mantissa);
        if trimmed.contains('.') {
            format!("{trimmed}e{exponent}")
        } else {
            format!("{trimmed}.0e{exponent}")
        }
    }
}

/// Drop trailing zeros after a decimal point, and the point itself if
/// nothing remains after it.
fn trim_fraction(s: &str) -> &str {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.')
    } else {
        s
    }
}

/// `0z0102.0304`: bytes in upper-case hex, a dot every four bytes.
pub fn format_blob(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(2 + bytes.len() * 2 + bytes.len() / 4);
    out.push_str("0z");
    for (i, byte) in bytes.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            out.push('.');
        }
        let _ = write!(out, "{byte:02X}");
    }
    out
}

/// Single-quoted form, doubling embedded quotes.
pub fn quote_string(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('\'');
    for c in s.chars() {
        if c == '\'' {
            out.push('\'');
        }
        out.push(c);
    }
    out.push('\'');
    out
}

/// `string()` form.
pub fn string_repr(value: &Value) -> String {
    let mut out = String::new();
    let mut active = FxHashSet::default();
    write_value(&mut out, value, &mut active);
    out
}

/// `:echo` form.
pub fn echo_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        Value::Funcref(f) => f.name().to_string(),
        other => string_repr(other),
    }
}

fn write_funcref(out: &mut String, f: &Funcref, active: &mut FxHashSet<usize>) {
    out.push_str("function(");
    out.push_str(&quote_string(f.name()));
    if !f.bound_args().is_empty() {
        out.push_str(", [");
        for (i, arg) in f.bound_args().iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            write_value(out, arg, active);
        }
        out.push(']');
    }
    if let Some(dict) = f.self_dict() {
        out.push_str(", ");
        write_value(out, &Value::Dict(dict.clone()), active);
    }
    out.push(')');
}

fn write_value(out: &mut String, value: &Value, active: &mut FxHashSet<usize>) {
    match value {
        Value::Number(n) => {
            let _ = write!(out, "{n}");
        }
        Value::Float(f) => out.push_str(&format_float(*f)),
        Value::String(s) => out.push_str(&quote_string(s)),
        Value::Blob(b) => out.push_str(&format_blob(&b.borrow().bytes)),
        Value::Funcref(f) => write_funcref(out, f, active),
        Value::List(list) => {
            if !active.insert(list.addr()) {
                out.push_str("[...]");
                return;
            }
            out.push('[');
            for (i, item) in list.to_vec().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                ensure_sufficient_stack(|| write_value(out, item, active));
            }
            out.push(']');
            active.remove(&list.addr());
        }
        Value::Dict(dict) => {
            if !active.insert(dict.addr()) {
                out.push_str("{...}");
                return;
            }
            out.push('{');
            for (i, (key, item)) in dict.to_pairs().iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&quote_string(key));
                out.push_str(": ");
                ensure_sufficient_stack(|| write_value(out, item, active));
            }
            out.push('}');
            active.remove(&dict.addr());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{ListItem, ListRef};
    use pretty_assertions::assert_eq;

    #[test]
    fn floats_follow_percent_g() {
        assert_eq!(format_float(1.0), "1.0");
        assert_eq!(format_float(1.5), "1.5");
        assert_eq!(format_float(-0.25), "-0.25");
        assert_eq!(format_float(1.0 / 3.0), "0.333333");
        assert_eq!(format_float(100_000.0), "100000.0");
        assert_eq!(format_float(1_000_000.0), "1.0e6");
        assert_eq!(format_float(1.5e-7), "1.5e-7");
        assert_eq!(format_float(123_456_789.0), "1.23457e8");
        assert_eq!(format_float(f64::INFINITY), "inf");
        assert_eq!(format_float(f64::NAN), "nan");
    }

    #[test]
    fn blobs_group_by_four() {
        assert_eq!(format_blob(&[]), "0z");
        assert_eq!(format_blob(&[0xde, 0xad, 0xbe, 0xef, 0x01]), "0zDEADBEEF.01");
    }

    #[test]
    fn string_versus_echo() {
        let v = Value::list(vec![Value::int(1), Value::string("it's"), Value::float(2.0)]);
        assert_eq!(string_repr(&v), "[1, 'it''s', 2.0]");
        assert_eq!(echo_string(&Value::string("plain")), "plain");
        assert_eq!(string_repr(&Value::string("plain")), "'plain'");
        let d = Value::dict([("a", Value::int(1)), ("b", Value::list(vec![]))]);
        assert_eq!(echo_string(&d), "{'a': 1, 'b': []}");
    }

    #[test]
    fn funcrefs() {
        let f = Value::Funcref(Funcref::named("strlen"));
        assert_eq!(echo_string(&f), "strlen");
        assert_eq!(string_repr(&f), "function('strlen')");
        let p = Value::Funcref(Funcref::named("add").partial(&[Value::int(1)], None));
        assert_eq!(string_repr(&p), "function('add', [1])");
    }

    #[test]
    fn self_reference_is_elided() {
        let list = ListRef::new(vec![Value::int(1)]);
        list.borrow_mut()
            .items
            .push(ListItem::new(Value::List(list.clone())));
        assert_eq!(string_repr(&Value::List(list)), "[1, [...]]");
    }

    #[test]
    fn shared_but_acyclic_is_printed_twice() {
        let inner = Value::list(vec![Value::int(1)]);
        let outer = Value::list(vec![inner.clone(), inner]);
        assert_eq!(string_repr(&outer), "[[1], [1]]");
    }
}
