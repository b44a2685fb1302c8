//! Conversions, introspection, Funcref construction and bit operations.

use smallvec::SmallVec;
use vim_syntax::parse_expression;
use vim_value::display::string_repr;
use vim_value::{
    dict_required, invalid_argument, invalid_argument_type, list_required, str_to_float, DictRef,
    EvalError, EvalResult, FuncTarget, Funcref, FuncrefKind, Value, VimInt,
};

use crate::interpreter::{count_value, normalize_function_name};
use crate::Interpreter;

pub(super) fn type_of(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::int(args[0].value_type().type_code()))
}

pub(super) fn string(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(string_repr(&args[0])))
}

/// `str2nr(text [, base])`: leading whitespace and an optional sign are
/// skipped, then a base prefix matching `base` is allowed.
pub(super) fn str2nr(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].to_concat_string()?;
    let base = match args.get(1) {
        Some(base) => base.to_i64()?,
        None => 10,
    };
    let radix = match base {
        2 | 8 | 10 | 16 => u32::try_from(base).unwrap_or(10),
        other => return Err(invalid_argument(other.to_string())),
    };
    let trimmed = text.trim_start();
    let (negative, unsigned) = match trimmed.as_bytes().first() {
        Some(b'-') => (true, &trimmed[1..]),
        Some(b'+') => (false, &trimmed[1..]),
        _ => (false, trimmed),
    };
    let prefixes: &[&str] = match radix {
        16 => &["0x", "0X"],
        8 => &["0o", "0O"],
        2 => &["0b", "0B"],
        _ => &[],
    };
    let digits = prefixes
        .iter()
        .find_map(|p| unsigned.strip_prefix(p))
        .unwrap_or(unsigned);
    let mut magnitude: i64 = 0;
    for c in digits.chars() {
        let Some(digit) = c.to_digit(radix) else {
            break;
        };
        magnitude = (magnitude * i64::from(radix) + i64::from(digit)).min(1 << 33);
    }
    let value = if negative { -magnitude } else { magnitude };
    Ok(Value::Number(VimInt::saturating_from_i64(value)))
}

pub(super) fn str2float(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::Float(str_to_float(&args[0].to_concat_string()?)))
}

pub(super) fn float2nr(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::Float(f) => Ok(Value::Number(VimInt::saturating_from_f64(*f))),
        Value::Number(n) => Ok(Value::Number(*n)),
        _ => Err(EvalError::new("E808: Number or Float required")),
    }
}

pub(super) fn abs(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::Float(f) => Ok(Value::Float(f.abs())),
        other => Ok(Value::Number(other.to_number()?.saturating_abs())),
    }
}

pub(super) fn strlen(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(count_value(args[0].to_concat_string()?.len()))
}

pub(super) fn toupper(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(args[0].to_concat_string()?.to_uppercase()))
}

pub(super) fn tolower(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::string(args[0].to_concat_string()?.to_lowercase()))
}

// Funcrefs

/// Bound arguments and `self` from the optional arguments of
/// `function()`/`funcref()`: `(name, list)`, `(name, dict)` or
/// `(name, list, dict)`.
fn partial_parts(
    what: &str,
    args: &[Value],
) -> Result<(SmallVec<[Value; 2]>, Option<DictRef>), EvalError> {
    let mut bound = SmallVec::new();
    let mut dict = None;
    match args.get(1) {
        None => {}
        Some(Value::List(list)) => bound.extend(list.to_vec()),
        Some(Value::Dict(d)) if args.len() == 2 => dict = Some(d.clone()),
        Some(_) => return Err(invalid_argument_type(what, "List")),
    }
    match args.get(2) {
        None => {}
        Some(Value::Dict(d)) => dict = Some(d.clone()),
        Some(_) => return Err(dict_required()),
    }
    Ok((bound, dict))
}

fn make_funcref(
    interp: &Interpreter,
    what: &str,
    args: &[Value],
    kind: FuncrefKind,
) -> EvalResult {
    let (bound, dict) = partial_parts(what, args)?;
    match &args[0] {
        Value::Funcref(f) => Ok(Value::Funcref(f.partial(&bound, dict))),
        Value::String(name) => {
            let name = normalize_function_name(name);
            if !interp.has_function(name) {
                return Err(EvalError::new(format!("E700: Unknown function: {name}")));
            }
            let target = FuncTarget::Named(name.into());
            Ok(Value::Funcref(Funcref::new(target, bound, dict, kind)))
        }
        _ => Err(invalid_argument_type(what, "String or Funcref")),
    }
}

pub(super) fn function(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    make_funcref(interp, "function()", args, FuncrefKind::Function)
}

pub(super) fn funcref(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    make_funcref(interp, "funcref()", args, FuncrefKind::Identity)
}

/// `call(func, arglist [, dict])`.
pub(super) fn call(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let list = args[1].as_list().ok_or_else(list_required)?;
    let self_dict = match args.get(2) {
        None => None,
        Some(Value::Dict(d)) => Some(d.clone()),
        Some(_) => return Err(dict_required()),
    };
    interp.call_value_with_self(&args[0], &list.to_vec(), self_dict)
}

// Introspection

/// `exists('*Func')`, `exists('&opt')`, `exists('$VAR')`, or a variable
/// expression such as `exists('g:d.key')`.
pub(super) fn exists(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].to_concat_string()?;
    let found = if let Some(name) = text.strip_prefix('*') {
        interp.has_function(name)
    } else if let Some(name) = text.strip_prefix('&') {
        interp.get_option(name).is_ok()
    } else if let Some(name) = text.strip_prefix('$') {
        interp.has_env_var(name)
    } else {
        match parse_expression(&text) {
            Ok(expr) => interp.eval(&expr).is_ok(),
            Err(_) => false,
        }
    };
    Ok(Value::bool(found))
}

/// `islocked('name')`: 1 or 0, or -1 for a variable that does not exist.
pub(super) fn islocked(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].to_concat_string()?;
    Ok(match interp.is_locked(&text)? {
        Some(locked) => Value::bool(locked),
        None => Value::int(-1),
    })
}

pub(super) fn eval(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].to_concat_string()?;
    interp.eval_str(&text)
}

// Bitwise

pub(super) fn and(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::Number(args[0].to_number()?.bit_and(args[1].to_number()?)))
}

pub(super) fn or(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::Number(args[0].to_number()?.bit_or(args[1].to_number()?)))
}

pub(super) fn xor(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::Number(args[0].to_number()?.bit_xor(args[1].to_number()?)))
}

pub(super) fn invert(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::Number(args[0].to_number()?.bit_not()))
}
