//! Binary operator implementations for the evaluator.
//!
//! Direct enum-based dispatch over the operator, then over the operand
//! types. Every refused combination maps to its own error kind: a List
//! where a Number is needed is E745, a Dictionary E728, and so on, and
//! callers rely on those kinds staying distinct.
//!
//! `&&` and `||` are handled here only for completeness; the interpreter
//! short-circuits them before both operands are evaluated.

use std::cmp::Ordering;

use vim_syntax::BinaryOp;
use vim_value::{
    cannot_compare, coercion, float_modulo, invalid_operation, negative_shift, reference_equals,
    shift_requires_number, structural_equals, CoercionKind, EvalError, EvalResult, Value,
    ValueType, VimInt,
};

use crate::pattern::PatternCache;

/// What a binary operator needs beyond its operands.
#[derive(Copy, Clone)]
pub struct OperatorContext<'a> {
    /// The `ignorecase` option, used by comparisons without `#`/`?`.
    pub ignorecase: bool,
    pub patterns: &'a PatternCache,
}

/// Evaluate a binary operation.
pub fn evaluate_binary(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    ctx: OperatorContext<'_>,
) -> EvalResult {
    match op {
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            eval_arithmetic(left, right, op)
        }
        BinaryOp::Concat | BinaryOp::DotDot => eval_concat(left, right),
        BinaryOp::Eq(mode)
        | BinaryOp::NotEq(mode)
        | BinaryOp::Lt(mode)
        | BinaryOp::LtEq(mode)
        | BinaryOp::Gt(mode)
        | BinaryOp::GtEq(mode) => {
            eval_comparison(left, right, op, mode.ignores_case(ctx.ignorecase)).map(Value::bool)
        }
        BinaryOp::Match(mode) | BinaryOp::NoMatch(mode) => {
            let text = left.to_concat_string()?;
            let pattern = right.to_concat_string()?;
            let matched = ctx
                .patterns
                .is_match(&text, &pattern, mode.ignores_case(ctx.ignorecase))?;
            Ok(Value::bool(matched == matches!(op, BinaryOp::Match(_))))
        }
        BinaryOp::Is(mode) => Ok(Value::bool(reference_equals(
            left,
            right,
            mode.ignores_case(ctx.ignorecase),
        ))),
        BinaryOp::IsNot(mode) => Ok(Value::bool(!reference_equals(
            left,
            right,
            mode.ignores_case(ctx.ignorecase),
        ))),
        BinaryOp::Shl | BinaryOp::Shr => eval_shift(left, right, op),
        BinaryOp::And => Ok(Value::bool(left.to_bool()? && right.to_bool()?)),
        BinaryOp::Or => Ok(Value::bool(left.to_bool()? || right.to_bool()?)),
    }
}

// Arithmetic

/// Operand that can never take part in arithmetic, with the kind to
/// report for it.
fn non_numeric(value: &Value) -> Option<CoercionKind> {
    match value {
        Value::List(_) | Value::Dict(_) | Value::Funcref(_) | Value::Blob(_) => {
            CoercionKind::to_number(value.value_type())
        }
        Value::Number(_) | Value::Float(_) | Value::String(_) => None,
    }
}

fn eval_arithmetic(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    match (left, right, op) {
        (Value::List(a), Value::List(b), BinaryOp::Add) => {
            let mut items = a.to_vec();
            items.extend(b.to_vec());
            return Ok(Value::list(items));
        }
        (Value::Blob(a), Value::Blob(b), BinaryOp::Add) => {
            let mut bytes = a.to_vec();
            bytes.extend(b.to_vec());
            return Ok(Value::blob(bytes));
        }
        _ => {}
    }
    if let Some(kind) = non_numeric(left).or_else(|| non_numeric(right)) {
        return Err(coercion(kind));
    }
    if matches!(left, Value::Float(_)) || matches!(right, Value::Float(_)) {
        if op == BinaryOp::Mod {
            return Err(float_modulo());
        }
        // Strings never widen to Float.
        let a = left.to_float()?;
        let b = right.to_float()?;
        return Ok(Value::Float(eval_float_arithmetic(a, b, op)));
    }
    let a = left.to_number()?;
    let b = right.to_number()?;
    Ok(Value::Number(eval_int_arithmetic(a, b, op)))
}

/// Numbers wrap at 32 bits; division and remainder by zero follow Vim's
/// fixed results rather than failing.
fn eval_int_arithmetic(a: VimInt, b: VimInt, op: BinaryOp) -> VimInt {
    match op {
        BinaryOp::Add => a.wrapping_add(b),
        BinaryOp::Sub => a.wrapping_sub(b),
        BinaryOp::Mul => a.wrapping_mul(b),
        BinaryOp::Div => a.vim_div(b),
        _ => a.vim_rem(b),
    }
}

fn eval_float_arithmetic(a: f64, b: f64, op: BinaryOp) -> f64 {
    match op {
        BinaryOp::Add => a + b,
        BinaryOp::Sub => a - b,
        BinaryOp::Mul => a * b,
        _ => a / b,
    }
}

// Concatenation

fn eval_concat(left: &Value, right: &Value) -> EvalResult {
    let a = left.to_concat_string()?;
    let b = right.to_concat_string()?;
    let mut joined = String::with_capacity(a.len() + b.len());
    joined.push_str(&a);
    joined.push_str(&b);
    Ok(Value::string(joined))
}

// Comparison

fn is_equality(op: BinaryOp) -> bool {
    matches!(op, BinaryOp::Eq(_) | BinaryOp::NotEq(_))
}

/// Apply a comparison operator to an ordering. `None` (NaN involved)
/// satisfies only `!=`.
fn ordering_satisfies(op: BinaryOp, ordering: Option<Ordering>) -> bool {
    match op {
        BinaryOp::Eq(_) => ordering == Some(Ordering::Equal),
        BinaryOp::NotEq(_) => ordering != Some(Ordering::Equal),
        BinaryOp::Lt(_) => ordering == Some(Ordering::Less),
        BinaryOp::LtEq(_) => matches!(ordering, Some(Ordering::Less | Ordering::Equal)),
        BinaryOp::Gt(_) => ordering == Some(Ordering::Greater),
        BinaryOp::GtEq(_) => matches!(ordering, Some(Ordering::Greater | Ordering::Equal)),
        _ => false,
    }
}

/// Lists, Dictionaries and Blobs compare only with their own type and
/// only for (in)equality.
fn eval_container_comparison(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    ignore_case: bool,
    container: ValueType,
) -> Result<bool, EvalError> {
    if left.value_type() != right.value_type() {
        return Err(cannot_compare(container));
    }
    if !is_equality(op) {
        return Err(invalid_operation(container));
    }
    let equal = structural_equals(left, right, ignore_case);
    Ok(equal == matches!(op, BinaryOp::Eq(_)))
}

fn eval_comparison(
    left: &Value,
    right: &Value,
    op: BinaryOp,
    ignore_case: bool,
) -> Result<bool, EvalError> {
    for container in [ValueType::List, ValueType::Dict, ValueType::Blob] {
        if left.value_type() == container || right.value_type() == container {
            return eval_container_comparison(left, right, op, ignore_case, container);
        }
    }
    match (left, right) {
        (Value::Funcref(a), Value::Funcref(b)) => {
            if !is_equality(op) {
                return Err(invalid_operation(ValueType::Funcref));
            }
            Ok(a.equals(b) == matches!(op, BinaryOp::Eq(_)))
        }
        (Value::Funcref(_), _) | (_, Value::Funcref(_)) => {
            if !is_equality(op) {
                return Err(invalid_operation(ValueType::Funcref));
            }
            Ok(matches!(op, BinaryOp::NotEq(_)))
        }
        (Value::Float(_), Value::String(_)) | (Value::String(_), Value::Float(_)) => {
            Err(coercion(CoercionKind::StringAsFloat))
        }
        (Value::Float(_), _) | (_, Value::Float(_)) => {
            let a = left.to_float()?;
            let b = right.to_float()?;
            Ok(ordering_satisfies(op, a.partial_cmp(&b)))
        }
        (Value::String(a), Value::String(b)) => {
            Ok(ordering_satisfies(op, Some(compare_strings(a, b, ignore_case))))
        }
        _ => {
            let a = left.to_number()?;
            let b = right.to_number()?;
            Ok(ordering_satisfies(op, Some(a.cmp(&b))))
        }
    }
}

/// Byte-wise string ordering, folding case first when asked.
pub(crate) fn compare_strings(a: &str, b: &str, ignore_case: bool) -> Ordering {
    if ignore_case {
        a.chars()
            .flat_map(char::to_lowercase)
            .cmp(b.chars().flat_map(char::to_lowercase))
    } else {
        a.cmp(b)
    }
}

// Shifts

fn eval_shift(left: &Value, right: &Value, op: BinaryOp) -> EvalResult {
    let (Value::Number(value), Value::Number(amount)) = (left, right) else {
        return Err(shift_requires_number());
    };
    let Ok(amount) = u32::try_from(amount.raw()) else {
        return Err(negative_shift());
    };
    Ok(Value::Number(if op == BinaryOp::Shl {
        value.shift_left(amount)
    } else {
        value.shift_right(amount)
    }))
}
