//! Unary operator implementations for the evaluator.

use vim_syntax::UnaryOp;
use vim_value::{EvalResult, Value};

/// Evaluate a unary operation.
///
/// Floats stay Floats, even under `!`. Everything else goes through
/// Number conversion, so `-"3"` is -3 and `-[]` is E745.
pub fn evaluate_unary(value: &Value, op: UnaryOp) -> EvalResult {
    match (value, op) {
        (Value::Float(f), UnaryOp::Neg) => Ok(Value::Float(-f)),
        (Value::Float(f), UnaryOp::Plus) => Ok(Value::Float(*f)),
        (Value::Float(f), UnaryOp::Not) => Ok(Value::Float(if *f == 0.0 { 1.0 } else { 0.0 })),
        (_, UnaryOp::Neg) => Ok(Value::Number(value.to_number()?.wrapping_neg())),
        (_, UnaryOp::Plus) => Ok(Value::Number(value.to_number()?)),
        (_, UnaryOp::Not) => Ok(Value::bool(!value.to_bool()?)),
    }
}
