//! Expression evaluation.

use std::rc::Rc;

use rustc_hash::FxHashSet;
use vim_syntax::{ensure_sufficient_stack, BinaryOp, Expr, ExprKind, LambdaExpr, VarName};
use vim_value::{
    blob_index_out_of_range, cannot_index_funcref, cannot_slice_dict, coercion,
    index_out_of_range, key_not_present, Closure, CoercionKind, DictRef, EvalError, EvalResult,
    Funcref, Lambda, Value, VimInt,
};

use super::Interpreter;
use crate::operators::evaluate_binary;
use crate::unary_operators::evaluate_unary;

impl Interpreter {
    /// Evaluate an expression. Errors carry the span of the innermost
    /// expression that failed.
    pub fn eval(&mut self, expr: &Expr) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(expr)).map_err(|err| err.with_span(expr.span))
    }

    fn eval_inner(&mut self, expr: &Expr) -> EvalResult {
        match &expr.kind {
            ExprKind::Number(n) => Ok(Value::Number(VimInt::saturating_from_i64(*n))),
            ExprKind::Float(f) => Ok(Value::Float(*f)),
            ExprKind::String(s) => Ok(Value::String(Rc::clone(s))),
            ExprKind::Blob(bytes) => Ok(Value::blob(bytes.to_vec())),
            ExprKind::List(items) => {
                let values = self.eval_args(items)?;
                Ok(Value::list(values))
            }
            ExprKind::Dict(entries) => self.eval_dict_literal(entries),
            ExprKind::Lambda(lambda) => Ok(self.make_lambda(lambda)),
            ExprKind::Variable(name) => self.eval_variable(name),
            ExprKind::Option(name) => self.get_option(name),
            ExprKind::Env(name) => Ok(Value::String(self.env_var(name))),
            ExprKind::Index { base, index } => {
                let base = self.eval(base)?;
                let index = self.eval(index)?;
                index_value(&base, &index)
            }
            ExprKind::Slice { base, start, end } => {
                let base = self.eval(base)?;
                let start = self.eval_bound(start.as_deref())?;
                let end = self.eval_bound(end.as_deref())?;
                slice_value(&base, start, end)
            }
            ExprKind::Member { base, key } => self.eval_member(base, key),
            ExprKind::Call { callee, args } => self.eval_call(callee, args),
            ExprKind::MethodCall {
                receiver,
                callee,
                args,
            } => self.eval_method_call(receiver, callee, args),
            ExprKind::Unary { op, operand } => {
                let value = self.eval(operand)?;
                evaluate_unary(&value, *op)
            }
            ExprKind::Binary { op, left, right } => self.eval_binary(*op, left, right),
            ExprKind::Ternary {
                cond,
                then,
                otherwise,
            } => {
                if self.eval(cond)?.to_bool()? {
                    self.eval(then)
                } else {
                    self.eval(otherwise)
                }
            }
            ExprKind::Coalesce { left, right } => {
                let value = self.eval(left)?;
                if value.is_empty() {
                    self.eval(right)
                } else {
                    Ok(value)
                }
            }
        }
    }

    pub(crate) fn eval_args(&mut self, exprs: &[Expr]) -> Result<Vec<Value>, EvalError> {
        exprs.iter().map(|e| self.eval(e)).collect()
    }

    pub(crate) fn eval_bound(&mut self, expr: Option<&Expr>) -> Result<Option<i64>, EvalError> {
        expr.map(|e| self.eval(e)?.to_i64()).transpose()
    }

    fn eval_variable(&mut self, name: &VarName) -> EvalResult {
        if name.is_scope_dict() {
            if let Some(scope) = name.scope {
                if let Some(dict) = self.env.scope_dict(scope) {
                    return Ok(Value::Dict(dict));
                }
            }
        }
        self.env.get(name)
    }

    fn eval_dict_literal(&mut self, entries: &[(Expr, Expr)]) -> EvalResult {
        let dict = DictRef::new();
        let mut seen = FxHashSet::default();
        for (key_expr, value_expr) in entries {
            let key = self.eval(key_expr)?.to_concat_string()?;
            if !seen.insert(Rc::clone(&key)) {
                return Err(EvalError::new(format!(
                    "E721: Duplicate key in Dictionary: \"{key}\""
                ))
                .with_span(key_expr.span));
            }
            let value = self.eval(value_expr)?;
            dict.insert(key, value);
        }
        Ok(Value::Dict(dict))
    }

    /// A lambda literal closes over the `l:` and `a:` of the frame it is
    /// evaluated in.
    fn make_lambda(&mut self, lambda: &Rc<LambdaExpr>) -> Value {
        self.lambda_counter += 1;
        let name: Rc<str> = Rc::from(format!("<lambda>{}", self.lambda_counter));
        let closure = self.env.current_frame().map(|frame| Closure {
            locals: frame.locals.clone(),
            args: frame.args.clone(),
        });
        Value::Funcref(Funcref::lambda(Lambda {
            name,
            expr: Rc::clone(lambda),
            closure,
        }))
    }

    /// `base.key`: a Dictionary member, or `base . key` when `base` is not
    /// a Dictionary.
    fn eval_member(&mut self, base: &Expr, key: &str) -> EvalResult {
        let value = self.eval(base)?;
        self.member_value(&value, key)
    }

    pub(super) fn member_value(&mut self, value: &Value, key: &str) -> EvalResult {
        if let Value::Dict(dict) = value {
            return dict.get(key).ok_or_else(|| key_not_present(key));
        }
        let right = if key.bytes().all(|b| b.is_ascii_digit()) {
            Value::string(key)
        } else {
            self.env.get(&VarName::new(None, key))?
        };
        evaluate_binary(value, &right, BinaryOp::Concat, self.operator_context())
    }

    fn eval_binary(&mut self, op: BinaryOp, left: &Expr, right: &Expr) -> EvalResult {
        match op {
            BinaryOp::And => {
                if !self.eval(left)?.to_bool()? {
                    return Ok(Value::bool(false));
                }
                Ok(Value::bool(self.eval(right)?.to_bool()?))
            }
            BinaryOp::Or => {
                if self.eval(left)?.to_bool()? {
                    return Ok(Value::bool(true));
                }
                Ok(Value::bool(self.eval(right)?.to_bool()?))
            }
            _ => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                tracing::trace!(%op, "binary");
                evaluate_binary(&left, &right, op, self.operator_context())
            }
        }
    }
}

/// Character at a non-negative index, or the empty string.
fn char_at(text: &str, index: i64) -> Value {
    usize::try_from(index)
        .ok()
        .and_then(|i| text.chars().nth(i))
        .map_or_else(Value::empty_string, |c| Value::string(c.to_string()))
}

/// `base[index]`.
///
/// Lists and Blobs fail on a bad index, Dictionaries on a missing key.
/// Strings index by character and yield `''` out of range.
pub(crate) fn index_value(base: &Value, index: &Value) -> EvalResult {
    match base {
        Value::List(list) => {
            let i = index.to_i64()?;
            list.get(i).ok_or_else(|| index_out_of_range(i))
        }
        Value::Dict(dict) => {
            let key = index.to_concat_string()?;
            dict.get(&key).ok_or_else(|| key_not_present(&key))
        }
        Value::Blob(blob) => {
            let i = index.to_i64()?;
            blob.get(i)
                .map(|b| Value::int(i32::from(b)))
                .ok_or_else(|| blob_index_out_of_range(i))
        }
        Value::String(s) => Ok(char_at(s, index.to_i64()?)),
        Value::Number(_) => Ok(char_at(&base.to_concat_string()?, index.to_i64()?)),
        Value::Funcref(_) => Err(cannot_index_funcref()),
        Value::Float(_) => Err(coercion(CoercionKind::FloatAsString)),
    }
}

/// Inclusive `[start:end]` bounds over `len` items, negative values
/// counting from the end. `None` when the slice is empty.
pub(crate) fn inclusive_bounds(
    len: usize,
    start: Option<i64>,
    end: Option<i64>,
) -> Option<(usize, usize)> {
    let len = i64::try_from(len).ok()?;
    let mut first = start.unwrap_or(0);
    if first < 0 {
        first = (first + len).max(0);
    }
    let mut last = end.unwrap_or(-1);
    if last < 0 {
        last += len;
    }
    last = last.min(len - 1);
    if first > last || first >= len {
        return None;
    }
    Some((usize::try_from(first).ok()?, usize::try_from(last).ok()?))
}

/// `base[start:end]`: both ends inclusive and clamped.
pub(crate) fn slice_value(base: &Value, start: Option<i64>, end: Option<i64>) -> EvalResult {
    match base {
        Value::List(list) => {
            let items = list.to_vec();
            Ok(Value::list(match inclusive_bounds(items.len(), start, end) {
                Some((first, last)) => items[first..=last].to_vec(),
                None => Vec::new(),
            }))
        }
        Value::Blob(blob) => {
            let bytes = blob.to_vec();
            Ok(Value::blob(match inclusive_bounds(bytes.len(), start, end) {
                Some((first, last)) => bytes[first..=last].to_vec(),
                None => Vec::new(),
            }))
        }
        Value::String(s) => {
            let chars: Vec<char> = s.chars().collect();
            Ok(Value::string(match inclusive_bounds(chars.len(), start, end) {
                Some((first, last)) => chars[first..=last].iter().collect::<String>(),
                None => String::new(),
            }))
        }
        Value::Number(_) => slice_value(&Value::String(base.to_concat_string()?), start, end),
        Value::Dict(_) => Err(cannot_slice_dict()),
        Value::Funcref(_) => Err(cannot_index_funcref()),
        Value::Float(_) => Err(coercion(CoercionKind::FloatAsString)),
    }
}
