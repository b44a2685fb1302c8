//! Callbacks for the collection functions.
//!
//! A callback is an expression string evaluated with `v:key` and `v:val`
//! bound, or a Funcref called with `(key, val)`. Both kinds see the
//! pseudo-variables; they are restored when the invocation returns, so a
//! callback nested in another callback leaves the outer view intact.

use vim_syntax::{parse_expression, Expr};
use vim_value::{invalid_argument_type, EvalError, EvalResult, Funcref, Value};

use crate::Interpreter;

pub(crate) enum Callback {
    /// Parsed once, evaluated per item.
    Expr(Expr),
    Func(Funcref),
}

impl Callback {
    pub(crate) fn from_value(function: &str, value: &Value) -> Result<Self, EvalError> {
        match value {
            Value::String(source) => Ok(Callback::Expr(parse_expression(source)?)),
            Value::Funcref(f) => Ok(Callback::Func(f.clone())),
            _ => Err(invalid_argument_type(function, "String or Funcref")),
        }
    }

    /// Invoke for one item.
    pub(crate) fn call(&self, interp: &mut Interpreter, key: Value, val: Value) -> EvalResult {
        let _vars = interp.env.callback_vars(key.clone(), val.clone());
        match self {
            Callback::Expr(expr) => interp.eval(expr),
            Callback::Func(f) => interp.call_funcref(f, &[key, val], None),
        }
    }
}
