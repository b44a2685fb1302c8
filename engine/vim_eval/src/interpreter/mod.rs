//! Tree-walking interpreter for Vim script expressions.
//!
//! # Architecture
//!
//! - `expr`: expression evaluation, indexing and slicing
//! - `call`: function resolution and invocation (builtins, user functions,
//!   lambdas, partials)
//! - `assign`: `:let`, `:unlet`, `:lockvar` targets
//! - `frame_guard`: RAII frame management for calls
//! - `builder`: [`InterpreterBuilder`]
//!
//! User functions have a single-expression body: the result of the
//! expression is the return value. Multi-line `:function` blocks are not
//! part of this runtime.

mod assign;
mod builder;
mod call;
mod expr;
mod frame_guard;

use std::rc::Rc;

use rustc_hash::FxHashMap;
use vim_syntax::{parse_expression, Expr, ScopeKind, VarName};
use vim_value::{EvalError, EvalResult, Value};

pub use builder::InterpreterBuilder;
pub use frame_guard::FrameGuard;

use crate::environment::Environment;
use crate::operators::OperatorContext;
use crate::pattern::PatternCache;
use crate::builtins;

/// Options the evaluator itself consults.
#[derive(Clone, Debug)]
pub struct EvalOptions {
    /// `'ignorecase'`: default case mode of string comparisons.
    pub ignorecase: bool,
    /// `'maxfuncdepth'`: nested calls allowed before E132.
    pub max_call_depth: usize,
}

impl Default for EvalOptions {
    fn default() -> Self {
        EvalOptions {
            ignorecase: false,
            max_call_depth: 100,
        }
    }
}

/// A function defined by the host or a script.
#[derive(Debug)]
pub struct UserFunction {
    pub name: Rc<str>,
    pub params: Vec<Rc<str>>,
    /// Declared with `...`: extra arguments land in `a:000`.
    pub varargs: bool,
    /// Declared with `dict`: must be called through a Dictionary.
    pub dict: bool,
    pub body: Rc<Expr>,
}

/// The expression interpreter.
pub struct Interpreter {
    pub(crate) env: Environment,
    pub(crate) options: EvalOptions,
    pub(crate) functions: FxHashMap<Rc<str>, Rc<UserFunction>>,
    pub(crate) patterns: PatternCache,
    /// Host-defined options beyond the ones in [`EvalOptions`].
    pub(crate) extra_options: FxHashMap<Rc<str>, Value>,
    /// `:let $NAME = ...` assignments; the process environment is never
    /// modified.
    pub(crate) env_overrides: FxHashMap<Rc<str>, Rc<str>>,
    pub(crate) lambda_counter: u32,
}

impl Interpreter {
    pub fn new() -> Self {
        InterpreterBuilder::new().build()
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn env_mut(&mut self) -> &mut Environment {
        &mut self.env
    }

    pub fn options(&self) -> &EvalOptions {
        &self.options
    }

    pub fn options_mut(&mut self) -> &mut EvalOptions {
        &mut self.options
    }

    pub fn patterns(&self) -> &PatternCache {
        &self.patterns
    }

    pub fn operator_context(&self) -> OperatorContext<'_> {
        OperatorContext {
            ignorecase: self.options.ignorecase,
            patterns: &self.patterns,
        }
    }

    /// Parse and evaluate one expression.
    pub fn eval_str(&mut self, source: &str) -> EvalResult {
        let expr = parse_expression(source)?;
        self.eval(&expr)
    }

    /// Value of a variable given as source text (`"g:x"`, `"v:val"`).
    pub fn variable(&self, name: &str) -> Option<Value> {
        self.env.lookup(&parse_var_name(name))
    }

    pub fn set_variable(&mut self, name: &str, value: Value) -> Result<(), EvalError> {
        self.env.set(&parse_var_name(name), value)
    }

    // Functions

    /// Define a function whose body is a single expression.
    ///
    /// A trailing `"..."` parameter makes the function variadic.
    pub fn define_function(
        &mut self,
        name: &str,
        params: &[&str],
        body: &str,
        dict: bool,
    ) -> Result<(), EvalError> {
        let name = normalize_function_name(name);
        let starts_upper = name.chars().next().is_some_and(char::is_uppercase);
        if !starts_upper && !name.contains(':') && !name.contains('#') {
            return Err(EvalError::new(format!(
                "E128: Function name must start with a capital or \"s:\": {name}"
            )));
        }
        let varargs = params.last() == Some(&"...");
        let named = if varargs {
            &params[..params.len() - 1]
        } else {
            params
        };
        let body = parse_expression(body)?;
        let function = UserFunction {
            name: Rc::from(name),
            params: named.iter().map(|p| Rc::from(*p)).collect(),
            varargs,
            dict,
            body: Rc::new(body),
        };
        tracing::debug!(name, params = named.len(), varargs, "define function");
        self.functions.insert(Rc::from(name), Rc::new(function));
        Ok(())
    }

    /// Whether `name` is a user function or a builtin.
    pub fn has_function(&self, name: &str) -> bool {
        let name = normalize_function_name(name);
        self.functions.contains_key(name) || builtins::lookup(name).is_some()
    }

    // Options

    /// Make a host option readable as `&name` and writable with `:let`.
    pub fn define_option(&mut self, name: &str, value: Value) {
        self.extra_options.insert(Rc::from(name), value);
    }

    pub fn get_option(&self, name: &str) -> EvalResult {
        let name = strip_option_scope(name);
        match name {
            "ignorecase" | "ic" => Ok(Value::bool(self.options.ignorecase)),
            "maxfuncdepth" | "mfd" => Ok(count_value(self.options.max_call_depth)),
            _ => self
                .extra_options
                .get(name)
                .cloned()
                .ok_or_else(|| unknown_option(name)),
        }
    }

    pub fn set_option(&mut self, name: &str, value: &Value) -> Result<(), EvalError> {
        let name = strip_option_scope(name);
        match name {
            "ignorecase" | "ic" => self.options.ignorecase = value.to_bool()?,
            "maxfuncdepth" | "mfd" => {
                self.options.max_call_depth = usize::try_from(value.to_i64()?).unwrap_or(0);
            }
            _ => {
                let Some(slot) = self.extra_options.get_mut(name) else {
                    return Err(unknown_option(name));
                };
                *slot = value.clone();
            }
        }
        Ok(())
    }

    /// `$NAME`: an earlier `:let $NAME` wins over the process environment;
    /// unset variables read as the empty string.
    pub fn env_var(&self, name: &str) -> Rc<str> {
        if let Some(value) = self.env_overrides.get(name) {
            return Rc::clone(value);
        }
        Rc::from(std::env::var(name).unwrap_or_default())
    }

    pub(crate) fn has_env_var(&self, name: &str) -> bool {
        self.env_overrides.get(name).is_some_and(|v| !v.is_empty())
            || std::env::var_os(name).is_some()
    }
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

/// Split `"g:name"` into scope and name; anything without a known scope
/// prefix is unqualified.
pub(crate) fn parse_var_name(text: &str) -> VarName {
    let mut chars = text.chars();
    if let (Some(c), Some(':')) = (chars.next(), chars.next()) {
        if let Some(scope) = ScopeKind::from_char(c) {
            return VarName::new(Some(scope), &text[2..]);
        }
    }
    VarName::new(None, text)
}

/// `g:Foo` and `Foo` name the same function.
pub(crate) fn normalize_function_name(name: &str) -> &str {
    name.strip_prefix("g:").unwrap_or(name)
}

fn strip_option_scope(name: &str) -> &str {
    name.strip_prefix("l:")
        .or_else(|| name.strip_prefix("g:"))
        .unwrap_or(name)
}

/// A length or count as a Number, saturating at the Number range.
pub(crate) fn count_value(n: usize) -> Value {
    Value::int(i32::try_from(n).unwrap_or(i32::MAX))
}

#[cold]
fn unknown_option(name: &str) -> EvalError {
    EvalError::new(format!("E113: Unknown option: {name}"))
}

#[cfg(test)]
mod tests;
