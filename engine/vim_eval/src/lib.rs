//! Vim script evaluation.
//!
//! - [`Environment`]: scoped variable store (`g:`, `l:`, `a:`, `v:`, ...)
//!   with binding locks and the `v:key`/`v:val` callback guard
//! - [`evaluate_binary`] / [`evaluate_unary`]: the operator coercion matrix
//! - [`Interpreter`]: expression evaluation, `:let`/`:unlet`/`:lockvar`,
//!   function calls and the builtin function library

mod builtins;
mod environment;
mod interpreter;
mod operators;
mod pattern;
mod unary_operators;

pub use builtins::builtin_names;
pub use environment::{Environment, Frame, FrameKind, VimVarGuard};
pub use interpreter::{EvalOptions, FrameGuard, Interpreter, InterpreterBuilder, UserFunction};
pub use operators::{evaluate_binary, OperatorContext};
pub use pattern::PatternCache;
pub use unary_operators::evaluate_unary;

pub use vim_value::{EvalError, EvalErrorKind, EvalResult, Value};
