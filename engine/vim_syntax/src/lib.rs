//! Vim script syntax: lexer, expression tree and parser.
//!
//! This crate covers the expression language used by `:let`, `:echo`,
//! `:call` and expression-string callbacks such as
//! `filter(l, 'v:val > 1')`. Ex command lines themselves are split by the
//! dispatcher; only their expression arguments come through here.
//!
//! - [`lexer`]: logos tokenizer with decoded literal payloads
//! - [`ast`]: [`Expr`] tree, operators and `:let` targets
//! - [`parser`]: precedence-climbing parser
//! - [`pattern`]: Vim regex to `regex`-crate translation

pub mod ast;
mod error;
pub mod lexer;
pub mod parser;
pub mod pattern;
mod span;
mod stack;

pub use ast::{
    AssignOp, BinaryOp, CaseMode, Expr, ExprKind, LambdaExpr, LetStatement, LetTarget, ScopeKind,
    UnaryOp, VarName,
};
pub use error::{SyntaxError, SyntaxErrorKind};
pub use parser::{parse_expression, parse_expression_list, parse_let, parse_targets};
pub use span::Span;
pub use stack::ensure_sufficient_stack;
