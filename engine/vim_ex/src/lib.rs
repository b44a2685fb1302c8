//! Ex commands for the Vim script runtime.
//!
//! - [`parse`] and [`range`]: split a command line into range, name, bang
//!   and argument
//! - [`table`]: the built-in commands with their range and argument rules
//! - [`Dispatcher`]: validation, per-caret execution, error reporting and
//!   history
//! - [`host`]: the traits an editor implements, plus [`MemoryHost`]
//!
//! ```text
//! let mut host = MemoryHost::from_text("b\na\n");
//! let mut dispatcher = Dispatcher::new();
//! dispatcher.execute(&mut host, "let g:x = [1, 2, 3]", false)?;
//! dispatcher.execute(&mut host, "echo filter(g:x, 'v:val > 1')", false)?;
//! ```

mod command;
pub mod commands;
pub mod dispatcher;
pub mod host;
pub mod parse;
pub mod range;
pub mod table;

pub use command::Command;
pub use dispatcher::{
    Alias, DispatchContext, DispatchOptions, Dispatcher, DispatcherBuilder, ExecutionResult,
    ScriptFailure, ScriptReport,
};
pub use host::{
    CursorId, EditorHost, HistoryKind, HistorySink, Host, MemoryHost, MessageSink, ProcessError,
    ProcessRunner, Register, RegisterStore, SelectionKind,
};

pub use vim_eval::{EvalError, EvalErrorKind, Interpreter, InterpreterBuilder, Value};
