//! Command execution.
//!
//! [`Dispatcher::execute`] is the one entry point for the host. Every
//! command goes through the same steps:
//!
//! 1. parse and check range, argument and bang (no side effects yet)
//! 2. leave Visual mode unless the command keeps it
//! 3. run once, or once per caret in order, stopping at the first
//!    caret that does not succeed
//! 4. at top level, report a failure exactly once or record the line
//!    in history
//!
//! Commands that run other commands (`:execute`, `:global`, aliases,
//! `:@`) go through [`Dispatcher::run`] with a [`DispatchContext`], which
//! carries nesting state down the call instead of keeping it on the
//! dispatcher.

mod builder;
mod script;

use std::rc::Rc;

use rustc_hash::FxHashMap;
use smallvec::{smallvec, SmallVec};
use vim_eval::Interpreter;
use vim_value::{EvalError, Value};

use crate::command::Command;
use crate::commands::Invocation;
use crate::host::{CursorId, HistoryKind, Host};
use crate::range::LineRange;
use crate::table::{Access, CommandFlags, ExecutionStrategy, RangeRule};

pub use builder::DispatcherBuilder;
pub use script::{ScriptFailure, ScriptReport};

/// Outcome of a command that did not raise a script error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExecutionResult {
    Success,
    /// A failure the command reported itself, with an optional message.
    Error(Option<String>),
}

impl ExecutionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ExecutionResult::Success)
    }

    pub fn error(message: impl Into<String>) -> Self {
        ExecutionResult::Error(Some(message.into()))
    }
}

/// Nesting state for commands run from inside other commands.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct DispatchContext {
    /// Alias expansions and `:@` register runs above this one.
    pub alias_depth: usize,
    /// Inside `:global`, which cannot nest.
    pub in_global: bool,
    pub skip_history: bool,
}

impl DispatchContext {
    #[must_use]
    pub fn nested(self) -> Self {
        DispatchContext {
            skip_history: true,
            ..self
        }
    }
}

#[derive(Clone, Debug)]
pub struct DispatchOptions {
    /// Nested alias and register runs allowed before E169.
    pub max_alias_depth: usize,
    /// Record successful top-level commands in history.
    pub history: bool,
    /// Parsed commands kept for reuse.
    pub cache_capacity: usize,
}

impl Default for DispatchOptions {
    fn default() -> Self {
        DispatchOptions {
            max_alias_depth: 20,
            history: true,
            cache_capacity: 256,
        }
    }
}

/// A user command defined with `:command`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Alias {
    pub name: Rc<str>,
    pub replacement: Rc<str>,
}

pub struct Dispatcher {
    pub(crate) interp: Interpreter,
    pub(crate) aliases: FxHashMap<Rc<str>, Alias>,
    pub(crate) options: DispatchOptions,
    cache: FxHashMap<Rc<str>, Rc<Command>>,
    /// Command of the last `:!`, for `:!!`.
    pub(crate) last_shell_command: Option<Rc<str>>,
    /// Register of the last `:@x`, for `:@@`.
    pub(crate) last_register: Option<char>,
}

impl Dispatcher {
    pub fn new() -> Self {
        DispatcherBuilder::new().build()
    }

    pub fn interpreter(&self) -> &Interpreter {
        &self.interp
    }

    pub fn interpreter_mut(&mut self) -> &mut Interpreter {
        &mut self.interp
    }

    pub fn options(&self) -> &DispatchOptions {
        &self.options
    }

    pub fn alias(&self, name: &str) -> Option<&Alias> {
        self.aliases.get(name)
    }

    /// Run one command line from the host.
    ///
    /// Script errors come back as `Err`; failures a command reports
    /// itself come back as [`ExecutionResult::Error`]. Either way the host
    /// has already been given one error message and one beep.
    pub fn execute(
        &mut self,
        host: &mut dyn Host,
        text: &str,
        skip_history: bool,
    ) -> Result<ExecutionResult, EvalError> {
        let ctx = DispatchContext {
            skip_history,
            ..DispatchContext::default()
        };
        let command = match self.command(text) {
            Ok(Some(command)) => command,
            Ok(None) => return Ok(ExecutionResult::Success),
            Err(err) => {
                self.report_error(host, &err);
                return Err(err);
            }
        };

        let outcome = self.run_command(host, &command, ctx);
        match &outcome {
            Ok(ExecutionResult::Success) => {
                if self.options.history
                    && !skip_history
                    && !command.has_flag(CommandFlags::SKIP_HISTORY)
                {
                    host.append(HistoryKind::Command, &command.text);
                }
            }
            Ok(ExecutionResult::Error(message)) => {
                if let Some(message) = message {
                    host.error(message);
                }
                host.beep();
            }
            Err(err) => self.report_error(host, err),
        }
        outcome
    }

    /// Run a command line on behalf of another command. Nothing is
    /// reported to the host and nothing is recorded in history.
    pub fn run(
        &mut self,
        host: &mut dyn Host,
        text: &str,
        ctx: DispatchContext,
    ) -> Result<ExecutionResult, EvalError> {
        match self.command(text)? {
            Some(command) => self.run_command(host, &command, ctx.nested()),
            None => Ok(ExecutionResult::Success),
        }
    }

    fn report_error(&self, host: &mut dyn Host, err: &EvalError) {
        tracing::debug!(error = %err, "command failed");
        self.interp
            .env()
            .set_vim_var("errmsg", Value::string(err.message.as_str()));
        host.error(&err.message);
        host.beep();
    }

    /// Parse `text`, reusing an earlier parse of the same line.
    fn command(&mut self, text: &str) -> Result<Option<Rc<Command>>, EvalError> {
        if let Some(command) = self.cache.get(text) {
            return Ok(Some(Rc::clone(command)));
        }
        let aliases = &self.aliases;
        let Some(command) = Command::parse(text, |name| aliases.contains_key(name))? else {
            return Ok(None);
        };
        let command = Rc::new(command);
        if self.cache.len() >= self.options.cache_capacity {
            self.cache.clear();
        }
        self.cache.insert(Rc::from(text), Rc::clone(&command));
        Ok(Some(command))
    }

    fn run_command(
        &mut self,
        host: &mut dyn Host,
        command: &Command,
        ctx: DispatchContext,
    ) -> Result<ExecutionResult, EvalError> {
        tracing::trace!(name = %command.name, text = %command.text, "run command");
        if host.is_visual() && !command.has_flag(CommandFlags::KEEP_VISUAL) {
            host.exit_visual();
        }
        if command.def.access == Access::WritesBuffer && !host.is_modifiable() {
            return Ok(ExecutionResult::error(
                "E21: Cannot make changes, 'modifiable' is off",
            ));
        }

        let cursors: SmallVec<[CursorId; 4]> = match command.def.strategy {
            ExecutionStrategy::Single => smallvec![primary_cursor(host)],
            ExecutionStrategy::PerCursor if ctx.in_global => smallvec![primary_cursor(host)],
            ExecutionStrategy::PerCursor => host.cursors(),
        };

        for cursor in cursors {
            let line = host.cursor_line(cursor);
            let (range, count) = resolve_range(host, command, line)?;
            let mut invocation = Invocation {
                host: &mut *host,
                cmd: command,
                cursor,
                range,
                count,
                ctx,
            };
            let result = (command.def.handler)(self, &mut invocation)?;
            if !result.is_success() {
                tracing::debug!(name = %command.name, ?cursor, "stopping at failed caret");
                return Ok(result);
            }
        }
        Ok(ExecutionResult::Success)
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

fn primary_cursor(host: &dyn Host) -> CursorId {
    host.cursors().first().copied().unwrap_or(CursorId(0))
}

/// The range for one caret, and the count for commands whose range is a
/// count.
fn resolve_range(
    host: &dyn Host,
    command: &Command,
    line: usize,
) -> Result<(Option<LineRange>, usize), EvalError> {
    let Some(spec) = &command.range else {
        return Ok((None, 1));
    };
    if command.def.range == RangeRule::IsCount {
        return Ok((None, spec.count(host, line)?));
    }
    let range = spec.resolve(host, line)?;
    if command.has_flag(CommandFlags::ZERO_LINE) {
        Ok((Some(range), 1))
    } else {
        Ok((Some(range.clamped()), 1))
    }
}

#[cfg(test)]
mod tests;
