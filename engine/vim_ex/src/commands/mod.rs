//! Command handlers.
//!
//! A handler runs once per [`Invocation`]: once in all for single
//! commands, once per caret otherwise. It either raises a script error
//! or returns an [`ExecutionResult`].

pub mod alias;
pub mod echo;
pub mod edit;
pub mod filter;
pub mod global;
pub mod goto;
pub mod session;
pub mod variables;

use vim_value::EvalError;

use crate::command::Command;
use crate::dispatcher::{DispatchContext, Dispatcher, ExecutionResult};
use crate::host::{CursorId, Host};
use crate::range::LineRange;

pub type Handler = fn(&mut Dispatcher, &mut Invocation<'_>) -> Result<ExecutionResult, EvalError>;

/// One run of a command on one caret.
pub struct Invocation<'a> {
    pub host: &'a mut dyn Host,
    pub cmd: &'a Command,
    pub cursor: CursorId,
    /// Resolved for this caret; `None` when the line had no range.
    pub range: Option<LineRange>,
    /// For commands whose range is a count; 1 when absent.
    pub count: usize,
    pub ctx: DispatchContext,
}

impl<'a> Invocation<'a> {
    pub fn cursor_line(&self) -> usize {
        self.host.cursor_line(self.cursor)
    }

    /// The given range, or the caret's line.
    pub fn line_range(&self) -> LineRange {
        self.range
            .unwrap_or_else(|| LineRange::single(self.cursor_line()))
    }

    pub fn argument(&self) -> &'a str {
        let cmd: &'a Command = self.cmd;
        &cmd.argument
    }

    /// Lines `start..=end` of the buffer.
    pub fn lines(&self, range: LineRange) -> Vec<String> {
        (range.start..=range.end)
            .filter_map(|line| self.host.line_text(line))
            .collect()
    }
}

/// Split a leading `[x]` register name off an argument. Digits are left
/// alone since they are counts.
pub(crate) fn split_register(argument: &str) -> (Option<char>, &str) {
    let mut chars = argument.chars();
    match chars.next() {
        Some(c) if is_register_name(c) => (Some(c), chars.as_str().trim_start()),
        _ => (None, argument),
    }
}

fn is_register_name(c: char) -> bool {
    c.is_ascii_alphabetic() || matches!(c, '"' | '-' | '_' | '+' | '*')
}

/// Split a leading count off an argument.
pub(crate) fn split_count(argument: &str) -> Result<(Option<usize>, &str), EvalError> {
    let end = argument
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(argument.len());
    if end == 0 {
        return Ok((None, argument));
    }
    let count = argument[..end]
        .parse::<usize>()
        .map_err(|_| vim_value::invalid_range())?;
    if count == 0 {
        return Err(EvalError::new("E939: Positive count required"));
    }
    Ok((Some(count), argument[end..].trim_start()))
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn register_then_count() {
        assert_eq!(split_register("a 3"), (Some('a'), "3"));
        assert_eq!(split_register("3"), (None, "3"));
        assert_eq!(split_register(""), (None, ""));
        assert_eq!(split_count("3").unwrap(), (Some(3), ""));
        assert_eq!(split_count("").unwrap(), (None, ""));
    }

    #[test]
    fn zero_count_is_rejected() {
        assert_eq!(
            split_count("0").unwrap_err().message,
            "E939: Positive count required"
        );
    }
}
