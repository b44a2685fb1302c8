//! `:!{cmd}` and `:{range}!{filter}`.

use std::rc::Rc;

use vim_value::{no_previous_command, EvalError};

use super::Invocation;
use crate::dispatcher::{Dispatcher, ExecutionResult};

/// Run a shell command. With a range the lines go through it as a
/// filter and are replaced by its output; without one the output is
/// shown. `:!!` repeats the previous command.
pub fn bang(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let argument = inv.argument();
    let command: Rc<str> = if inv.cmd.bang {
        let Some(previous) = d.last_shell_command.clone() else {
            return Ok(ExecutionResult::error(no_previous_command().message));
        };
        if argument.is_empty() {
            previous
        } else {
            Rc::from(format!("{previous} {argument}"))
        }
    } else if argument.is_empty() {
        return Err(vim_value::argument_required());
    } else {
        Rc::from(argument)
    };
    d.last_shell_command = Some(Rc::clone(&command));

    let Some(range) = inv.range else {
        let output = inv.host.run_filter(&command, "")?;
        for line in output.lines() {
            inv.host.message(line);
        }
        return Ok(ExecutionResult::Success);
    };
    if !inv.host.is_modifiable() {
        return Ok(ExecutionResult::error(
            "E21: Cannot make changes, 'modifiable' is off",
        ));
    }

    let start = inv.host.line_offset(range.start);
    let end = if range.end >= inv.host.line_count() {
        inv.host.file_size()
    } else {
        inv.host.line_offset(range.end + 1)
    };
    let input = inv.host.read_range(start, end);
    tracing::debug!(%command, lines = range.len(), "filter");
    let output = inv.host.run_filter(&command, &input)?;

    let lines: Vec<String> = output.lines().map(str::to_owned).collect();
    if lines.is_empty() {
        inv.host.delete_lines(range.start, range.end);
    } else {
        inv.host.replace_lines(range.start, range.end, lines);
    }
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, range.start);
    Ok(ExecutionResult::Success)
}
