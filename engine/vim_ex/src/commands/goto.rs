//! `:{line}` and `:goto {byte}`.

use vim_value::EvalError;

use super::{split_count, Invocation};
use crate::dispatcher::{Dispatcher, ExecutionResult};

/// A bare range moves the caret to its last line.
pub fn goto_line(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let line = inv.line_range().end;
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, line);
    Ok(ExecutionResult::Success)
}

/// `:[count]go[to] [count]`: move to the line holding byte `count`,
/// counted from 1. Past the end means the last byte.
pub fn goto_byte(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let (count, rest) = split_count(inv.argument())?;
    if !rest.is_empty() {
        return Err(vim_value::trailing_characters(rest));
    }
    let byte = count.unwrap_or(inv.count);
    let size = inv.host.file_size();
    let offset = byte.saturating_sub(1).min(size.saturating_sub(1));
    let before = inv.host.read_range(0, offset);
    let line = 1 + before.bytes().filter(|&b| b == b'\n').count();
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, line);
    Ok(ExecutionResult::Success)
}
