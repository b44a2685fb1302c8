//! Line editing: `:delete`, `:yank`, `:put`, `:join`, `:print` and
//! `:number`.

use vim_value::{empty_register, EvalError};

use super::{split_count, split_register, Invocation};
use crate::dispatcher::{Dispatcher, ExecutionResult};
use crate::host::{Host, Register};
use crate::range::LineRange;

/// Apply a trailing count: `count` lines starting at the range's last
/// line, cut off at the end of the buffer.
fn with_count(range: LineRange, count: Option<usize>, last: usize) -> LineRange {
    match count {
        Some(count) => LineRange {
            start: range.end,
            end: range.end.saturating_add(count - 1).min(last),
        },
        None => range,
    }
}

/// Store `register` under `name`: the unnamed register always follows,
/// an uppercase name appends to its lowercase register and `_` discards.
fn store_register(host: &mut dyn Host, name: Option<char>, numbered: char, register: Register) {
    match name {
        Some('_') => return,
        None | Some('"') => host.set_register(numbered, register.clone()),
        Some(name) if name.is_ascii_uppercase() => {
            let lower = name.to_ascii_lowercase();
            let combined = match host.register(lower) {
                Some(mut existing) => {
                    existing.text.push_str(&register.text);
                    existing
                }
                None => register,
            };
            host.set_register(lower, combined.clone());
            host.set_register('"', combined);
            return;
        }
        Some(name) => host.set_register(name, register.clone()),
    }
    host.set_register('"', register);
}

/// `:[range]d[elete] [x] [count]`
pub fn delete(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let (name, rest) = split_register(inv.argument());
    let (count, rest) = split_count(rest)?;
    if !rest.is_empty() {
        return Err(vim_value::trailing_characters(rest));
    }
    let range = with_count(inv.line_range(), count, inv.host.line_count());
    let lines = inv.lines(range);
    store_register(&mut *inv.host, name, '1', Register::linewise(&lines));
    inv.host.delete_lines(range.start, range.end);
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, range.start);
    Ok(ExecutionResult::Success)
}

/// `:[range]y[ank] [x] [count]`
pub fn yank(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let (name, rest) = split_register(inv.argument());
    let (count, rest) = split_count(rest)?;
    if !rest.is_empty() {
        return Err(vim_value::trailing_characters(rest));
    }
    let range = with_count(inv.line_range(), count, inv.host.line_count());
    let lines = inv.lines(range);
    store_register(&mut *inv.host, name, '0', Register::linewise(&lines));
    Ok(ExecutionResult::Success)
}

/// `:[line]pu[t][!] [x]`: put register lines below the line, or above it
/// with the bang. Line 0 puts above the first line.
pub fn put(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let (name, rest) = split_register(inv.argument());
    if !rest.is_empty() {
        return Err(vim_value::trailing_characters(rest));
    }
    let name = name.unwrap_or('"');
    let register = inv
        .host
        .register(name)
        .filter(|reg| !reg.text.is_empty())
        .ok_or_else(|| empty_register(name))?;
    let lines = register.lines();
    let line = inv.line_range().end;
    let after = if inv.cmd.bang {
        line.saturating_sub(1)
    } else {
        line
    };
    let added = lines.len();
    inv.host.insert_lines(after, lines);
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, after + added);
    Ok(ExecutionResult::Success)
}

/// `:[range]j[oin][!] [count]`. Without a bang, leading blanks of each
/// joined line are dropped and one space separates the pieces.
pub fn join(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let (count, rest) = split_count(inv.argument())?;
    if !rest.is_empty() {
        return Err(vim_value::trailing_characters(rest));
    }
    let last = inv.host.line_count();
    let range = match (inv.range, count) {
        (Some(range), Some(count)) => with_count(range, Some(count.max(2)), last),
        (None, Some(count)) => with_count(inv.line_range(), Some(count.max(2)), last),
        (Some(range), None) if range.start < range.end => range,
        (range, None) => {
            let line = range.map_or_else(|| inv.cursor_line(), |r| r.start);
            LineRange {
                start: line,
                end: line + 1,
            }
        }
    };
    if range.end > last || range.start >= range.end {
        return Ok(ExecutionResult::Error(None));
    }

    let lines = inv.lines(range);
    let joined = if inv.cmd.bang {
        lines.concat()
    } else {
        join_with_spaces(&lines)
    };
    inv.host.replace_lines(range.start, range.end, vec![joined]);
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, range.start);
    Ok(ExecutionResult::Success)
}

fn join_with_spaces(lines: &[String]) -> String {
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let piece = if i == 0 { line.as_str() } else { line.trim_start() };
        if i > 0 && !piece.is_empty() && !out.ends_with(' ') && !piece.starts_with(')') {
            out.push(' ');
        }
        out.push_str(piece);
    }
    out
}

/// `:[range]p[rint]`
pub fn print(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let numbered = inv.argument().trim() == "#";
    show_lines(inv, numbered)
}

/// `:[range]nu[mber]`
pub fn print_numbered(
    _d: &mut Dispatcher,
    inv: &mut Invocation<'_>,
) -> Result<ExecutionResult, EvalError> {
    show_lines(inv, true)
}

fn show_lines(inv: &mut Invocation<'_>, numbered: bool) -> Result<ExecutionResult, EvalError> {
    let (count, _) = split_count(inv.argument().trim_start_matches('#').trim_start())?;
    let range = with_count(inv.line_range(), count, inv.host.line_count());
    for (line, text) in (range.start..).zip(inv.lines(range)) {
        if numbered {
            inv.host.message(&format!("{line:>3} {text}"));
        } else {
            inv.host.message(&text);
        }
    }
    let cursor = inv.cursor;
    inv.host.set_cursor_line(cursor, range.end);
    Ok(ExecutionResult::Success)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strings(lines: &[&str]) -> Vec<String> {
        lines.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn join_drops_indent() {
        assert_eq!(join_with_spaces(&strings(&["a", "   b", "c"])), "a b c");
        assert_eq!(join_with_spaces(&strings(&["f(x", ")"])), "f(x)");
        assert_eq!(join_with_spaces(&strings(&["a ", "b"])), "a b");
        assert_eq!(join_with_spaces(&strings(&["a", ""])), "a");
    }

    #[test]
    fn count_starts_at_range_end() {
        let range = with_count(LineRange { start: 2, end: 4 }, Some(3), 10);
        assert_eq!(range, LineRange { start: 4, end: 6 });
        let range = with_count(LineRange::single(9), Some(5), 10);
        assert_eq!(range, LineRange { start: 9, end: 10 });
    }
}
