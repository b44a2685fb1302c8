//! `:global` and `:vglobal`.

use vim_value::{global_recursive, EvalError};

use super::Invocation;
use crate::dispatcher::{DispatchContext, Dispatcher, ExecutionResult};
use crate::range::LineRange;

pub fn global(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let invert = inv.cmd.bang;
    run_global(d, inv, invert)
}

pub fn vglobal(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    run_global(d, inv, true)
}

/// Split `/pat/cmd` on its delimiter. `\/` keeps the delimiter inside
/// the pattern.
fn split_pattern(argument: &str) -> Result<(String, &str), EvalError> {
    let mut chars = argument.char_indices();
    let delimiter = match chars.next() {
        Some((_, c)) if !c.is_alphanumeric() && !matches!(c, '"' | '|' | '\\' | ' ') => c,
        _ => {
            return Err(EvalError::new(
                "E146: Regular expressions can't be delimited by letters",
            ))
        }
    };
    let mut pattern = String::new();
    let mut escaped = false;
    for (i, c) in chars {
        if escaped {
            if c != delimiter {
                pattern.push('\\');
            }
            pattern.push(c);
            escaped = false;
        } else if c == '\\' {
            escaped = true;
        } else if c == delimiter {
            return Ok((pattern, &argument[i + c.len_utf8()..]));
        } else {
            pattern.push(c);
        }
    }
    if escaped {
        pattern.push('\\');
    }
    Ok((pattern, ""))
}

/// Mark every matching line first, then run the command on each marked
/// line that still exists, with the caret on it.
fn run_global(
    d: &mut Dispatcher,
    inv: &mut Invocation<'_>,
    invert: bool,
) -> Result<ExecutionResult, EvalError> {
    if inv.ctx.in_global {
        return Err(global_recursive());
    }
    let (pattern, command) = split_pattern(inv.argument())?;
    if pattern.is_empty() {
        return Err(EvalError::new("E35: No previous regular expression"));
    }
    let command = match command.trim() {
        "" => "p",
        command => command,
    };
    let regex = d
        .interp
        .patterns()
        .compile(&pattern, d.interp.options().ignorecase)?;

    let range = inv.range.unwrap_or(LineRange {
        start: 1,
        end: inv.host.line_count(),
    });
    let marks: Vec<usize> = (range.start..=range.end)
        .filter(|&line| {
            inv.host
                .line_text(line)
                .is_some_and(|text| regex.is_match(&text) != invert)
        })
        .collect();
    tracing::debug!(%pattern, marked = marks.len(), "global");

    let ctx = DispatchContext {
        in_global: true,
        skip_history: true,
        ..inv.ctx
    };
    // Lines removed or added by one run shift the marks after it.
    let mut shift: isize = 0;
    for mark in marks {
        let Some(line) = mark.checked_add_signed(shift).filter(|&l| l >= 1) else {
            continue;
        };
        if line > inv.host.line_count() {
            break;
        }
        let before = inv.host.line_count();
        let cursor = inv.cursor;
        inv.host.set_cursor_line(cursor, line);
        let result = d.run(&mut *inv.host, command, ctx)?;
        if !result.is_success() {
            return Ok(result);
        }
        shift += line_delta(before, inv.host.line_count());
    }
    Ok(ExecutionResult::Success)
}

fn line_delta(before: usize, after: usize) -> isize {
    let before = isize::try_from(before).unwrap_or(isize::MAX);
    let after = isize::try_from(after).unwrap_or(isize::MAX);
    after - before
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn delimiters() {
        assert_eq!(split_pattern("/foo/d").unwrap(), ("foo".into(), "d"));
        assert_eq!(split_pattern("#a/b#p").unwrap(), ("a/b".into(), "p"));
        assert_eq!(split_pattern("/a\\/b/").unwrap(), ("a/b".into(), ""));
        assert_eq!(split_pattern("/x\\d/").unwrap(), ("x\\d".into(), ""));
        assert_eq!(split_pattern("/open").unwrap(), ("open".into(), ""));
        assert!(split_pattern("afooa").is_err());
    }
}
