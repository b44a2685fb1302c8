//! `:@`, `:registers`, `:history`, `:redraw` and `:sleep`.

use std::time::Duration;

use vim_value::{alias_recursion, empty_register, EvalError};

use super::Invocation;
use crate::dispatcher::{DispatchContext, Dispatcher, ExecutionResult};
use crate::host::{HistoryKind, SelectionKind};

/// `:[addr]@{reg}`: run the register's lines as commands. `@@` (or a
/// bare `@`) repeats the previous register, `@:` the last command line.
pub fn at(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let name = match inv.argument().trim().chars().next() {
        None | Some('@') => {
            let Some(name) = inv.cmd.last_register.get().or(d.last_register) else {
                return Err(EvalError::new("E748: No previously used register"));
            };
            name
        }
        Some(name) => name,
    };
    inv.cmd.last_register.set(Some(name));

    if inv.ctx.alias_depth >= d.options.max_alias_depth {
        return Err(alias_recursion());
    }

    let lines = if name == ':' {
        let Some(last) = inv.host.entries(HistoryKind::Command).pop() else {
            return Err(EvalError::new("E30: No previous command line"));
        };
        vec![last]
    } else {
        let register = inv
            .host
            .register(name.to_ascii_lowercase())
            .filter(|reg| !reg.text.is_empty())
            .ok_or_else(|| empty_register(name))?;
        register.lines()
    };
    d.last_register = Some(name);

    if let Some(range) = inv.range {
        let cursor = inv.cursor;
        inv.host.set_cursor_line(cursor, range.end);
    }
    let ctx = DispatchContext {
        alias_depth: inv.ctx.alias_depth + 1,
        ..inv.ctx
    };
    tracing::debug!(register = %name, lines = lines.len(), "execute register");
    for line in &lines {
        let result = d.run(&mut *inv.host, line, ctx)?;
        if !result.is_success() {
            return Ok(result);
        }
    }
    Ok(ExecutionResult::Success)
}

/// `:reg[isters] [names]`
pub fn registers(
    _d: &mut Dispatcher,
    inv: &mut Invocation<'_>,
) -> Result<ExecutionResult, EvalError> {
    let wanted: Vec<char> = inv.argument().chars().filter(|c| !c.is_whitespace()).collect();
    inv.host.message("Type Name Content");
    for (name, register) in inv.host.registers() {
        if !wanted.is_empty() && !wanted.contains(&name) {
            continue;
        }
        let kind = match register.kind {
            SelectionKind::Char => 'c',
            SelectionKind::Line => 'l',
            SelectionKind::Block => 'b',
        };
        let content = register.text.replace('\n', "^J");
        inv.host.message(&format!("  {kind}  \"{name}   {content}"));
    }
    Ok(ExecutionResult::Success)
}

/// `:his[tory] [{name}]` where name is `cmd`, `:`, `expr`, `=` or `all`.
pub fn history(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let kinds: &[(HistoryKind, &str)] = match inv.argument().trim() {
        "" | ":" | "c" | "cm" | "cmd" => &[(HistoryKind::Command, "cmd")],
        "=" | "e" | "ex" | "exp" | "expr" => &[(HistoryKind::Expression, "expr")],
        "a" | "al" | "all" => &[
            (HistoryKind::Command, "cmd"),
            (HistoryKind::Expression, "expr"),
        ],
        other => return Err(vim_value::trailing_characters(other)),
    };
    for (kind, label) in kinds {
        inv.host.message(&format!("      #  {label} history"));
        for (i, entry) in inv.host.entries(*kind).iter().enumerate() {
            inv.host.message(&format!("{:>7}  {entry}", i + 1));
        }
    }
    Ok(ExecutionResult::Success)
}

pub fn redraw(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    inv.host.redraw();
    Ok(ExecutionResult::Success)
}

/// `:[N]sl[eep] [N][m]`: seconds, or milliseconds with `m`.
pub fn sleep(_d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let argument = inv.argument().trim();
    let (digits, millis) = match argument.strip_suffix('m') {
        Some(digits) => (digits, true),
        None => (argument, false),
    };
    let amount = if digits.is_empty() {
        inv.count
    } else {
        digits
            .parse::<usize>()
            .map_err(|_| vim_value::invalid_argument(argument))?
    };
    let amount = u64::try_from(amount).unwrap_or(u64::MAX);
    let duration = if millis {
        Duration::from_millis(amount)
    } else {
        Duration::from_secs(amount)
    };
    inv.host.sleep(duration);
    Ok(ExecutionResult::Success)
}
