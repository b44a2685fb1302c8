//! `:let`, `:unlet`, `:lockvar` and `:unlockvar`.

use vim_value::display::string_repr;
use vim_value::{EvalError, LockDepth};

use super::Invocation;
use crate::dispatcher::{Dispatcher, ExecutionResult};

/// `:let {target} = {expr}`; with no argument, lists global variables.
pub fn let_(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let argument = inv.argument();
    if argument.is_empty() {
        let mut pairs = d.interp.env().global().to_pairs();
        pairs.sort_by(|a, b| a.0.cmp(&b.0));
        for (name, value) in pairs {
            inv.host.message(&format!("g:{name}\t{}", string_repr(&value)));
        }
        return Ok(ExecutionResult::Success);
    }
    d.interp.execute_let(argument)?;
    Ok(ExecutionResult::Success)
}

/// `:unlet[!] {name} ...`; the bang ignores missing variables.
pub fn unlet(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    d.interp.unlet(inv.argument(), inv.cmd.bang)?;
    Ok(ExecutionResult::Success)
}

pub fn lockvar(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    set_lock(d, inv, true)
}

pub fn unlockvar(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    set_lock(d, inv, false)
}

/// `:lockvar[!] [depth] {name} ...`. The bang means the whole structure.
fn set_lock(
    d: &mut Dispatcher,
    inv: &mut Invocation<'_>,
    lock: bool,
) -> Result<ExecutionResult, EvalError> {
    let (depth, names) = split_depth(inv.argument());
    let depth = if inv.cmd.bang {
        LockDepth::UNLIMITED
    } else {
        depth.unwrap_or_default()
    };
    if names.is_empty() {
        return Err(vim_value::argument_required());
    }
    d.interp.lockvar(names, depth, lock)?;
    Ok(ExecutionResult::Success)
}

fn split_depth(argument: &str) -> (Option<LockDepth>, &str) {
    let end = argument
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(argument.len());
    // A depth must be followed by a blank; `1x` is not a depth.
    let rest = &argument[end..];
    if end == 0 || !(rest.is_empty() || rest.starts_with(char::is_whitespace)) {
        return (None, argument);
    }
    let depth = argument[..end]
        .parse::<i32>()
        .map_or(LockDepth::UNLIMITED, LockDepth::new);
    (Some(depth), rest.trim_start())
}
