//! User commands: `:command`, `:delcommand` and running an alias.

use std::rc::Rc;

use vim_value::display::quote_string;
use vim_value::{alias_recursion, unknown_command, EvalError};

use super::Invocation;
use crate::dispatcher::{Alias, DispatchContext, Dispatcher, ExecutionResult};

/// `:com[mand][!] {Name} {replacement}`; with only a name or nothing,
/// lists aliases.
pub fn command(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let argument = inv.argument();
    let (name, replacement) = match argument.split_once(char::is_whitespace) {
        Some((name, rest)) => (name, rest.trim_start()),
        None => (argument, ""),
    };

    if replacement.is_empty() {
        let mut aliases: Vec<&Alias> = d
            .aliases
            .values()
            .filter(|alias| alias.name.starts_with(name))
            .collect();
        if aliases.is_empty() && !name.is_empty() {
            return Err(no_such_command(name));
        }
        aliases.sort_by(|a, b| a.name.cmp(&b.name));
        for alias in aliases {
            inv.host
                .message(&format!("{:<12}{}", alias.name, alias.replacement));
        }
        return Ok(ExecutionResult::Success);
    }

    if !is_alias_name(name) {
        return Err(EvalError::new(
            "E183: User defined commands must start with an uppercase letter",
        ));
    }
    if d.aliases.contains_key(name) && !inv.cmd.bang {
        return Err(EvalError::new(format!(
            "E174: Command already exists: add ! to replace it: {name}"
        )));
    }
    tracing::debug!(name, replacement, "define alias");
    let name: Rc<str> = Rc::from(name);
    d.aliases.insert(
        Rc::clone(&name),
        Alias {
            name,
            replacement: Rc::from(replacement),
        },
    );
    Ok(ExecutionResult::Success)
}

/// `:delc[ommand] {Name}`
pub fn delcommand(
    d: &mut Dispatcher,
    inv: &mut Invocation<'_>,
) -> Result<ExecutionResult, EvalError> {
    let name = inv.argument().trim();
    match d.aliases.remove(name) {
        Some(_) => Ok(ExecutionResult::Success),
        None => Err(no_such_command(name)),
    }
}

/// Expand the alias and run the result one level deeper.
pub fn run_alias(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let Some(alias) = d.aliases.get(&*inv.cmd.name).cloned() else {
        return Err(unknown_command(&inv.cmd.name));
    };
    if inv.ctx.alias_depth >= d.options.max_alias_depth {
        return Err(alias_recursion());
    }
    let range = inv.line_range();
    let expanded = expand(
        &alias.replacement,
        inv.argument(),
        inv.cmd.bang,
        (range.start, range.end),
    );
    tracing::trace!(alias = %alias.name, %expanded, depth = inv.ctx.alias_depth + 1, "alias");
    let ctx = DispatchContext {
        alias_depth: inv.ctx.alias_depth + 1,
        ..inv.ctx
    };
    d.run(&mut *inv.host, &expanded, ctx)
}

fn is_alias_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_uppercase())
        && name.chars().all(|c| c.is_ascii_alphanumeric())
}

fn no_such_command(name: &str) -> EvalError {
    EvalError::new(format!("E184: No such user-defined command: {name}"))
}

/// Substitute `<args>`, `<q-args>`, `<bang>`, `<line1>`, `<line2>` and
/// `<lt>` in an alias replacement.
fn expand(replacement: &str, args: &str, bang: bool, lines: (usize, usize)) -> String {
    let mut out = String::with_capacity(replacement.len() + args.len());
    let mut rest = replacement;
    while let Some(open) = rest.find('<') {
        out.push_str(&rest[..open]);
        let tail = &rest[open..];
        let Some(close) = tail.find('>') else {
            out.push_str(tail);
            rest = "";
            break;
        };
        let token = &tail[1..close];
        match token.to_ascii_lowercase().as_str() {
            "args" => out.push_str(args),
            "q-args" => out.push_str(&quote_string(args)),
            "bang" => out.push_str(if bang { "!" } else { "" }),
            "line1" => out.push_str(&lines.0.to_string()),
            "line2" => out.push_str(&lines.1.to_string()),
            "lt" => out.push('<'),
            _ => out.push_str(&tail[..=close]),
        }
        rest = &tail[close + 1..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn expands_placeholders() {
        assert_eq!(expand("echo <args>", "1 + 2", false, (1, 1)), "echo 1 + 2");
        assert_eq!(expand("echo <q-args>", "hi", false, (1, 1)), "echo 'hi'");
        assert_eq!(expand("unlet<bang> <args>", "x", true, (1, 1)), "unlet! x");
        assert_eq!(expand("<line1>,<line2>d", "", false, (2, 4)), "2,4d");
        assert_eq!(expand("echo '<lt>b>'", "", false, (1, 1)), "echo '<b>'");
        assert_eq!(expand("echo '<x>'", "", false, (1, 1)), "echo '<x>'");
        assert_eq!(expand("echo 1 < 2", "", false, (1, 1)), "echo 1 < 2");
    }

    #[test]
    fn alias_names() {
        assert!(is_alias_name("Greet2"));
        assert!(!is_alias_name("greet"));
        assert!(!is_alias_name("Gr-eet"));
    }
}
