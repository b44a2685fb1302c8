//! `:echo`, `:echomsg`, `:echoerr`, `:call` and `:execute`.

use vim_syntax::{parse_expression, parse_expression_list, ExprKind};
use vim_value::display::echo_string;
use vim_value::EvalError;

use super::Invocation;
use crate::dispatcher::{Dispatcher, ExecutionResult};

/// Evaluate every expression of the argument and join their echo forms
/// with spaces.
fn evaluate_joined(d: &mut Dispatcher, argument: &str) -> Result<String, EvalError> {
    let mut parts = Vec::new();
    for expr in parse_expression_list(argument)? {
        parts.push(echo_string(&d.interp.eval(&expr)?));
    }
    Ok(parts.join(" "))
}

pub fn echo(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let text = evaluate_joined(d, inv.argument())?;
    inv.host.message(&text);
    Ok(ExecutionResult::Success)
}

/// The message becomes a script error of its own.
pub fn echoerr(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let text = evaluate_joined(d, inv.argument())?;
    Err(EvalError::new(text))
}

/// `:call {func}({args})`: the result is thrown away.
pub fn call(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let argument = inv.argument();
    let expr = parse_expression(argument)?;
    if !matches!(expr.kind, ExprKind::Call { .. } | ExprKind::MethodCall { .. }) {
        return Err(EvalError::new(format!(
            "E129: Function name required: {argument}"
        )));
    }
    d.interp.eval(&expr)?;
    Ok(ExecutionResult::Success)
}

/// `:execute {expr} ...`: run the joined values as a command line.
pub fn execute(d: &mut Dispatcher, inv: &mut Invocation<'_>) -> Result<ExecutionResult, EvalError> {
    let text = evaluate_joined(d, inv.argument())?;
    tracing::trace!(%text, "execute");
    d.run(&mut *inv.host, &text, inv.ctx)
}

#[cfg(test)]
mod tests {
    #![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn joins_with_spaces() {
        let mut d = Dispatcher::new();
        assert_eq!(evaluate_joined(&mut d, "'a' 3 + 4").unwrap(), "a 7");
        assert_eq!(evaluate_joined(&mut d, "[1, 'x']").unwrap(), "[1, 'x']");
        assert_eq!(evaluate_joined(&mut d, "").unwrap(), "");
    }
}
