//! Running a whole script, one statement at a time.

use vim_value::EvalError;

use super::{Dispatcher, ExecutionResult};
use crate::host::Host;

/// A statement that failed, by the script line it started on.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScriptFailure {
    pub line: usize,
    pub message: Option<String>,
}

/// What happened when a script ran. A failed statement does not stop
/// the ones after it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ScriptReport {
    pub statements: usize,
    pub failures: Vec<ScriptFailure>,
}

impl ScriptReport {
    pub fn error_count(&self) -> usize {
        self.failures.len()
    }

    pub fn has_errors(&self) -> bool {
        !self.failures.is_empty()
    }
}

impl Dispatcher {
    /// Run every statement of `source`. Lines starting with `\` continue
    /// the previous line and `"\ ` lines inside a continuation are
    /// comments. Statements are not recorded in history.
    pub fn execute_script(&mut self, host: &mut dyn Host, source: &str) -> ScriptReport {
        let mut report = ScriptReport::default();
        for (line, statement) in join_continuations(source) {
            report.statements += 1;
            let failure = match self.execute(host, &statement, true) {
                Ok(ExecutionResult::Success) => None,
                Ok(ExecutionResult::Error(message)) => Some(message),
                Err(EvalError { message, .. }) => Some(Some(message)),
            };
            if let Some(message) = failure {
                tracing::debug!(line, "script statement failed");
                report.failures.push(ScriptFailure { line, message });
            }
        }
        report
    }
}

/// Statements with the 1-based line each one starts on.
fn join_continuations(source: &str) -> Vec<(usize, String)> {
    let mut statements: Vec<(usize, String)> = Vec::new();
    for (index, raw) in source.lines().enumerate() {
        let trimmed = raw.trim_start();
        if trimmed.starts_with("\"\\ ") {
            continue;
        }
        if let Some(rest) = trimmed.strip_prefix('\\') {
            if let Some((_, statement)) = statements.last_mut() {
                statement.push_str(rest);
                continue;
            }
        }
        statements.push((index + 1, raw.to_owned()));
    }
    statements
        .into_iter()
        .filter(|(_, s)| {
            let s = s.trim_start_matches(|c: char| c == ':' || c.is_whitespace());
            !s.is_empty() && !s.starts_with('"')
        })
        .collect()
}
