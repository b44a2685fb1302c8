#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use vim_value::EvalErrorKind;

use super::*;
use crate::host::{HistorySink, MemoryHost, RegisterStore};

fn lines(host: &MemoryHost) -> Vec<&str> {
    host.lines().iter().map(String::as_str).collect()
}

// Validation

#[test]
fn forbidden_range_has_no_side_effect() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\n");
    let err = d.execute(&mut host, "1,2let g:x = 1", false).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::NoRangeAllowed);
    assert_eq!(d.interpreter().variable("g:x"), None);
    assert_eq!(host.errors, vec!["E481: No range allowed".to_string()]);
    assert_eq!(host.beeps, 1);
}

#[test]
fn unknown_command_is_reported_once() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    let err = d.execute(&mut host, "frobnicate", false).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnknownCommand {
            command: "frobnicate".into()
        }
    );
    assert_eq!(host.errors.len(), 1);
    assert_eq!(host.beeps, 1);
    assert_eq!(host.entries(HistoryKind::Command), Vec::<String>::new());
}

#[test]
fn errors_set_errmsg() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "echo g:nope", false).unwrap_err();
    assert_eq!(
        d.interpreter().variable("v:errmsg"),
        Some(Value::string("E121: Undefined variable: g:nope"))
    );
}

// Per-caret execution

#[test]
fn per_cursor_runs_in_order() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\nc\nd\n").with_cursors(&[1, 3]);
    d.execute(&mut host, "yank", false).unwrap();
    // The second caret's yank is the one left in the unnamed register.
    assert_eq!(host.register('"').unwrap().text, "c\n");
}

#[test]
fn failing_cursor_stops_the_rest() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("1\n2\n3\n4\n").with_cursors(&[1, 4, 2]);
    let err = d.execute(&mut host, ".+1d", false).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::InvalidRange);
    // The first caret deleted line 2; the third caret never ran.
    assert_eq!(lines(&host), vec!["1", "3", "4"]);
    assert_eq!(host.errors, vec!["E16: Invalid range".to_string()]);
    assert_eq!(host.beeps, 1);
}

#[test]
fn structured_failure_stops_the_rest() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\nc\nd\ne\n").with_cursors(&[1, 5, 3]);
    let result = d.execute(&mut host, "join", false).unwrap();
    assert_eq!(result, ExecutionResult::Error(None));
    assert_eq!(lines(&host), vec!["a b", "c", "d", "e"]);
    assert_eq!(host.errors, Vec::<String>::new());
    assert_eq!(host.beeps, 1);
}

#[test]
fn single_commands_run_once() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new().with_cursors(&[1, 1, 1]);
    d.execute(&mut host, "echo 'hi'", false).unwrap();
    assert_eq!(host.messages, vec!["hi".to_string()]);
}

// Pre- and post-steps

#[test]
fn visual_mode_is_left_unless_kept() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\n");
    host.visual = true;
    d.execute(&mut host, "echo 1", false).unwrap();
    assert!(host.visual);
    d.execute(&mut host, "yank", false).unwrap();
    assert!(!host.visual);
}

#[test]
fn unmodifiable_buffer_rejects_writes() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\n");
    host.modifiable = false;
    let result = d.execute(&mut host, "1d", false).unwrap();
    assert!(!result.is_success());
    assert_eq!(lines(&host), vec!["a", "b"]);
    assert_eq!(host.beeps, 1);
    d.execute(&mut host, "1y", false).unwrap();
}

#[test]
fn unmodifiable_buffer_rejects_range_filter() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("b\na\n").with_runner(|_, input| {
        let mut sorted: Vec<&str> = input.lines().collect();
        sorted.sort_unstable();
        Ok(sorted.iter().map(|line| format!("{line}\n")).collect())
    });
    host.modifiable = false;
    let result = d.execute(&mut host, "%!sort", false).unwrap();
    assert_eq!(
        result,
        ExecutionResult::error("E21: Cannot make changes, 'modifiable' is off")
    );
    assert_eq!(lines(&host), vec!["b", "a"]);
    assert_eq!(host.beeps, 1);

    // Without a range the output is only shown.
    d.execute(&mut host, "!echo", false).unwrap();
    host.modifiable = true;
    d.execute(&mut host, "%!sort", false).unwrap();
    assert_eq!(lines(&host), vec!["a", "b"]);
}

#[test]
fn history_records_successes_only() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, ":let g:a = 1", false).unwrap();
    d.execute(&mut host, "let g:b = 2", true).unwrap();
    d.execute(&mut host, "echo g:missing", false).unwrap_err();
    d.execute(&mut host, "history", false).unwrap();
    assert_eq!(
        host.entries(HistoryKind::Command),
        vec![":let g:a = 1".to_string()]
    );
}

#[test]
fn history_can_be_disabled() {
    let mut d = DispatcherBuilder::new().history(false).build();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "let g:a = 1", false).unwrap();
    assert_eq!(host.entries(HistoryKind::Command), Vec::<String>::new());
}

#[test]
fn blank_lines_succeed_quietly() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    assert_eq!(d.execute(&mut host, "", false).unwrap(), ExecutionResult::Success);
    assert_eq!(
        d.execute(&mut host, "\" comment", false).unwrap(),
        ExecutionResult::Success
    );
    assert_eq!(host.entries(HistoryKind::Command), Vec::<String>::new());
}

// Nesting

#[test]
fn execute_runs_nested_without_history() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "execute 'let g:n = ' .. (41 + 1)", false)
        .unwrap();
    assert_eq!(d.interpreter().variable("g:n"), Some(Value::int(42)));
    assert_eq!(host.entries(HistoryKind::Command).len(), 1);
}

#[test]
fn nested_error_is_reported_once() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "execute 'echo g:nope'", false)
        .unwrap_err();
    assert_eq!(host.errors.len(), 1);
    assert_eq!(host.beeps, 1);
}

#[test]
fn alias_expansion() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "command Say echo <q-args>", false)
        .unwrap();
    d.execute(&mut host, "Say hello there", false).unwrap();
    assert_eq!(host.messages, vec!["hello there".to_string()]);
}

#[test]
fn alias_redefinition_needs_bang() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "command Say echo 1", false).unwrap();
    assert!(d.execute(&mut host, "command Say echo 2", false).is_err());
    d.execute(&mut host, "command! Say echo 2", false).unwrap();
    assert_eq!(&*d.alias("Say").unwrap().replacement, "echo 2");
    d.execute(&mut host, "delcommand Say", false).unwrap();
    let err = d.execute(&mut host, "Say", false).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UnknownCommand {
            command: "Say".into()
        }
    );
}

#[test]
fn recursive_alias_hits_the_limit() {
    let mut d = DispatcherBuilder::new().max_alias_depth(5).build();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "command Loop Loop", false).unwrap();
    let err = d.execute(&mut host, "Loop", false).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::AliasRecursion);
    assert_eq!(host.errors, vec!["E169: Command too recursive".to_string()]);
}

#[test]
fn global_cannot_nest() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\n");
    let err = d
        .execute(&mut host, "g/a/g/b/d", false)
        .unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::GlobalRecursive);
}

#[test]
fn global_deletes_matching_lines() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("keep\ndrop 1\nkeep\ndrop 2\ndrop 3\n");
    d.execute(&mut host, "g/drop/d", false).unwrap();
    assert_eq!(lines(&host), vec!["keep", "keep"]);
    let mut host = MemoryHost::from_text("keep\ndrop 1\nkeep\n");
    d.execute(&mut host, "v/drop/d", false).unwrap();
    assert_eq!(lines(&host), vec!["drop 1"]);
}

#[test]
fn global_defaults_to_print() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("x1\ny\nx2\n");
    d.execute(&mut host, "g/x/", false).unwrap();
    assert_eq!(host.messages, vec!["x1".to_string(), "x2".to_string()]);
}

#[test]
fn global_runs_only_the_primary_cursor() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::from_text("a\nb\nc\n").with_cursors(&[1, 2, 3]);
    d.execute(&mut host, "g/b/d", false).unwrap();
    assert_eq!(lines(&host), vec!["a", "c"]);
}

#[test]
fn parsed_commands_are_reused() {
    let mut d = Dispatcher::new();
    let mut host = MemoryHost::new();
    d.execute(&mut host, "let g:i = 1", false).unwrap();
    d.execute(&mut host, "let g:i += 1", false).unwrap();
    d.execute(&mut host, "let g:i += 1", false).unwrap();
    assert_eq!(d.interpreter().variable("g:i"), Some(Value::int(3)));
    assert_eq!(d.cache.len(), 2);
}
