//! Property tests for command-line parsing and range resolution.

#![allow(clippy::unwrap_used, clippy::expect_used, reason = "Tests can panic")]

use proptest::prelude::*;
use vim_ex::parse::parse_command_line;
use vim_ex::range::parse_range;
use vim_ex::{Dispatcher, MemoryHost};

fn buffer(lines: usize) -> MemoryHost {
    let text: String = (1..=lines).map(|n| format!("{n}\n")).collect();
    MemoryHost::from_text(&text)
}

fn address() -> impl Strategy<Value = String> {
    prop_oneof![
        (0usize..40).prop_map(|n| n.to_string()),
        Just(".".to_string()),
        Just("$".to_string()),
        (0i64..10).prop_map(|n| format!(".+{n}")),
        (0i64..10).prop_map(|n| format!("$-{n}")),
        (1i64..5).prop_map(|n| format!("+{n}")),
    ]
}

proptest! {
    #[test]
    fn parsing_never_panics(text in "[ -~]{0,40}") {
        let _ = parse_command_line(&text);
        let _ = parse_range(&text);
    }

    #[test]
    fn resolved_ranges_lie_inside_the_buffer(
        lines in 1usize..30,
        cursor in 1usize..30,
        first in address(),
        second in address(),
        semicolon in any::<bool>(),
    ) {
        let cursor = cursor.min(lines);
        let host = buffer(lines).with_cursors(&[cursor]);
        let separator = if semicolon { ';' } else { ',' };
        let text = format!("{first}{separator}{second}");
        let (spec, rest) = parse_range(&text).unwrap();
        prop_assert_eq!(rest, "");
        let spec = spec.unwrap();
        if let Ok(range) = spec.resolve(&host, cursor) {
            prop_assert!(range.start <= range.end);
            prop_assert!(range.end <= lines);
        }
    }

    #[test]
    fn delete_keeps_the_other_lines(lines in 1usize..20, start in 1usize..20, len in 1usize..5) {
        let mut host = buffer(lines);
        let mut dispatcher = Dispatcher::new();
        let end = start + len - 1;
        let result = dispatcher.execute(&mut host, &format!("{start},{end}d"), false);
        if end <= lines {
            prop_assert!(result.is_ok());
            let expected: Vec<String> = (1..=lines)
                .filter(|n| *n < start || *n > end)
                .map(|n| n.to_string())
                .collect();
            if expected.is_empty() {
                prop_assert_eq!(host.lines().len(), 1);
            } else {
                prop_assert_eq!(host.lines(), expected.as_slice());
            }
        } else {
            prop_assert!(result.is_err());
            prop_assert_eq!(host.lines().len(), lines);
        }
    }
}
