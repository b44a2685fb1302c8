//! Host collaborators.
//!
//! The dispatcher owns no buffer, registers or history. It reaches them
//! through these traits, which the embedding editor implements. All calls
//! happen on the thread that owns the editing session, so every method
//! takes plain `&self`/`&mut self`.
//!
//! Line numbers are 1-based like Vim's; line 0 is only meaningful as the
//! "before the first line" address of `:put` and `:insert_lines`.

mod memory;
mod process;

use std::time::Duration;

use smallvec::SmallVec;
use vim_value::{process_failed, process_terminated, EvalError};

pub use memory::MemoryHost;
pub use process::run_shell;

/// Stable identity of one caret.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CursorId(pub u32);

/// How register text was captured, which decides how it is put back.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum SelectionKind {
    Char,
    Line,
    Block,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Register {
    pub text: String,
    pub kind: SelectionKind,
}

impl Register {
    pub fn new(text: impl Into<String>, kind: SelectionKind) -> Self {
        Register {
            text: text.into(),
            kind,
        }
    }

    /// Whole lines joined by `\n`, with the trailing newline Vim keeps on
    /// linewise registers.
    pub fn linewise(lines: &[String]) -> Self {
        let mut text = lines.join("\n");
        text.push('\n');
        Register::new(text, SelectionKind::Line)
    }

    /// The register as lines for `:put`, which is always linewise.
    pub fn lines(&self) -> Vec<String> {
        let text = self.text.strip_suffix('\n').unwrap_or(&self.text);
        text.split('\n').map(str::to_owned).collect()
    }
}

/// History categories the dispatcher writes to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum HistoryKind {
    Command,
    Expression,
}

/// Failure of an external filter process.
#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    /// The user interrupted the process.
    #[error("interrupted")]
    Interrupted,
    #[error("exit status {status}: {stderr}")]
    Failed { status: i32, stderr: String },
    #[error("cannot start shell: {0}")]
    Spawn(#[from] std::io::Error),
}

impl From<ProcessError> for EvalError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Interrupted => process_terminated(),
            other => process_failed(other.to_string()),
        }
    }
}

/// Buffer text, carets and visual state.
pub trait EditorHost {
    /// Every caret, in a stable order. The first one is the primary caret.
    fn cursors(&self) -> SmallVec<[CursorId; 4]>;
    fn cursor_line(&self, cursor: CursorId) -> usize;
    fn set_cursor_line(&mut self, cursor: CursorId, line: usize);

    fn line_count(&self) -> usize;
    /// Text of a line without its newline; `None` past the end.
    fn line_text(&self, line: usize) -> Option<String>;
    /// Replace lines `start..=end` with `lines`.
    fn replace_lines(&mut self, start: usize, end: usize, lines: Vec<String>);
    /// Delete lines `start..=end`.
    fn delete_lines(&mut self, start: usize, end: usize);
    /// Insert `lines` after line `after` (0 inserts at the top).
    fn insert_lines(&mut self, after: usize, lines: Vec<String>);

    /// Size of the buffer in bytes, newlines included.
    fn file_size(&self) -> usize;
    /// Byte offset where `line` starts.
    fn line_offset(&self, line: usize) -> usize;
    /// Text between two byte offsets.
    fn read_range(&self, start: usize, end: usize) -> String;

    /// Line of a mark such as `'a`, if set.
    fn mark_line(&self, mark: char) -> Option<usize>;

    fn is_visual(&self) -> bool;
    fn exit_visual(&mut self);

    /// `'modifiable'`: whether commands may change the buffer.
    fn is_modifiable(&self) -> bool {
        true
    }

    fn redraw(&mut self) {}

    fn sleep(&mut self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Registers keyed by a single character.
pub trait RegisterStore {
    fn register(&self, name: char) -> Option<Register>;
    fn set_register(&mut self, name: char, register: Register);
    /// Non-empty registers, for `:registers`.
    fn registers(&self) -> Vec<(char, Register)> {
        Vec::new()
    }
}

pub trait HistorySink {
    fn append(&mut self, kind: HistoryKind, text: &str);
    /// Entries oldest first, for `:history` and `:@:`.
    fn entries(&self, _kind: HistoryKind) -> Vec<String> {
        Vec::new()
    }
}

/// Status-line output.
pub trait MessageSink {
    fn message(&mut self, text: &str);
    fn error(&mut self, text: &str);
    fn beep(&mut self);
}

pub trait ProcessRunner {
    /// Run `command` through the shell with `input` on stdin; returns
    /// stdout.
    fn run_filter(&mut self, command: &str, input: &str) -> Result<String, ProcessError>;
}

/// Everything the dispatcher needs from its host.
pub trait Host: EditorHost + RegisterStore + HistorySink + MessageSink + ProcessRunner {}

impl<T> Host for T where T: EditorHost + RegisterStore + HistorySink + MessageSink + ProcessRunner {}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use vim_value::EvalErrorKind;

    #[test]
    fn register_lines_drop_trailing_newline() {
        let reg = Register::linewise(&["a".to_string(), "b".to_string()]);
        assert_eq!(reg.text, "a\nb\n");
        assert_eq!(reg.lines(), vec!["a".to_string(), "b".to_string()]);
        let chars = Register::new("word", SelectionKind::Char);
        assert_eq!(chars.lines(), vec!["word".to_string()]);
    }

    #[test]
    fn interrupt_becomes_terminated() {
        let err = EvalError::from(ProcessError::Interrupted);
        assert_eq!(err.kind, EvalErrorKind::ProcessTerminated);
        let err = EvalError::from(ProcessError::Failed {
            status: 2,
            stderr: "boom".into(),
        });
        assert!(matches!(err.kind, EvalErrorKind::ProcessFailed { .. }));
    }
}
