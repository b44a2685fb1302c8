//! In-memory host for tests and the command-line runner.

use std::time::Duration;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use super::{
    run_shell, CursorId, EditorHost, HistoryKind, HistorySink, MessageSink, ProcessError,
    ProcessRunner, Register, RegisterStore,
};

type FilterFn = dyn FnMut(&str, &str) -> Result<String, ProcessError>;

/// A buffer of lines with carets, registers, history and captured
/// messages. Filters run through `sh -c` unless a runner is installed.
pub struct MemoryHost {
    lines: Vec<String>,
    cursors: Vec<(CursorId, usize)>,
    marks: FxHashMap<char, usize>,
    registers: FxHashMap<char, Register>,
    history: Vec<(HistoryKind, String)>,
    pub messages: Vec<String>,
    pub errors: Vec<String>,
    pub beeps: usize,
    pub visual: bool,
    pub modifiable: bool,
    pub redraws: usize,
    pub slept: Duration,
    runner: Option<Box<FilterFn>>,
}

impl MemoryHost {
    /// One empty line and one caret on it.
    pub fn new() -> Self {
        MemoryHost::from_text("")
    }

    /// Lines of `text`; a final newline does not start another line.
    pub fn from_text(text: &str) -> Self {
        let body = text.strip_suffix('\n').unwrap_or(text);
        MemoryHost {
            lines: body.split('\n').map(str::to_owned).collect(),
            cursors: vec![(CursorId(0), 1)],
            marks: FxHashMap::default(),
            registers: FxHashMap::default(),
            history: Vec::new(),
            messages: Vec::new(),
            errors: Vec::new(),
            beeps: 0,
            visual: false,
            modifiable: true,
            redraws: 0,
            slept: Duration::ZERO,
            runner: None,
        }
    }

    /// Replace the carets; ids follow the order given.
    #[must_use]
    pub fn with_cursors(mut self, lines: &[usize]) -> Self {
        self.cursors = lines
            .iter()
            .zip(0..)
            .map(|(&line, id)| (CursorId(id), line))
            .collect();
        self
    }

    /// Run filters through `runner` instead of the shell.
    #[must_use]
    pub fn with_runner(
        mut self,
        runner: impl FnMut(&str, &str) -> Result<String, ProcessError> + 'static,
    ) -> Self {
        self.runner = Some(Box::new(runner));
        self
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// The buffer with a newline after every line.
    pub fn text(&self) -> String {
        let mut text = self.lines.join("\n");
        text.push('\n');
        text
    }

    pub fn set_mark(&mut self, mark: char, line: usize) {
        self.marks.insert(mark, line);
    }

    /// Messages and errors captured since the last call.
    pub fn take_output(&mut self) -> (Vec<String>, Vec<String>) {
        (
            std::mem::take(&mut self.messages),
            std::mem::take(&mut self.errors),
        )
    }

    fn clamp_cursors(&mut self) {
        let last = self.lines.len();
        for (_, line) in &mut self.cursors {
            *line = (*line).clamp(1, last);
        }
    }
}

impl Default for MemoryHost {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorHost for MemoryHost {
    fn cursors(&self) -> SmallVec<[CursorId; 4]> {
        self.cursors.iter().map(|(id, _)| *id).collect()
    }

    fn cursor_line(&self, cursor: CursorId) -> usize {
        self.cursors
            .iter()
            .find(|(id, _)| *id == cursor)
            .map_or(1, |(_, line)| *line)
    }

    fn set_cursor_line(&mut self, cursor: CursorId, line: usize) {
        let last = self.lines.len();
        if let Some((_, slot)) = self.cursors.iter_mut().find(|(id, _)| *id == cursor) {
            *slot = line.clamp(1, last);
        }
    }

    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn line_text(&self, line: usize) -> Option<String> {
        line.checked_sub(1).and_then(|i| self.lines.get(i)).cloned()
    }

    fn replace_lines(&mut self, start: usize, end: usize, lines: Vec<String>) {
        let first = start.saturating_sub(1).min(self.lines.len());
        let last = end.min(self.lines.len()).max(first);
        self.lines.splice(first..last, lines);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        self.clamp_cursors();
    }

    fn delete_lines(&mut self, start: usize, end: usize) {
        let first = start.saturating_sub(1).min(self.lines.len());
        let last = end.min(self.lines.len()).max(first);
        let removed = last - first;
        self.lines.drain(first..last);
        if self.lines.is_empty() {
            self.lines.push(String::new());
        }
        for (_, line) in &mut self.cursors {
            if *line > last {
                *line -= removed;
            } else if *line > first {
                *line = first + 1;
            }
        }
        self.clamp_cursors();
    }

    fn insert_lines(&mut self, after: usize, lines: Vec<String>) {
        let at = after.min(self.lines.len());
        let added = lines.len();
        self.lines.splice(at..at, lines);
        for (_, line) in &mut self.cursors {
            if *line > at {
                *line += added;
            }
        }
    }

    fn file_size(&self) -> usize {
        self.lines.iter().map(|l| l.len() + 1).sum()
    }

    fn line_offset(&self, line: usize) -> usize {
        self.lines
            .iter()
            .take(line.saturating_sub(1))
            .map(|l| l.len() + 1)
            .sum()
    }

    fn read_range(&self, start: usize, end: usize) -> String {
        let text = self.text();
        let end = end.min(text.len());
        let start = start.min(end);
        String::from_utf8_lossy(&text.as_bytes()[start..end]).into_owned()
    }

    fn mark_line(&self, mark: char) -> Option<usize> {
        self.marks.get(&mark).copied()
    }

    fn is_visual(&self) -> bool {
        self.visual
    }

    fn exit_visual(&mut self) {
        self.visual = false;
    }

    fn is_modifiable(&self) -> bool {
        self.modifiable
    }

    fn redraw(&mut self) {
        self.redraws += 1;
    }

    fn sleep(&mut self, duration: Duration) {
        self.slept += duration;
    }
}

impl RegisterStore for MemoryHost {
    fn register(&self, name: char) -> Option<Register> {
        self.registers.get(&name).cloned()
    }

    fn set_register(&mut self, name: char, register: Register) {
        self.registers.insert(name, register);
    }

    fn registers(&self) -> Vec<(char, Register)> {
        let mut all: Vec<_> = self
            .registers
            .iter()
            .map(|(name, reg)| (*name, reg.clone()))
            .collect();
        all.sort_by_key(|(name, _)| *name);
        all
    }
}

impl HistorySink for MemoryHost {
    fn append(&mut self, kind: HistoryKind, text: &str) {
        self.history.push((kind, text.to_owned()));
    }

    fn entries(&self, kind: HistoryKind) -> Vec<String> {
        self.history
            .iter()
            .filter(|(k, _)| *k == kind)
            .map(|(_, text)| text.clone())
            .collect()
    }
}

impl MessageSink for MemoryHost {
    fn message(&mut self, text: &str) {
        self.messages.push(text.to_owned());
    }

    fn error(&mut self, text: &str) {
        self.errors.push(text.to_owned());
    }

    fn beep(&mut self) {
        self.beeps += 1;
    }
}

impl ProcessRunner for MemoryHost {
    fn run_filter(&mut self, command: &str, input: &str) -> Result<String, ProcessError> {
        match &mut self.runner {
            Some(runner) => runner(command, input),
            None => run_shell(command, input),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn host() -> MemoryHost {
        MemoryHost::from_text("one\ntwo\nthree\n").with_cursors(&[1, 3])
    }

    #[test]
    fn trailing_newline_is_not_a_line() {
        assert_eq!(host().line_count(), 3);
        assert_eq!(MemoryHost::new().line_count(), 1);
    }

    #[test]
    fn offsets_cover_newlines() {
        let host = host();
        assert_eq!(host.file_size(), 14);
        assert_eq!(host.line_offset(2), 4);
        assert_eq!(host.read_range(4, 8), "two\n");
    }

    #[test]
    fn deleting_shifts_later_cursors() {
        let mut host = host();
        host.delete_lines(1, 1);
        assert_eq!(host.lines(), ["two", "three"]);
        assert_eq!(host.cursor_line(CursorId(1)), 2);
        assert_eq!(host.cursor_line(CursorId(0)), 1);
    }

    #[test]
    fn deleting_everything_leaves_one_empty_line() {
        let mut host = host();
        host.delete_lines(1, 3);
        assert_eq!(host.lines(), [""]);
    }

    #[test]
    fn inserting_shifts_later_cursors() {
        let mut host = host();
        host.insert_lines(0, vec!["zero".into()]);
        assert_eq!(host.line_text(1).as_deref(), Some("zero"));
        assert_eq!(host.cursor_line(CursorId(0)), 2);
        assert_eq!(host.cursor_line(CursorId(1)), 4);
    }
}
