//! Compiled-pattern cache for `=~`, `split()` and `:global`.

use std::cell::RefCell;

use regex::{Regex, RegexBuilder};
use rustc_hash::FxHashMap;
use vim_syntax::pattern;
use vim_value::EvalError;

/// Compiled Vim patterns keyed by source text and case mode.
///
/// Scripts tend to match the same few patterns over and over (every
/// `filter(l, 'v:val =~ "x"')` callback, every line of `:g/pat/`), so a
/// pattern is translated and compiled once.
#[derive(Default)]
pub struct PatternCache {
    compiled: RefCell<FxHashMap<(String, bool), Regex>>,
}

impl PatternCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compile `pattern`. A `\c` or `\C` inside the pattern overrides
    /// `ignore_case`.
    pub fn compile(&self, pattern: &str, ignore_case: bool) -> Result<Regex, EvalError> {
        let key = (pattern.to_string(), ignore_case);
        if let Some(regex) = self.compiled.borrow().get(&key) {
            return Ok(regex.clone());
        }
        let translated = pattern::translate(pattern)?;
        let regex = RegexBuilder::new(&translated.regex)
            .case_insensitive(translated.ignore_case.unwrap_or(ignore_case))
            .build()
            .map_err(|err| {
                tracing::debug!(pattern, %err, "pattern rejected");
                EvalError::new(format!("E383: Invalid search string: {pattern}"))
            })?;
        self.compiled.borrow_mut().insert(key, regex.clone());
        Ok(regex)
    }

    pub fn is_match(&self, text: &str, pattern: &str, ignore_case: bool) -> Result<bool, EvalError> {
        Ok(self.compile(pattern, ignore_case)?.is_match(text))
    }
}
