//! `InterpreterBuilder` for creating Interpreter instances with various configurations.

use rustc_hash::FxHashMap;

use super::{EvalOptions, Interpreter};
use crate::environment::Environment;
use crate::pattern::PatternCache;

/// Builder for [`Interpreter`].
///
/// Defaults match Vim: `'noignorecase'` and a call depth limit of 100.
#[derive(Default)]
pub struct InterpreterBuilder {
    env: Option<Environment>,
    options: EvalOptions,
}

impl InterpreterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing variable store.
    #[must_use]
    pub fn env(mut self, env: Environment) -> Self {
        self.env = Some(env);
        self
    }

    #[must_use]
    pub fn ignorecase(mut self, ignorecase: bool) -> Self {
        self.options.ignorecase = ignorecase;
        self
    }

    /// Nested calls allowed before E132.
    #[must_use]
    pub fn max_call_depth(mut self, depth: usize) -> Self {
        self.options.max_call_depth = depth;
        self
    }

    pub fn build(self) -> Interpreter {
        Interpreter {
            env: self.env.unwrap_or_default(),
            options: self.options,
            functions: FxHashMap::default(),
            patterns: PatternCache::new(),
            extra_options: FxHashMap::default(),
            env_overrides: FxHashMap::default(),
            lambda_counter: 0,
        }
    }
}
