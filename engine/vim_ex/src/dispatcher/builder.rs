//! `DispatcherBuilder` for creating a Dispatcher over a configured
//! interpreter.

use rustc_hash::FxHashMap;
use vim_eval::{Interpreter, InterpreterBuilder};

use super::{DispatchOptions, Dispatcher};

#[derive(Default)]
pub struct DispatcherBuilder {
    interp: Option<Interpreter>,
    options: DispatchOptions,
}

impl DispatcherBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn interpreter(mut self, interp: Interpreter) -> Self {
        self.interp = Some(interp);
        self
    }

    /// Nested alias and register runs allowed before E169.
    #[must_use]
    pub fn max_alias_depth(mut self, depth: usize) -> Self {
        self.options.max_alias_depth = depth;
        self
    }

    #[must_use]
    pub fn history(mut self, enabled: bool) -> Self {
        self.options.history = enabled;
        self
    }

    #[must_use]
    pub fn cache_capacity(mut self, capacity: usize) -> Self {
        self.options.cache_capacity = capacity.max(1);
        self
    }

    pub fn build(self) -> Dispatcher {
        Dispatcher {
            interp: self
                .interp
                .unwrap_or_else(|| InterpreterBuilder::new().build()),
            aliases: FxHashMap::default(),
            options: self.options,
            cache: FxHashMap::default(),
            last_shell_command: None,
            last_register: None,
        }
    }
}
