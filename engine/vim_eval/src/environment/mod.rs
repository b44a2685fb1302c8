//! Variable store for the interpreter.
//!
//! Every scope is a [`DictRef`], so `g:` and friends read as Dictionaries
//! (`keys(g:)`) and a binding's slot lock is simply its entry's `locked`
//! flag. Function calls push a [`Frame`] holding their `l:` and `a:`
//! dictionaries; frames are a stack, not copies.

use std::rc::Rc;

use vim_syntax::{ScopeKind, VarName};
use vim_value::{
    locked_value, no_such_variable, read_only_variable, undefined_variable, Closure, DictRef,
    EvalError, LockDepth, Value, ValueType, VimInt,
};

/// What kind of callable pushed a frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// User function: unqualified names mean `l:`.
    Function,
    /// Lambda: unqualified names search the parameters, the closure and
    /// finally `g:`.
    Lambda,
}

/// One active call.
#[derive(Clone, Debug)]
pub struct Frame {
    pub name: Rc<str>,
    pub kind: FrameKind,
    pub locals: DictRef,
    pub args: DictRef,
    pub closure: Option<Closure>,
}

impl Frame {
    pub fn new(name: Rc<str>, kind: FrameKind) -> Self {
        Frame {
            name,
            kind,
            locals: DictRef::new(),
            args: DictRef::new(),
            closure: None,
        }
    }
}

/// Scoped variable store.
pub struct Environment {
    global: DictRef,
    script: DictRef,
    vim: DictRef,
    buffer: DictRef,
    window: DictRef,
    tab: DictRef,
    frames: Vec<Frame>,
}

/// Where a name lives, or would be created.
struct Slot {
    dict: DictRef,
    key: Rc<str>,
    /// Fully qualified name for messages.
    qualified: String,
    read_only_scope: bool,
}

impl Environment {
    pub fn new() -> Self {
        let env = Environment {
            global: DictRef::new(),
            script: DictRef::new(),
            vim: DictRef::new(),
            buffer: DictRef::new(),
            window: DictRef::new(),
            tab: DictRef::new(),
            frames: Vec::new(),
        };
        env.init_vim_vars();
        env
    }

    fn init_vim_vars(&self) {
        let int = Value::int;
        let read_only = [
            ("true", int(1)),
            ("false", int(0)),
            ("null", int(0)),
            ("none", int(0)),
            ("t_number", int(ValueType::Number.type_code())),
            ("t_string", int(ValueType::String.type_code())),
            ("t_func", int(ValueType::Funcref.type_code())),
            ("t_list", int(ValueType::List.type_code())),
            ("t_dict", int(ValueType::Dict.type_code())),
            ("t_float", int(ValueType::Float.type_code())),
            ("t_blob", int(ValueType::Blob.type_code())),
            ("numbermax", Value::Number(VimInt::MAX)),
            ("numbermin", Value::Number(VimInt::MIN)),
            ("numbersize", int(32)),
            ("count", int(0)),
            ("count1", int(1)),
            ("version", int(900)),
        ];
        for (name, value) in read_only {
            self.vim.insert(name, value);
            self.vim.set_read_only(name, true);
        }
        self.vim.insert("errmsg", Value::empty_string());
    }

    /// Dictionary backing a scope. `l:` and `a:` exist only inside a call.
    pub fn scope_dict(&self, scope: ScopeKind) -> Option<DictRef> {
        let dict = match scope {
            ScopeKind::Global => &self.global,
            ScopeKind::Script => &self.script,
            ScopeKind::Vim => &self.vim,
            ScopeKind::Buffer => &self.buffer,
            ScopeKind::Window => &self.window,
            ScopeKind::Tab => &self.tab,
            ScopeKind::Local => &self.frames.last()?.locals,
            ScopeKind::Argument => &self.frames.last()?.args,
        };
        Some(dict.clone())
    }

    pub fn global(&self) -> &DictRef {
        &self.global
    }

    // Frames

    pub fn push_frame(&mut self, frame: Frame) {
        tracing::trace!(name = %frame.name, depth = self.frames.len() + 1, "push frame");
        self.frames.push(frame);
    }

    pub fn pop_frame(&mut self) -> Option<Frame> {
        self.frames.pop()
    }

    pub fn current_frame(&self) -> Option<&Frame> {
        self.frames.last()
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    // Lookup

    fn qualified(scope: ScopeKind, name: &str) -> String {
        format!("{}{name}", scope.prefix())
    }

    /// Candidate dictionaries for an unqualified name, in search order.
    fn search_path(&self) -> Vec<(DictRef, ScopeKind)> {
        match self.frames.last() {
            None => vec![(self.global.clone(), ScopeKind::Global)],
            Some(frame) if frame.kind == FrameKind::Function => {
                vec![(frame.locals.clone(), ScopeKind::Local)]
            }
            Some(frame) => {
                let mut path = vec![
                    (frame.args.clone(), ScopeKind::Argument),
                    (frame.locals.clone(), ScopeKind::Local),
                ];
                if let Some(closure) = &frame.closure {
                    path.push((closure.locals.clone(), ScopeKind::Local));
                    path.push((closure.args.clone(), ScopeKind::Argument));
                }
                path.push((self.global.clone(), ScopeKind::Global));
                path
            }
        }
    }

    /// Scope an unqualified name is created in.
    fn default_scope(&self) -> ScopeKind {
        if self.frames.is_empty() {
            ScopeKind::Global
        } else {
            ScopeKind::Local
        }
    }

    /// Resolve a name to the slot holding it. For unqualified names that
    /// are not bound anywhere, the slot where an assignment would create
    /// the binding.
    fn slot(&self, name: &VarName) -> Result<Slot, EvalError> {
        let key = Rc::clone(&name.name);
        if let Some(scope) = name.scope {
            let qualified = Self::qualified(scope, &key);
            let dict = self
                .scope_dict(scope)
                .ok_or_else(|| undefined_variable(&qualified))?;
            return Ok(Slot {
                dict,
                key,
                qualified,
                read_only_scope: scope == ScopeKind::Argument,
            });
        }
        for (dict, scope) in self.search_path() {
            if dict.contains_key(&key) {
                return Ok(Slot {
                    dict,
                    qualified: Self::qualified(scope, &key),
                    key,
                    read_only_scope: scope == ScopeKind::Argument,
                });
            }
        }
        let scope = self.default_scope();
        let dict = self
            .scope_dict(scope)
            .ok_or_else(|| undefined_variable(&key))?;
        Ok(Slot {
            dict,
            qualified: Self::qualified(scope, &key),
            key,
            read_only_scope: false,
        })
    }

    /// Value of a variable, or `None` when unbound.
    pub fn lookup(&self, name: &VarName) -> Option<Value> {
        let slot = self.slot(name).ok()?;
        slot.dict.get(&slot.key)
    }

    /// Value of a variable; unbound names are an error carrying the
    /// qualified name.
    pub fn get(&self, name: &VarName) -> Result<Value, EvalError> {
        let slot = self.slot(name)?;
        slot.dict
            .get(&slot.key)
            .ok_or_else(|| undefined_variable(&slot.qualified))
    }

    /// Bind or rebind a variable.
    ///
    /// Rebinding a locked or read-only binding fails with
    /// `ReadOnlyVariable`; the value a locked binding holds is untouched.
    pub fn set(&self, name: &VarName, value: Value) -> Result<(), EvalError> {
        let slot = self.slot(name)?;
        if slot.read_only_scope {
            return Err(read_only_variable(&slot.qualified));
        }
        {
            let mut data = slot.dict.borrow_mut();
            if let Some(entry) = data.entry_mut(&slot.key) {
                if entry.read_only || entry.locked {
                    return Err(read_only_variable(&slot.qualified));
                }
                entry.value = value;
                return Ok(());
            }
        }
        if name.scope == Some(ScopeKind::Vim) {
            return Err(EvalError::new(format!(
                "E461: Illegal variable name: {}",
                slot.qualified
            )));
        }
        if slot.dict.is_locked() {
            return Err(locked_value(&slot.qualified));
        }
        slot.dict.insert(slot.key, value);
        Ok(())
    }

    /// Set a `v:` variable regardless of its read-only flag.
    pub fn set_vim_var(&self, name: &str, value: Value) {
        self.vim.insert(name, value);
    }

    /// Remove a binding. Missing names fail unless `force` (`:unlet!`).
    pub fn unlet(&self, name: &VarName, force: bool) -> Result<(), EvalError> {
        let slot = self.slot(name)?;
        let (locked, read_only) = match slot.dict.borrow().entry(&slot.key) {
            None if force => return Ok(()),
            None => return Err(no_such_variable(&slot.qualified)),
            Some(entry) => (entry.locked, entry.read_only),
        };
        if slot.read_only_scope || read_only {
            return Err(read_only_variable(&slot.qualified));
        }
        if locked {
            return Err(locked_value(&slot.qualified));
        }
        slot.dict.remove(&slot.key, &slot.qualified).map(|_| ())
    }

    /// `:lockvar` / `:unlockvar` on a whole variable: the binding slot
    /// itself plus the value to `depth`.
    pub fn set_lock(&self, name: &VarName, depth: LockDepth, lock: bool) -> Result<(), EvalError> {
        let slot = self.slot(name)?;
        let value = {
            let mut data = slot.dict.borrow_mut();
            let Some(entry) = data.entry_mut(&slot.key) else {
                return Err(no_such_variable(&slot.qualified));
            };
            entry.locked = lock;
            entry.value.clone()
        };
        tracing::debug!(name = %slot.qualified, depth = depth.raw(), lock, "lockvar");
        let owner: Rc<str> = Rc::from(slot.qualified.as_str());
        value.set_lock(depth, lock, Some(&owner));
        Ok(())
    }

    /// Whether the binding or the container it holds is locked.
    pub fn is_locked(&self, name: &VarName) -> Result<bool, EvalError> {
        let slot = self.slot(name)?;
        let data = slot.dict.borrow();
        let entry = data
            .entry(&slot.key)
            .ok_or_else(|| undefined_variable(&slot.qualified))?;
        Ok(entry.locked || entry.value.is_locked())
    }

    /// Bind `v:key` and `v:val` for one callback invocation.
    pub fn callback_vars(&self, key: Value, val: Value) -> VimVarGuard {
        VimVarGuard::new(&self.vim, key, val)
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self::new()
    }
}

/// Restores `v:key` and `v:val` when dropped, so a callback nested in
/// another callback leaves the outer view intact.
#[must_use = "v:key and v:val are restored when the guard drops"]
pub struct VimVarGuard {
    vim: DictRef,
    saved_key: Option<Value>,
    saved_val: Option<Value>,
}

impl VimVarGuard {
    fn new(vim: &DictRef, key: Value, val: Value) -> Self {
        let guard = VimVarGuard {
            vim: vim.clone(),
            saved_key: vim.get("key"),
            saved_val: vim.get("val"),
        };
        for (name, value) in [("key", key), ("val", val)] {
            vim.insert(name, value);
            vim.set_read_only(name, true);
        }
        guard
    }
}

impl Drop for VimVarGuard {
    fn drop(&mut self) {
        for (name, saved) in [("key", self.saved_key.take()), ("val", self.saved_val.take())] {
            let mut data = self.vim.borrow_mut();
            match saved {
                Some(value) => match data.entry_mut(name) {
                    Some(entry) => entry.value = value,
                    None => data.insert(Rc::from(name), value),
                },
                None => {
                    data.remove(name);
                }
            }
        }
    }
}
