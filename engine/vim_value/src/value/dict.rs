//! Shared, insertion-ordered Dictionary storage.
//!
//! Entries live in a vector in insertion order; a hash index maps keys to
//! positions. Variable scopes (`g:`, `l:`, `a:`, `v:`) are Dictionaries
//! too, so an entry carries both a slot lock (`:lockvar`) and a read-only
//! flag for built-in pseudo-variables.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashMap;

use super::lock::LockState;
use super::Value;
use crate::errors::{key_not_present, locked_value, read_only_variable, EvalError};

#[derive(Clone, Debug)]
pub struct DictEntry {
    pub key: Rc<str>,
    pub value: Value,
    /// Slot lock set by `:lockvar`.
    pub locked: bool,
    /// Set on `a:` arguments and pseudo-variables such as `v:val`.
    pub read_only: bool,
}

#[derive(Debug, Default)]
pub struct DictData {
    entries: Vec<DictEntry>,
    index: FxHashMap<Rc<str>, usize>,
    pub lock: LockState,
}

impl DictData {
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, key: &str) -> Option<&DictEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn entry_mut(&mut self, key: &str) -> Option<&mut DictEntry> {
        let i = *self.index.get(key)?;
        Some(&mut self.entries[i])
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.entry(key).map(|e| &e.value)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn entries(&self) -> &[DictEntry] {
        &self.entries
    }

    pub fn entries_mut(&mut self) -> impl Iterator<Item = &mut DictEntry> + '_ {
        self.entries.iter_mut()
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.entries.iter().map(|e| &e.value)
    }

    /// Insert or replace without any lock checks; an existing entry keeps
    /// its position and flags.
    pub fn insert(&mut self, key: Rc<str>, value: Value) {
        if let Some(&i) = self.index.get(&key) {
            self.entries[i].value = value;
            return;
        }
        self.index.insert(Rc::clone(&key), self.entries.len());
        self.entries.push(DictEntry {
            key,
            value,
            locked: false,
            read_only: false,
        });
    }

    /// Remove without lock checks.
    pub fn remove(&mut self, key: &str) -> Option<DictEntry> {
        let i = self.index.remove(key)?;
        let entry = self.entries.remove(i);
        for slot in self.index.values_mut() {
            if *slot > i {
                *slot -= 1;
            }
        }
        Some(entry)
    }

    /// Keep only entries for which `keep` returns true, preserving order.
    pub fn retain(&mut self, mut keep: impl FnMut(&DictEntry) -> bool) {
        self.entries.retain(|e| keep(e));
        self.reindex();
    }

    fn reindex(&mut self) {
        self.index.clear();
        for (i, entry) in self.entries.iter().enumerate() {
            self.index.insert(Rc::clone(&entry.key), i);
        }
    }
}

/// Reference-counted handle to a Dictionary; cloning aliases.
#[derive(Clone, Default)]
pub struct DictRef(Rc<RefCell<DictData>>);

impl DictRef {
    pub fn new() -> Self {
        DictRef::default()
    }

    pub fn from_pairs<K: Into<Rc<str>>>(pairs: impl IntoIterator<Item = (K, Value)>) -> Self {
        let mut data = DictData::default();
        for (key, value) in pairs {
            data.insert(key.into(), value);
        }
        DictRef(Rc::new(RefCell::new(data)))
    }

    pub fn borrow(&self) -> Ref<'_, DictData> {
        self.0.borrow()
    }

    /// Raw mutable access with no lock checks.
    pub fn borrow_mut(&self) -> RefMut<'_, DictData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &DictRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.0.borrow().get(key).cloned()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.borrow().contains_key(key)
    }

    pub fn keys(&self) -> Vec<Rc<str>> {
        self.0
            .borrow()
            .entries()
            .iter()
            .map(|e| Rc::clone(&e.key))
            .collect()
    }

    /// Snapshot of `(key, value)` pairs in insertion order.
    pub fn to_pairs(&self) -> Vec<(Rc<str>, Value)> {
        self.0
            .borrow()
            .entries()
            .iter()
            .map(|e| (Rc::clone(&e.key), e.value.clone()))
            .collect()
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().lock.is_locked()
    }

    pub fn check_unlocked(&self, what: &str) -> Result<(), EvalError> {
        if self.is_locked() {
            Err(locked_value(what))
        } else {
            Ok(())
        }
    }

    /// Item assignment (`d.k = v`, `extend()`): replacing an existing
    /// entry checks its slot, adding a key checks the container.
    pub fn set(&self, key: &str, value: Value, what: &str) -> Result<(), EvalError> {
        let mut data = self.0.borrow_mut();
        if let Some(entry) = data.entry_mut(key) {
            if entry.read_only {
                return Err(read_only_variable(what));
            }
            if entry.locked {
                return Err(locked_value(what));
            }
            entry.value = value;
            return Ok(());
        }
        if data.lock.is_locked() {
            return Err(locked_value(what));
        }
        data.insert(Rc::from(key), value);
        Ok(())
    }

    /// Insert or replace without lock checks.
    pub fn insert(&self, key: impl Into<Rc<str>>, value: Value) {
        self.0.borrow_mut().insert(key.into(), value);
    }

    /// Remove a key for `remove()`/`:unlet`. Only the container lock and
    /// the read-only flag are consulted.
    pub fn remove(&self, key: &str, what: &str) -> Result<Value, EvalError> {
        let mut data = self.0.borrow_mut();
        if data.lock.is_locked() {
            return Err(locked_value(what));
        }
        match data.entry(key) {
            None => return Err(key_not_present(key)),
            Some(entry) if entry.read_only => return Err(read_only_variable(what)),
            Some(_) => {}
        }
        data.remove(key)
            .map(|e| e.value)
            .ok_or_else(|| key_not_present(key))
    }

    /// Flag an entry as read-only (or clear the flag).
    pub fn set_read_only(&self, key: &str, read_only: bool) {
        if let Some(entry) = self.0.borrow_mut().entry_mut(key) {
            entry.read_only = read_only;
        }
    }
}

impl fmt::Debug for DictRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DictRef({:#x}, len={})", self.addr(), self.len())
    }
}
