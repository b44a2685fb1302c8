//! Runtime values of Vim script.
//!
//! `Value` is a closed variant type. Scalars are held inline; Lists,
//! Dictionaries and Blobs are shared handles (`Rc<RefCell<_>>`), so
//! assigning one to a second variable aliases it rather than copying.
//! Construct values through the factory methods (`Value::int`,
//! `Value::list`, ...).

mod blob;
mod copy;
mod dict;
mod funcref;
mod list;
mod lock;
mod vim_int;

use std::fmt;
use std::rc::Rc;

use rustc_hash::FxHashSet;
use vim_syntax::ensure_sufficient_stack;

pub use blob::{BlobData, BlobRef};
pub use dict::{DictData, DictEntry, DictRef};
pub use funcref::{Closure, FuncTarget, Funcref, FuncrefKind, Lambda};
pub use list::{resolve_index, ListData, ListItem, ListRef};
pub use lock::{LockDepth, LockState};
pub use vim_int::VimInt;

/// Runtime type tag, as reported by `type()`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ValueType {
    Number,
    String,
    Funcref,
    List,
    Dict,
    Float,
    Blob,
}

impl ValueType {
    pub const fn name(self) -> &'static str {
        match self {
            ValueType::Number => "Number",
            ValueType::String => "String",
            ValueType::Funcref => "Funcref",
            ValueType::List => "List",
            ValueType::Dict => "Dictionary",
            ValueType::Float => "Float",
            ValueType::Blob => "Blob",
        }
    }

    /// Numeric code returned by `type()` (`v:t_number` and friends).
    pub const fn type_code(self) -> i32 {
        match self {
            ValueType::Number => 0,
            ValueType::String => 1,
            ValueType::Funcref => 2,
            ValueType::List => 3,
            ValueType::Dict => 4,
            ValueType::Float => 5,
            ValueType::Blob => 10,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A Vim script value.
#[derive(Clone)]
pub enum Value {
    /// 32-bit wrapping integer.
    Number(VimInt),
    Float(f64),
    String(Rc<str>),
    List(ListRef),
    Dict(DictRef),
    Blob(BlobRef),
    Funcref(Funcref),
}

// Factory methods

impl Value {
    #[inline]
    pub fn int(n: i32) -> Self {
        Value::Number(VimInt::new(n))
    }

    #[inline]
    pub fn number(n: VimInt) -> Self {
        Value::Number(n)
    }

    /// `v:true` / `v:false` as Numbers.
    #[inline]
    pub fn bool(b: bool) -> Self {
        Value::Number(VimInt::from(b))
    }

    #[inline]
    pub fn float(f: f64) -> Self {
        Value::Float(f)
    }

    pub fn string(s: impl Into<Rc<str>>) -> Self {
        Value::String(s.into())
    }

    pub fn empty_string() -> Self {
        Value::String(Rc::from(""))
    }

    pub fn list(items: Vec<Value>) -> Self {
        Value::List(ListRef::new(items))
    }

    pub fn dict<K: Into<Rc<str>>>(entries: impl IntoIterator<Item = (K, Value)>) -> Self {
        Value::Dict(DictRef::from_pairs(entries))
    }

    pub fn blob(bytes: Vec<u8>) -> Self {
        Value::Blob(BlobRef::new(bytes))
    }

    pub fn funcref(f: Funcref) -> Self {
        Value::Funcref(f)
    }
}

// Queries

impl Value {
    pub fn value_type(&self) -> ValueType {
        match self {
            Value::Number(_) => ValueType::Number,
            Value::Float(_) => ValueType::Float,
            Value::String(_) => ValueType::String,
            Value::List(_) => ValueType::List,
            Value::Dict(_) => ValueType::Dict,
            Value::Blob(_) => ValueType::Blob,
            Value::Funcref(_) => ValueType::Funcref,
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.value_type().name()
    }

    pub fn as_list(&self) -> Option<&ListRef> {
        match self {
            Value::List(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_dict(&self) -> Option<&DictRef> {
        match self {
            Value::Dict(d) => Some(d),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_funcref(&self) -> Option<&Funcref> {
        match self {
            Value::Funcref(f) => Some(f),
            _ => None,
        }
    }

    /// Whether the value is a List, Dictionary or Blob.
    pub fn is_container(&self) -> bool {
        matches!(self, Value::List(_) | Value::Dict(_) | Value::Blob(_))
    }

    /// Container lock state; scalars are never locked themselves.
    pub fn is_locked(&self) -> bool {
        match self {
            Value::List(l) => l.is_locked(),
            Value::Dict(d) => d.is_locked(),
            Value::Blob(b) => b.is_locked(),
            _ => false,
        }
    }

    /// Length as reported by `len()`: items, entries, bytes or string
    /// bytes. `None` for Float and Funcref.
    pub fn len(&self) -> Option<usize> {
        match self {
            Value::Number(n) => Some(n.to_string().len()),
            Value::String(s) => Some(s.len()),
            Value::List(l) => Some(l.len()),
            Value::Dict(d) => Some(d.len()),
            Value::Blob(b) => Some(b.len()),
            Value::Float(_) | Value::Funcref(_) => None,
        }
    }

    /// Vim's `empty()`.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Number(n) => n.is_zero(),
            Value::Float(f) => *f == 0.0,
            Value::String(s) => s.is_empty(),
            Value::List(l) => l.is_empty(),
            Value::Dict(d) => d.is_empty(),
            Value::Blob(b) => b.is_empty(),
            Value::Funcref(_) => false,
        }
    }
}

// Locking

impl Value {
    /// Lock or unlock the containers reachable from this value.
    ///
    /// `depth` is counted from the slot holding the value: at 0 nothing
    /// here changes (the caller handles the slot), at 1 the item slots, at
    /// 2 the container too and the item slots of the containers it holds,
    /// and so on. Cycles are visited once.
    pub fn set_lock(&self, depth: LockDepth, lock: bool, owner: Option<&Rc<str>>) {
        tracing::trace!(depth = depth.raw(), lock, "propagating lock");
        let mut visited = FxHashSet::default();
        set_lock_inner(self, depth, lock, owner, &mut visited);
    }
}

fn set_lock_inner(
    value: &Value,
    depth: LockDepth,
    lock: bool,
    owner: Option<&Rc<str>>,
    visited: &mut FxHashSet<usize>,
) {
    if !depth.covers_items() {
        return;
    }
    let addr = match value {
        Value::List(l) => l.addr(),
        Value::Dict(d) => d.addr(),
        Value::Blob(b) => b.addr(),
        _ => return,
    };
    if !visited.insert(addr) {
        return;
    }
    let apply = |state: &mut LockState| {
        if lock {
            state.lock(owner.cloned(), depth);
        } else {
            state.unlock();
        }
    };
    ensure_sufficient_stack(|| match value {
        Value::List(list) => {
            let children: Vec<Value> = {
                let mut data = list.borrow_mut();
                if depth.covers_container() {
                    apply(&mut data.lock);
                }
                for item in &mut data.items {
                    item.locked = lock;
                }
                data.values().cloned().collect()
            };
            for child in &children {
                set_lock_inner(child, depth.descend(), lock, owner, visited);
            }
        }
        Value::Dict(dict) => {
            let children: Vec<Value> = {
                let mut data = dict.borrow_mut();
                if depth.covers_container() {
                    apply(&mut data.lock);
                }
                for entry in data.entries_mut() {
                    entry.locked = lock;
                }
                data.values().cloned().collect()
            };
            for child in &children {
                set_lock_inner(child, depth.descend(), lock, owner, visited);
            }
        }
        // A Blob has no item slots, so its bytes follow the container lock.
        Value::Blob(blob) => apply(&mut blob.borrow_mut().lock),
        _ => {}
    });
}

impl From<VimInt> for Value {
    fn from(n: VimInt) -> Self {
        Value::Number(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::int(n)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::string(s)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::string(s)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::list(items)
    }
}

/// Nested-element equality: no coercion between types, case-sensitive.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        crate::equality::structural_equals(self, other, false)
    }
}

/// `string()` form.
impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::string_repr(self))
    }
}

/// `:echo` form.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&crate::display::echo_string(self))
    }
}

#[cfg(test)]
mod tests;
