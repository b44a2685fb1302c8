//! Shared, mutable List storage.

use std::cell::{Ref, RefCell, RefMut};
use std::fmt;
use std::rc::Rc;

use super::lock::LockState;
use super::Value;
use crate::errors::{index_out_of_range, invalid_range, locked_value, EvalError};

/// One List slot: the value plus its slot lock.
#[derive(Clone, Debug)]
pub struct ListItem {
    pub value: Value,
    pub locked: bool,
}

impl ListItem {
    pub fn new(value: Value) -> Self {
        ListItem {
            value,
            locked: false,
        }
    }
}

/// Contents of a List.
#[derive(Debug, Default)]
pub struct ListData {
    pub items: Vec<ListItem>,
    pub lock: LockState,
}

impl ListData {
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.items.get(index).map(|item| &item.value)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> + '_ {
        self.items.iter().map(|item| &item.value)
    }

    /// Resolve a Vim index (negative counts from the end) to a position.
    pub fn resolve_index(&self, index: i64) -> Option<usize> {
        resolve_index(self.items.len(), index)
    }
}

/// Resolve a Vim index against a length; negative counts from the end.
pub fn resolve_index(len: usize, index: i64) -> Option<usize> {
    let len = i64::try_from(len).ok()?;
    let resolved = if index < 0 { len + index } else { index };
    if (0..len).contains(&resolved) {
        usize::try_from(resolved).ok()
    } else {
        None
    }
}

/// Reference-counted handle to a List; cloning aliases.
#[derive(Clone, Default)]
pub struct ListRef(Rc<RefCell<ListData>>);

impl ListRef {
    pub fn new(values: Vec<Value>) -> Self {
        ListRef(Rc::new(RefCell::new(ListData {
            items: values.into_iter().map(ListItem::new).collect(),
            lock: LockState::default(),
        })))
    }

    pub fn borrow(&self) -> Ref<'_, ListData> {
        self.0.borrow()
    }

    /// Raw mutable access with no lock checks; callers check first.
    pub fn borrow_mut(&self) -> RefMut<'_, ListData> {
        self.0.borrow_mut()
    }

    pub fn ptr_eq(&self, other: &ListRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Address used for cycle detection.
    pub fn addr(&self) -> usize {
        Rc::as_ptr(&self.0).cast::<()>() as usize
    }

    pub fn len(&self) -> usize {
        self.0.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.borrow().is_empty()
    }

    /// Item at a Vim index (negative counts from the end).
    pub fn get(&self, index: i64) -> Option<Value> {
        let data = self.0.borrow();
        data.resolve_index(index).and_then(|i| data.get(i).cloned())
    }

    /// Snapshot of the current values. Callbacks run against the snapshot
    /// so they may freely touch the list.
    pub fn to_vec(&self) -> Vec<Value> {
        self.0.borrow().values().cloned().collect()
    }

    pub fn is_locked(&self) -> bool {
        self.0.borrow().lock.is_locked()
    }

    /// Fail with `LockedValue` when the container itself is locked.
    pub fn check_unlocked(&self, what: &str) -> Result<(), EvalError> {
        if self.is_locked() {
            Err(locked_value(what))
        } else {
            Ok(())
        }
    }

    pub fn push(&self, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().items.push(ListItem::new(value));
        Ok(())
    }

    /// Insert before position `at` (`at == len` appends).
    pub fn insert(&self, at: usize, value: Value, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let at = at.min(data.items.len());
        data.items.insert(at, ListItem::new(value));
        Ok(())
    }

    /// Replace the item at a Vim index; the item's slot lock is checked,
    /// not the container lock.
    pub fn set(&self, index: i64, value: Value, what: &str) -> Result<(), EvalError> {
        let mut data = self.0.borrow_mut();
        let Some(i) = data.resolve_index(index) else {
            return Err(index_out_of_range(index));
        };
        let item = &mut data.items[i];
        if item.locked {
            return Err(locked_value(what));
        }
        item.value = value;
        Ok(())
    }

    /// Remove one item. Only the container lock matters here, an item
    /// whose own slot is locked can still be removed.
    pub fn remove(&self, index: i64, what: &str) -> Result<Value, EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let Some(i) = data.resolve_index(index) else {
            return Err(index_out_of_range(index));
        };
        Ok(data.items.remove(i).value)
    }

    /// Remove the inclusive range `start..=end` (both Vim indexes).
    pub fn remove_range(&self, start: i64, end: i64, what: &str) -> Result<Vec<Value>, EvalError> {
        self.check_unlocked(what)?;
        let mut data = self.0.borrow_mut();
        let Some(first) = data.resolve_index(start) else {
            return Err(index_out_of_range(start));
        };
        let Some(last) = data.resolve_index(end) else {
            return Err(index_out_of_range(end));
        };
        if last < first {
            return Err(invalid_range());
        }
        Ok(data
            .items
            .drain(first..=last)
            .map(|item| item.value)
            .collect())
    }

    /// Replace all values, keeping slot locks of surviving positions.
    pub fn replace_values(&self, values: Vec<Value>, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().items = values.into_iter().map(ListItem::new).collect();
        Ok(())
    }

    pub fn reverse(&self, what: &str) -> Result<(), EvalError> {
        self.check_unlocked(what)?;
        self.0.borrow_mut().items.reverse();
        Ok(())
    }
}

impl fmt::Debug for ListRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ListRef({:#x}, len={})", self.addr(), self.len())
    }
}

impl From<Vec<Value>> for ListRef {
    fn from(values: Vec<Value>) -> Self {
        ListRef::new(values)
    }
}
