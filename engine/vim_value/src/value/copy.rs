//! `copy()` and `deepcopy()`.
//!
//! Copies are never locked. A deep copy maps each source container to one
//! new container, so shared sub-structure and cycles are reproduced rather
//! than unrolled.

use rustc_hash::FxHashMap;
use vim_syntax::ensure_sufficient_stack;

use super::{BlobRef, DictRef, ListRef, Value};

impl Value {
    /// New top-level container holding the same items.
    #[must_use]
    pub fn shallow_copy(&self) -> Value {
        match self {
            Value::List(list) => Value::List(ListRef::new(list.to_vec())),
            Value::Dict(dict) => Value::Dict(DictRef::from_pairs(dict.to_pairs())),
            Value::Blob(blob) => Value::Blob(BlobRef::new(blob.to_vec())),
            other => other.clone(),
        }
    }

    #[must_use]
    pub fn deep_copy(&self) -> Value {
        let mut copies = FxHashMap::default();
        deep_copy_inner(self, &mut copies)
    }
}

fn deep_copy_inner(value: &Value, copies: &mut FxHashMap<usize, Value>) -> Value {
    match value {
        Value::List(list) => {
            if let Some(done) = copies.get(&list.addr()) {
                return done.clone();
            }
            let fresh = ListRef::default();
            copies.insert(list.addr(), Value::List(fresh.clone()));
            let items: Vec<Value> = list
                .to_vec()
                .iter()
                .map(|item| ensure_sufficient_stack(|| deep_copy_inner(item, copies)))
                .collect();
            fresh.borrow_mut().items = items.into_iter().map(super::ListItem::new).collect();
            Value::List(fresh)
        }
        Value::Dict(dict) => {
            if let Some(done) = copies.get(&dict.addr()) {
                return done.clone();
            }
            let fresh = DictRef::new();
            copies.insert(dict.addr(), Value::Dict(fresh.clone()));
            for (key, item) in dict.to_pairs() {
                let copied = ensure_sufficient_stack(|| deep_copy_inner(&item, copies));
                fresh.insert(key, copied);
            }
            Value::Dict(fresh)
        }
        Value::Blob(blob) => Value::Blob(BlobRef::new(blob.to_vec())),
        other => other.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shallow_copy_shares_items() {
        let inner = Value::list(vec![Value::int(1)]);
        let outer = Value::list(vec![inner.clone()]);
        let copy = outer.shallow_copy();
        let (Value::List(a), Value::List(b)) = (&outer, &copy) else {
            panic!("expected lists");
        };
        assert!(!a.ptr_eq(b));
        let (Some(Value::List(x)), Some(Value::List(y))) = (a.get(0), b.get(0)) else {
            panic!("expected nested lists");
        };
        assert!(x.ptr_eq(&y));
    }

    #[test]
    fn deep_copy_reproduces_cycles() {
        let list = ListRef::new(vec![Value::int(1)]);
        list.borrow_mut()
            .items
            .push(super::super::ListItem::new(Value::List(list.clone())));
        let copy = Value::List(list.clone()).deep_copy();
        let Value::List(copied) = &copy else {
            panic!("expected list");
        };
        assert!(!copied.ptr_eq(&list));
        let Some(Value::List(back)) = copied.get(1) else {
            panic!("expected self reference");
        };
        assert!(back.ptr_eq(copied));
    }
}
