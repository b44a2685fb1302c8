#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;

fn nested() -> (Value, ListRef, ListRef) {
    let inner = ListRef::new(vec![Value::int(1), Value::int(2)]);
    let outer = ListRef::new(vec![Value::List(inner.clone()), Value::int(3)]);
    (Value::List(outer.clone()), outer, inner)
}

#[test]
fn type_codes_match_vim() {
    assert_eq!(Value::int(1).value_type().type_code(), 0);
    assert_eq!(Value::string("x").value_type().type_code(), 1);
    assert_eq!(Value::list(vec![]).value_type().type_code(), 3);
    assert_eq!(Value::dict::<&str>([]).type_name(), "Dictionary");
    assert_eq!(Value::blob(vec![]).value_type().type_code(), 10);
}

#[test]
fn lists_alias_on_clone() {
    let a = Value::list(vec![Value::int(1)]);
    let b = a.clone();
    b.as_list().unwrap().push(Value::int(2), "add()").unwrap();
    assert_eq!(a.len(), Some(2));
}

#[test]
fn depth_one_locks_item_slots_only() {
    let (value, outer, inner) = nested();
    value.set_lock(LockDepth::ITEMS, true, None);
    assert!(!outer.is_locked());
    assert!(outer.borrow().items.iter().all(|item| item.locked));
    assert!(!inner.is_locked());
    assert!(!inner.borrow().items[0].locked);
}

#[test]
fn default_depth_locks_container_and_nested_slots() {
    let (value, outer, inner) = nested();
    value.set_lock(LockDepth::DEFAULT, true, Some(&Rc::from("l")));
    assert!(outer.is_locked());
    assert!(outer.borrow().items.iter().all(|item| item.locked));
    assert!(!inner.is_locked());
    assert!(inner.borrow().items.iter().all(|item| item.locked));
    assert_eq!(outer.borrow().lock.owner(), Some("l"));
}

#[test]
fn unlocking_at_depth_one_leaves_container_lock() {
    let (value, outer, _inner) = nested();
    value.set_lock(LockDepth::DEFAULT, true, None);
    value.set_lock(LockDepth::ITEMS, false, None);
    assert!(outer.is_locked());
    assert!(outer.borrow().items.iter().all(|item| !item.locked));
}

#[test]
fn unlimited_depth_and_unlock() {
    let (value, _outer, inner) = nested();
    value.set_lock(LockDepth::UNLIMITED, true, None);
    assert!(inner.is_locked());
    assert!(inner.borrow().items.iter().all(|item| item.locked));
    value.set_lock(LockDepth::UNLIMITED, false, None);
    assert!(!inner.is_locked());
    assert!(inner.borrow().items.iter().all(|item| !item.locked));
}

#[test]
fn locking_a_cycle_terminates() {
    let list = ListRef::new(vec![]);
    list.borrow_mut()
        .items
        .push(ListItem::new(Value::List(list.clone())));
    Value::List(list.clone()).set_lock(LockDepth::UNLIMITED, true, None);
    assert!(list.is_locked());
}

#[test]
fn emptiness() {
    assert!(Value::int(0).is_empty());
    assert!(Value::empty_string().is_empty());
    assert!(!Value::list(vec![Value::int(0)]).is_empty());
    assert!(!Value::Funcref(Funcref::named("len")).is_empty());
}
