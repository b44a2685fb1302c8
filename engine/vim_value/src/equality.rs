//! Structural and reference equality.
//!
//! These are the rules for values nested inside containers: values of
//! different types are simply unequal (`[1] == ['1']` is false). The
//! top-level `==` operator, which does coerce, lives in the evaluator and
//! calls in here once both sides are containers.

use std::cmp::Ordering;

use rustc_hash::FxHashSet;
use vim_syntax::ensure_sufficient_stack;

use crate::Value;

/// Compare two strings, folding case when `ignore_case` is set.
pub fn str_equals(a: &str, b: &str, ignore_case: bool) -> bool {
    if ignore_case {
        a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
    } else {
        a == b
    }
}

/// Recursive equality. Strings inside containers honor `ignore_case`;
/// Dictionary keys are always compared exactly.
///
/// Terminates on cyclic structures: a pair of containers already being
/// compared further up is assumed equal.
pub fn structural_equals(a: &Value, b: &Value, ignore_case: bool) -> bool {
    let mut visiting = FxHashSet::default();
    equals_inner(a, b, ignore_case, &mut visiting)
}

fn equals_inner(
    a: &Value,
    b: &Value,
    ignore_case: bool,
    visiting: &mut FxHashSet<(usize, usize)>,
) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::Float(x), Value::Float(y)) => x.partial_cmp(y) == Some(Ordering::Equal),
        (Value::String(x), Value::String(y)) => str_equals(x, y, ignore_case),
        (Value::Funcref(x), Value::Funcref(y)) => x.equals(y),
        (Value::Blob(x), Value::Blob(y)) => x.ptr_eq(y) || x.borrow().bytes == y.borrow().bytes,
        (Value::List(x), Value::List(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            if x.len() != y.len() {
                return false;
            }
            if !visiting.insert((x.addr(), y.addr())) {
                return true;
            }
            let (left, right) = (x.to_vec(), y.to_vec());
            let equal = ensure_sufficient_stack(|| {
                left.iter()
                    .zip(&right)
                    .all(|(l, r)| equals_inner(l, r, ignore_case, visiting))
            });
            visiting.remove(&(x.addr(), y.addr()));
            equal
        }
        (Value::Dict(x), Value::Dict(y)) => {
            if x.ptr_eq(y) {
                return true;
            }
            if x.len() != y.len() {
                return false;
            }
            if !visiting.insert((x.addr(), y.addr())) {
                return true;
            }
            let left = x.to_pairs();
            let equal = ensure_sufficient_stack(|| {
                left.iter().all(|(key, l)| match y.get(key) {
                    Some(r) => equals_inner(l, &r, ignore_case, visiting),
                    None => false,
                })
            });
            visiting.remove(&(x.addr(), y.addr()));
            equal
        }
        _ => false,
    }
}

/// Identity comparison for `is`/`isnot`.
///
/// Containers compare by handle. Funcrefs compare by handle, or by value
/// for plain `function()` references. Scalars compare by type and value,
/// with `ignore_case` applying to Strings.
pub fn reference_equals(a: &Value, b: &Value, ignore_case: bool) -> bool {
    match (a, b) {
        (Value::List(x), Value::List(y)) => x.ptr_eq(y),
        (Value::Dict(x), Value::Dict(y)) => x.ptr_eq(y),
        (Value::Blob(x), Value::Blob(y)) => x.ptr_eq(y),
        (Value::Funcref(x), Value::Funcref(y)) => x.ptr_eq(y) || x.equals(y),
        (Value::String(x), Value::String(y)) => str_equals(x, y, ignore_case),
        _ if a.value_type() == b.value_type() => structural_equals(a, b, false),
        _ => false,
    }
}
