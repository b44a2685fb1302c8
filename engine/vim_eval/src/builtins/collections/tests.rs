#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;
use vim_value::display::string_repr;
use vim_value::{EvalErrorKind, LockDepth, Value};

use crate::Interpreter;

fn repr(interp: &mut Interpreter, source: &str) -> String {
    string_repr(&interp.eval_str(source).unwrap())
}

fn with_vars(lets: &[&str]) -> Interpreter {
    let mut interp = Interpreter::new();
    for statement in lets {
        interp.execute_let(statement).unwrap();
    }
    interp
}

fn error_kind(interp: &mut Interpreter, source: &str) -> EvalErrorKind {
    interp.eval_str(source).unwrap_err().kind
}

// filter() / map()

#[test]
fn filter_modifies_list_in_place() {
    let mut interp = with_vars(&["nums = [1, 2, 3, 4]"]);
    assert_eq!(repr(&mut interp, "filter(nums, 'v:val % 2 == 0')"), "[2, 4]");
    assert_eq!(repr(&mut interp, "nums"), "[2, 4]");
}

#[test]
fn filter_dict_with_lambda_sees_keys() {
    let mut interp = with_vars(&["d = {'a': 1, 'b': 2, 'c': 3}"]);
    interp.eval_str("filter(d, {k, v -> k != 'b'})").unwrap();
    assert_eq!(repr(&mut interp, "keys(d)"), "['a', 'c']");
}

#[test]
fn filter_string_returns_new_string() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "filter('a1b2', 'v:val =~ \"[a-z]\"')"), "'ab'");
}

#[test]
fn filter_rejects_locked_list() {
    let mut interp = with_vars(&["nums = [1, 2]"]);
    interp.lockvar("nums", LockDepth::DEFAULT, true).unwrap();
    let err = interp.eval_str("filter(nums, 1)").unwrap_err();
    assert!(err.is_lock_error(), "{err:?}");
    assert_eq!(repr(&mut interp, "nums"), "[1, 2]");
}

#[test]
fn mapnew_leaves_source_untouched() {
    let mut interp = with_vars(&["nums = [1, 2, 3]"]);
    assert_eq!(repr(&mut interp, "mapnew(nums, 'v:val * 10')"), "[10, 20, 30]");
    assert_eq!(repr(&mut interp, "nums"), "[1, 2, 3]");
}

#[test]
fn map_string_concatenates_results() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "map('abc', 'toupper(v:val)')"), "'ABC'");
}

#[test]
fn map_checks_item_slot_but_remove_does_not() {
    let mut interp = with_vars(&["nums = [1, 2]"]);
    interp.lockvar("nums[0]", LockDepth::DEFAULT, true).unwrap();
    let err = interp.eval_str("map(nums, 'v:val + 1')").unwrap_err();
    assert!(err.is_lock_error(), "{err:?}");
    assert_eq!(interp.eval_str("remove(nums, 0)").unwrap(), Value::int(1));
    assert_eq!(repr(&mut interp, "nums"), "[2]");
}

#[test]
fn nested_callbacks_restore_outer_val() {
    let mut interp = Interpreter::new();
    assert_eq!(
        repr(&mut interp, "mapnew([1, 2], 'mapnew([10], \"v:val\")[0] + v:val')"),
        "[11, 12]"
    );
}

#[test]
fn callback_must_be_string_or_funcref() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        error_kind(&mut interp, "map([1], [])"),
        EvalErrorKind::InvalidArgumentType { .. }
    ));
}

#[test]
fn foreach_returns_its_input() {
    let mut interp = with_vars(&["seen = []"]);
    assert_eq!(repr(&mut interp, "foreach([1, 2], 'add(seen, v:val)')"), "[1, 2]");
    assert_eq!(repr(&mut interp, "seen"), "[1, 2]");
}

#[test]
fn foreach_stops_at_first_error() {
    let mut interp = with_vars(&["g:seen = []"]);
    let err = interp
        .eval_str("foreach([1, 2, 3], {i, v -> v == 2 ? g:nosuch : add(g:seen, v)})")
        .unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::UndefinedVariable { .. }), "{err:?}");
    assert_eq!(repr(&mut interp, "g:seen"), "[1]");
}

#[test]
fn reverse_moves_locked_items() {
    let mut interp = with_vars(&["nums = [1, 2, 3]"]);
    interp.lockvar("nums[0]", LockDepth::DEFAULT, true).unwrap();
    assert_eq!(repr(&mut interp, "reverse(nums)"), "[3, 2, 1]");
    assert_eq!(interp.eval_str("islocked('nums[2]')").unwrap(), Value::int(1));
    assert_eq!(interp.eval_str("islocked('nums[0]')").unwrap(), Value::int(0));

    interp.lockvar("nums", LockDepth::DEFAULT, true).unwrap();
    assert!(interp.eval_str("reverse(nums)").unwrap_err().is_lock_error());
    assert_eq!(repr(&mut interp, "nums"), "[3, 2, 1]");
}

#[test]
fn reduce_folds_with_and_without_initial() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval_str("reduce([1, 2, 3], {a, b -> a + b})").unwrap(), Value::int(6));
    assert_eq!(
        interp.eval_str("reduce([1, 2, 3], {a, b -> a + b}, 10)").unwrap(),
        Value::int(16)
    );
    let err = interp.eval_str("reduce([], {a, b -> a + b})").unwrap_err();
    assert!(err.message.starts_with("E998"), "{}", err.message);
}

// remove() / extend()

#[test]
fn remove_negative_range() {
    let mut interp = with_vars(&["nums = [1, 2, 3, 4, 5]"]);
    assert_eq!(repr(&mut interp, "remove(nums, -3, -2)"), "[3, 4, 5]");
    assert_eq!(repr(&mut interp, "nums"), "[1, 2]");
}

#[test]
fn remove_negative_end_reaches_last_item() {
    let mut interp = with_vars(&["short = [1, 2, 3]", "whole = [1, 2, 3]"]);
    assert_eq!(repr(&mut interp, "remove(short, 1, -2)"), "[2, 3]");
    assert_eq!(repr(&mut interp, "short"), "[1]");
    assert_eq!(repr(&mut interp, "remove(whole, 0, -1)"), "[1, 2, 3]");
    assert_eq!(repr(&mut interp, "whole"), "[]");
}

#[test]
fn remove_end_before_start_is_invalid_range() {
    let mut interp = with_vars(&["nums = [1, 2, 3, 4]", "b = 0z01020304"]);
    assert_eq!(error_kind(&mut interp, "remove(nums, 2, -4)"), EvalErrorKind::InvalidRange);
    assert_eq!(error_kind(&mut interp, "remove(nums, 2, 0)"), EvalErrorKind::InvalidRange);
    assert!(matches!(
        error_kind(&mut interp, "remove(nums, 0, -9)"),
        EvalErrorKind::IndexOutOfRange { .. }
    ));
    assert_eq!(repr(&mut interp, "nums"), "[1, 2, 3, 4]");
    assert_eq!(repr(&mut interp, "remove(b, 1, -2)"), "0z020304");
}

#[test]
fn remove_reports_bad_index_and_missing_key() {
    let mut interp = with_vars(&["nums = [1]", "d = {'a': 1}"]);
    assert_eq!(
        error_kind(&mut interp, "remove(nums, 5)"),
        EvalErrorKind::IndexOutOfRange { index: 5 }
    );
    assert!(matches!(
        error_kind(&mut interp, "remove(d, 'zz')"),
        EvalErrorKind::KeyNotPresent { .. }
    ));
    assert!(matches!(
        error_kind(&mut interp, "remove(d, 'a', 'b')"),
        EvalErrorKind::TooManyArguments { .. }
    ));
}

#[test]
fn extend_list_at_position() {
    let mut interp = with_vars(&["nums = [1, 2]"]);
    assert_eq!(repr(&mut interp, "extend(nums, [9], 1)"), "[1, 9, 2]");
    assert_eq!(repr(&mut interp, "extend(nums, [7])"), "[1, 9, 2, 7]");
}

#[test]
fn extend_keep_preserves_existing() {
    let mut interp = with_vars(&["d = {'a': 1}"]);
    interp.eval_str("extend(d, {'a': 2, 'b': 3}, 'keep')").unwrap();
    assert_eq!(interp.eval_str("d.a").unwrap(), Value::int(1));
    assert_eq!(interp.eval_str("d.b").unwrap(), Value::int(3));
}

#[test]
fn extend_error_keeps_keys_before_conflict() {
    let mut interp = with_vars(&["d = {'a': 1}"]);
    let kind = error_kind(&mut interp, "extend(d, {'b': 2, 'a': 9}, 'error')");
    assert_eq!(kind, EvalErrorKind::KeyAlreadyExists { key: "a".into() });
    assert_eq!(interp.eval_str("d.a").unwrap(), Value::int(1));
    assert_eq!(interp.eval_str("has_key(d, 'b')").unwrap(), Value::int(1));
}

#[test]
fn extend_rejects_unknown_policy() {
    let mut interp = with_vars(&["d = {}"]);
    assert!(matches!(
        error_kind(&mut interp, "extend(d, {}, 'merge')"),
        EvalErrorKind::InvalidArgument { .. }
    ));
}

#[test]
fn extendnew_copies_first() {
    let mut interp = with_vars(&["d = {'a': 1}"]);
    assert_eq!(repr(&mut interp, "extendnew(d, {'b': 2})"), "{'a': 1, 'b': 2}");
    assert_eq!(repr(&mut interp, "d"), "{'a': 1}");
}

// sort() / uniq()

#[test]
fn sort_orders() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "sort([10, 9, 100])"), "[10, 100, 9]");
    assert_eq!(repr(&mut interp, "sort([10, 9, 100], 'n')"), "[9, 10, 100]");
    assert_eq!(repr(&mut interp, "sort(['b', 'A', 'a'], 'i')"), "['A', 'a', 'b']");
    assert_eq!(repr(&mut interp, "sort([1, 3, 2], {a, b -> b - a})"), "[3, 2, 1]");
    assert_eq!(repr(&mut interp, "sort(['3', '20', '1'], 'N')"), "['1', '3', '20']");
}

#[test]
fn sort_propagates_comparator_errors() {
    let mut interp = with_vars(&["nums = [2, 1]"]);
    assert!(interp.eval_str("sort(nums, {a, b -> nosuch})").is_err());
    assert_eq!(repr(&mut interp, "nums"), "[2, 1]");
}

#[test]
fn uniq_drops_adjacent_duplicates_only() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "uniq([1, 1, 2, 1])"), "[1, 2, 1]");
    assert_eq!(repr(&mut interp, "uniq(['a', 'A'], 1)"), "['a']");
}

// split() / join() / range()

#[test]
fn split_trims_empty_ends_unless_kept() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "split('a b  c')"), "['a', 'b', 'c']");
    assert_eq!(repr(&mut interp, "split(',a,', ',')"), "['a']");
    assert_eq!(repr(&mut interp, "split(',a,', ',', 1)"), "['', 'a', '']");
    assert_eq!(repr(&mut interp, "split('abc', '')"), "['a', 'b', 'c']");
}

#[test]
fn join_uses_raw_strings() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "join([1, 'a', [2]], '-')"), "'1-a-[2]'");
    assert_eq!(repr(&mut interp, "join(['x', 'y'])"), "'x y'");
}

#[test]
fn range_variants_and_errors() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "range(3)"), "[0, 1, 2]");
    assert_eq!(repr(&mut interp, "range(2, 4)"), "[2, 3, 4]");
    assert_eq!(repr(&mut interp, "range(5, 1, -2)"), "[5, 3, 1]");
    assert_eq!(repr(&mut interp, "range(2, 1)"), "[]");
    let err = interp.eval_str("range(1, 5, 0)").unwrap_err();
    assert!(err.message.starts_with("E726"), "{}", err.message);
    let err = interp.eval_str("range(5, 1)").unwrap_err();
    assert!(err.message.starts_with("E727"), "{}", err.message);
}

// slice() / get() / queries

#[test]
fn slice_is_exclusive_and_lenient() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "slice([1, 2, 3], 1)"), "[2, 3]");
    assert_eq!(repr(&mut interp, "slice([1, 2, 3], 0, -1)"), "[1, 2]");
    assert_eq!(repr(&mut interp, "slice([1, 2, 3], 5)"), "[]");
    assert_eq!(repr(&mut interp, "slice('abc', 1, 2)"), "'b'");
    assert_eq!(repr(&mut interp, "slice(123, 1)"), "'23'");
    assert_eq!(repr(&mut interp, "slice(1.5, 0)"), "0");
    assert_eq!(repr(&mut interp, "slice({'a': 1}, 0)"), "{'a': 1}");
}

#[test]
fn get_with_defaults() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval_str("get([1, 2], 5)").unwrap(), Value::int(0));
    assert_eq!(interp.eval_str("get([1, 2], -1)").unwrap(), Value::int(2));
    assert_eq!(repr(&mut interp, "get({'a': 1}, 'b', 'none')"), "'none'");
    assert_eq!(interp.eval_str("get(0z0102, 1)").unwrap(), Value::int(2));
}

#[test]
fn get_funcref_properties() {
    let mut interp = Interpreter::new();
    interp.execute_let("F = function('len', [[1, 2]])").unwrap();
    assert_eq!(repr(&mut interp, "get(F, 'name')"), "'len'");
    assert_eq!(repr(&mut interp, "get(F, 'args')"), "[[1, 2]]");
    assert_eq!(interp.eval_str("get(F, 'dict', -1)").unwrap(), Value::int(-1));
    assert_eq!(interp.eval_str("F()").unwrap(), Value::int(2));
}

#[test]
fn index_and_count_compare_types_strictly() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval_str("index(['1', 1], 1)").unwrap(), Value::int(1));
    assert_eq!(interp.eval_str("index(['a', 'b'], 'B')").unwrap(), Value::int(-1));
    assert_eq!(interp.eval_str("index(['a', 'b'], 'B', 0, 1)").unwrap(), Value::int(1));
    assert_eq!(interp.eval_str("count('abcabc', 'bc')").unwrap(), Value::int(2));
    assert_eq!(interp.eval_str("count([1, 2, 1], 1)").unwrap(), Value::int(2));
    assert_eq!(interp.eval_str("count({'a': 1, 'b': 1}, 1)").unwrap(), Value::int(2));
}

#[test]
fn min_max_len_empty() {
    let mut interp = Interpreter::new();
    assert_eq!(interp.eval_str("max([3, 9, 2])").unwrap(), Value::int(9));
    assert_eq!(interp.eval_str("min({'a': 4, 'b': -1})").unwrap(), Value::int(-1));
    assert_eq!(interp.eval_str("max([])").unwrap(), Value::int(0));
    assert_eq!(interp.eval_str("len('héllo')").unwrap(), Value::int(6));
    assert_eq!(interp.eval_str("len([1, 2])").unwrap(), Value::int(2));
    assert_eq!(interp.eval_str("empty({})").unwrap(), Value::int(1));
    let err = interp.eval_str("len(1.5)").unwrap_err();
    assert!(err.message.starts_with("E701"), "{}", err.message);
}

#[test]
fn items_keys_values() {
    let mut interp = with_vars(&["d = {'x': 1, 'y': 2}"]);
    assert_eq!(repr(&mut interp, "items(d)"), "[['x', 1], ['y', 2]]");
    assert_eq!(repr(&mut interp, "values(d)"), "[1, 2]");
    assert_eq!(repr(&mut interp, "items(['a'])"), "[[0, 'a']]");
    assert_eq!(error_kind(&mut interp, "keys([1])"), EvalErrorKind::DictRequired);
}

#[test]
fn insert_and_add_on_blob() {
    let mut interp = with_vars(&["b = 0z0102"]);
    interp.eval_str("add(b, 3)").unwrap();
    interp.eval_str("insert(b, 0, 0)").unwrap();
    assert_eq!(repr(&mut interp, "b"), "0z00010203");
    assert!(matches!(
        error_kind(&mut interp, "add(b, 300)"),
        EvalErrorKind::InvalidArgument { .. }
    ));
}

#[test]
fn copy_is_shallow_and_deepcopy_is_not() {
    let mut interp = with_vars(&["src = [[1]]", "shallow = copy(src)", "deep = deepcopy(src)"]);
    interp.eval_str("add(src[0], 2)").unwrap();
    assert_eq!(repr(&mut interp, "shallow"), "[[1, 2]]");
    assert_eq!(repr(&mut interp, "deep"), "[[1]]");
}
