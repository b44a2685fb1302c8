//! The collection function library.
//!
//! Functions over List (index, value), Dictionary (key, value), String
//! (index, character) and Blob (index, byte). Those that take a callback
//! snapshot the container first: the callback may freely read or modify
//! it, and the result is written back afterwards.
//!
//! Lock checks follow Vim. `filter()`, `extend()`, `reverse()` and
//! `sort()` need an unlocked container. `map()` instead checks each item
//! slot it overwrites. `remove()` only checks the container, so an item
//! whose own slot is locked can still be removed.
//!
//! A negative end index given to `remove()` counts from one past the last
//! item, so `-2` already reaches the last item and `-1` is clamped to it.

use std::cmp::Ordering;

use smallvec::SmallVec;
use vim_value::display::string_repr;
use vim_value::{
    dict_required, index_out_of_range, invalid_argument, invalid_argument_type,
    key_already_exists, list_required, str_to_number, structural_equals, too_many_arguments,
    DictRef, EvalError, EvalResult, Funcref, ListItem, ListRef, Value, VimInt,
};

use super::Callback;
use crate::interpreter::count_value;
use crate::operators::compare_strings;
use crate::Interpreter;

fn byte_value(value: &Value, what: &str) -> Result<u8, EvalError> {
    let n = value.to_i64()?;
    u8::try_from(n).map_err(|_| invalid_argument(format!("{what}: {n}")))
}

/// Insertion position for `insert()` and `extend()`: negative counts
/// from the end, `len` appends.
fn insert_position(len: usize, index: i64) -> Result<usize, EvalError> {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let resolved = if index < 0 { index + signed_len } else { index };
    if resolved < 0 || resolved > signed_len {
        return Err(index_out_of_range(index));
    }
    usize::try_from(resolved).map_err(|_| index_out_of_range(index))
}

// filter(), map(), mapnew(), foreach()

pub(super) fn filter(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let callback = Callback::from_value("filter()", &args[1])?;
    match &args[0] {
        Value::List(list) => {
            list.check_unlocked("filter()")?;
            let mut keep = Vec::with_capacity(list.len());
            for (i, value) in list.to_vec().into_iter().enumerate() {
                keep.push(callback.call(interp, count_value(i), value)?.to_bool()?);
            }
            let mut flags = keep.into_iter();
            list.borrow_mut()
                .items
                .retain(|_| flags.next().unwrap_or(true));
            Ok(args[0].clone())
        }
        Value::Dict(dict) => {
            dict.check_unlocked("filter()")?;
            let mut dropped = Vec::new();
            for (key, value) in dict.to_pairs() {
                if !callback
                    .call(interp, Value::String(key.clone()), value)?
                    .to_bool()?
                {
                    dropped.push(key);
                }
            }
            for key in &dropped {
                dict.remove(key, "filter()")?;
            }
            Ok(args[0].clone())
        }
        Value::String(text) => {
            let mut kept = String::with_capacity(text.len());
            for (i, c) in text.chars().enumerate() {
                if callback
                    .call(interp, count_value(i), Value::string(c.to_string()))?
                    .to_bool()?
                {
                    kept.push(c);
                }
            }
            Ok(Value::string(kept))
        }
        Value::Blob(blob) => {
            blob.check_unlocked("filter()")?;
            let mut kept = Vec::with_capacity(blob.len());
            for (i, byte) in blob.to_vec().into_iter().enumerate() {
                if callback
                    .call(interp, count_value(i), Value::int(i32::from(byte)))?
                    .to_bool()?
                {
                    kept.push(byte);
                }
            }
            blob.replace(kept, "filter()")?;
            Ok(args[0].clone())
        }
        _ => Err(invalid_argument_type(
            "filter()",
            "List, Dictionary, String or Blob",
        )),
    }
}

/// Mapped characters of a String, joined.
fn map_string(interp: &mut Interpreter, callback: &Callback, text: &str) -> EvalResult {
    let mut mapped = String::with_capacity(text.len());
    for (i, c) in text.chars().enumerate() {
        let value = callback.call(interp, count_value(i), Value::string(c.to_string()))?;
        mapped.push_str(&value.to_concat_string()?);
    }
    Ok(Value::string(mapped))
}

pub(super) fn map(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let callback = Callback::from_value("map()", &args[1])?;
    match &args[0] {
        Value::List(list) => {
            for (i, value) in list.to_vec().into_iter().enumerate() {
                let mapped = callback.call(interp, count_value(i), value)?;
                let index = i64::try_from(i).unwrap_or(i64::MAX);
                list.set(index, mapped, "map()")?;
            }
            Ok(args[0].clone())
        }
        Value::Dict(dict) => {
            for (key, value) in dict.to_pairs() {
                let mapped = callback.call(interp, Value::String(key.clone()), value)?;
                dict.set(&key, mapped, "map()")?;
            }
            Ok(args[0].clone())
        }
        Value::String(text) => map_string(interp, &callback, text),
        Value::Blob(blob) => {
            for (i, byte) in blob.to_vec().into_iter().enumerate() {
                let mapped = callback.call(interp, count_value(i), Value::int(i32::from(byte)))?;
                let index = i64::try_from(i).unwrap_or(i64::MAX);
                blob.set(index, byte_value(&mapped, "map()")?, "map()")?;
            }
            Ok(args[0].clone())
        }
        _ => Err(invalid_argument_type(
            "map()",
            "List, Dictionary, String or Blob",
        )),
    }
}

pub(super) fn mapnew(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let callback = Callback::from_value("mapnew()", &args[1])?;
    match &args[0] {
        Value::List(list) => {
            let mut mapped = Vec::with_capacity(list.len());
            for (i, value) in list.to_vec().into_iter().enumerate() {
                mapped.push(callback.call(interp, count_value(i), value)?);
            }
            Ok(Value::list(mapped))
        }
        Value::Dict(dict) => {
            let result = DictRef::new();
            for (key, value) in dict.to_pairs() {
                let mapped = callback.call(interp, Value::String(key.clone()), value)?;
                result.insert(key, mapped);
            }
            Ok(Value::Dict(result))
        }
        Value::String(text) => map_string(interp, &callback, text),
        Value::Blob(blob) => {
            let mut mapped = Vec::with_capacity(blob.len());
            for (i, byte) in blob.to_vec().into_iter().enumerate() {
                let value = callback.call(interp, count_value(i), Value::int(i32::from(byte)))?;
                mapped.push(byte_value(&value, "mapnew()")?);
            }
            Ok(Value::blob(mapped))
        }
        _ => Err(invalid_argument_type(
            "mapnew()",
            "List, Dictionary, String or Blob",
        )),
    }
}

pub(super) fn foreach(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let callback = Callback::from_value("foreach()", &args[1])?;
    match &args[0] {
        Value::List(list) => {
            for (i, value) in list.to_vec().into_iter().enumerate() {
                callback.call(interp, count_value(i), value)?;
            }
        }
        Value::Dict(dict) => {
            for (key, value) in dict.to_pairs() {
                callback.call(interp, Value::String(key), value)?;
            }
        }
        Value::String(text) => {
            for (i, c) in text.chars().enumerate() {
                callback.call(interp, count_value(i), Value::string(c.to_string()))?;
            }
        }
        Value::Blob(blob) => {
            for (i, byte) in blob.to_vec().into_iter().enumerate() {
                callback.call(interp, count_value(i), Value::int(i32::from(byte)))?;
            }
        }
        _ => {
            return Err(invalid_argument_type(
                "foreach()",
                "List, Dictionary, String or Blob",
            ))
        }
    }
    Ok(args[0].clone())
}

/// `reduce(list, {acc, val -> ...}, initial)`.
pub(super) fn reduce(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let items: Vec<Value> = match &args[0] {
        Value::List(list) => list.to_vec(),
        Value::String(text) => text.chars().map(|c| Value::string(c.to_string())).collect(),
        Value::Blob(blob) => blob
            .to_vec()
            .into_iter()
            .map(|b| Value::int(i32::from(b)))
            .collect(),
        _ => return Err(invalid_argument_type("reduce()", "List, String or Blob")),
    };
    let mut items = items.into_iter();
    let mut acc = match args.get(2) {
        Some(initial) => initial.clone(),
        None => items.next().ok_or_else(|| {
            EvalError::new("E998: Reduce of an empty List with no initial value")
        })?,
    };
    for item in items {
        acc = interp.call_value(&args[1], &[acc, item])?;
    }
    Ok(acc)
}

// remove(), extend(), extendnew()

/// Turn the end argument of `remove()` into a non-negative index.
fn removal_end(len: usize, end: &Value) -> Result<i64, EvalError> {
    let end = end.to_i64()?;
    if end >= 0 {
        return Ok(end);
    }
    let len = i64::try_from(len).map_err(|_| index_out_of_range(end))?;
    let last = len + end + 1;
    if len == 0 || last < 0 {
        return Err(index_out_of_range(end));
    }
    Ok(last.min(len - 1))
}

pub(super) fn remove(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::List(list) => {
            let start = args[1].to_i64()?;
            match args.get(2) {
                None => list.remove(start, "remove()"),
                Some(end) => Ok(Value::list(list.remove_range(
                    start,
                    removal_end(list.len(), end)?,
                    "remove()",
                )?)),
            }
        }
        Value::Dict(dict) => {
            if args.len() > 2 {
                return Err(too_many_arguments("remove()"));
            }
            let key = args[1].to_concat_string()?;
            dict.remove(&key, "remove()")
        }
        Value::Blob(blob) => {
            let start = args[1].to_i64()?;
            match args.get(2) {
                None => Ok(Value::int(i32::from(blob.remove(start, "remove()")?))),
                Some(end) => Ok(Value::blob(blob.remove_range(
                    start,
                    removal_end(blob.len(), end)?,
                    "remove()",
                )?)),
            }
        }
        _ => Err(invalid_argument_type(
            "remove()",
            "List, Dictionary or Blob",
        )),
    }
}

/// Conflict policy of `extend()` on Dictionaries.
#[derive(Copy, Clone, PartialEq, Eq)]
enum ExtendPolicy {
    Force,
    Keep,
    Error,
}

impl ExtendPolicy {
    fn from_arg(arg: Option<&Value>) -> Result<Self, EvalError> {
        let Some(arg) = arg else {
            return Ok(ExtendPolicy::Force);
        };
        match &*arg.to_concat_string()? {
            "force" => Ok(ExtendPolicy::Force),
            "keep" => Ok(ExtendPolicy::Keep),
            "error" => Ok(ExtendPolicy::Error),
            other => Err(invalid_argument(other)),
        }
    }
}

fn extend_list(dest: &ListRef, src: &ListRef, index: Option<&Value>, what: &str) -> Result<(), EvalError> {
    dest.check_unlocked(what)?;
    let values = src.to_vec();
    let at = match index {
        Some(index) => insert_position(dest.len(), index.to_i64()?)?,
        None => dest.len(),
    };
    let mut data = dest.borrow_mut();
    data.items
        .splice(at..at, values.into_iter().map(ListItem::new));
    Ok(())
}

/// Keys of `src` are applied in order; with the `error` policy the keys
/// before the first conflict stay applied.
fn extend_dict(dest: &DictRef, src: &DictRef, policy: ExtendPolicy, what: &str) -> Result<(), EvalError> {
    dest.check_unlocked(what)?;
    for (key, value) in src.to_pairs() {
        if dest.contains_key(&key) {
            match policy {
                ExtendPolicy::Keep => continue,
                ExtendPolicy::Error => return Err(key_already_exists(&key)),
                ExtendPolicy::Force => {}
            }
        }
        dest.set(&key, value, what)?;
    }
    Ok(())
}

fn extend_into(dest: &Value, src: &Value, third: Option<&Value>, what: &str) -> Result<(), EvalError> {
    match (dest, src) {
        (Value::List(dest), Value::List(src)) => extend_list(dest, src, third, what),
        (Value::Dict(dest), Value::Dict(src)) => {
            let policy = ExtendPolicy::from_arg(third)?;
            extend_dict(dest, src, policy, what)
        }
        _ => Err(invalid_argument_type(what, "List or Dictionary")),
    }
}

pub(super) fn extend(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    extend_into(&args[0], &args[1], args.get(2), "extend()")?;
    Ok(args[0].clone())
}

pub(super) fn extendnew(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let copy = args[0].shallow_copy();
    extend_into(&copy, &args[1], args.get(2), "extendnew()")?;
    Ok(copy)
}

// slice(), reverse(), get()

/// Half-open `[start, end)` over `len` items: negative values count from
/// the end, both ends clamp, and an end before the start is empty.
fn exclusive_bounds(len: usize, start: i64, end: Option<i64>) -> (usize, usize) {
    let signed_len = i64::try_from(len).unwrap_or(i64::MAX);
    let clamp = |n: i64| {
        let n = if n < 0 { n + signed_len } else { n };
        usize::try_from(n.clamp(0, signed_len)).unwrap_or(0)
    };
    let first = clamp(start);
    let last = end.map_or(len, clamp);
    (first, last.max(first))
}

pub(super) fn slice(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let start = args[1].to_i64()?;
    let end = args.get(2).map(Value::to_i64).transpose()?;
    match &args[0] {
        Value::List(list) => {
            let items = list.to_vec();
            let (first, last) = exclusive_bounds(items.len(), start, end);
            Ok(Value::list(items[first..last].to_vec()))
        }
        Value::Blob(blob) => {
            let bytes = blob.to_vec();
            let (first, last) = exclusive_bounds(bytes.len(), start, end);
            Ok(Value::blob(bytes[first..last].to_vec()))
        }
        Value::String(_) | Value::Number(_) => {
            let chars: Vec<char> = args[0].to_concat_string()?.chars().collect();
            let (first, last) = exclusive_bounds(chars.len(), start, end);
            Ok(Value::string(chars[first..last].iter().collect::<String>()))
        }
        // Vim returns a Dictionary untouched and anything else as zero.
        Value::Dict(_) => Ok(args[0].clone()),
        Value::Float(_) | Value::Funcref(_) => Ok(Value::int(0)),
    }
}

pub(super) fn reverse(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::List(list) => {
            list.reverse("reverse()")?;
            Ok(args[0].clone())
        }
        Value::Blob(blob) => {
            blob.reverse("reverse()")?;
            Ok(args[0].clone())
        }
        Value::String(text) => Ok(Value::string(text.chars().rev().collect::<String>())),
        _ => Ok(Value::int(0)),
    }
}

pub(super) fn get(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let default = || args.get(2).cloned().unwrap_or_else(|| Value::int(0));
    match &args[0] {
        Value::List(list) => Ok(list.get(args[1].to_i64()?).unwrap_or_else(default)),
        Value::Dict(dict) => Ok(dict
            .get(&args[1].to_concat_string()?)
            .unwrap_or_else(default)),
        Value::Blob(blob) => Ok(blob
            .get(args[1].to_i64()?)
            .map_or_else(default, |b| Value::int(i32::from(b)))),
        Value::Funcref(f) => funcref_property(f, &args[1].to_concat_string()?, default),
        _ => Err(invalid_argument_type(
            "get()",
            "List, Dictionary, Blob or Funcref",
        )),
    }
}

fn funcref_property(f: &Funcref, what: &str, default: impl FnOnce() -> Value) -> EvalResult {
    match what {
        "name" => Ok(Value::string(f.name())),
        "func" => Ok(Value::Funcref(Funcref::new(
            f.target().clone(),
            SmallVec::new(),
            None,
            f.kind(),
        ))),
        "args" => Ok(Value::list(f.bound_args().to_vec())),
        "dict" => Ok(f.self_dict().map_or_else(default, |d| Value::Dict(d.clone()))),
        _ => Err(invalid_argument(what)),
    }
}

// min(), max()

fn extreme(args: &[Value], what: &str, pick: Ordering) -> EvalResult {
    let values = match &args[0] {
        Value::List(list) => list.to_vec(),
        Value::Dict(dict) => dict.to_pairs().into_iter().map(|(_, v)| v).collect(),
        _ => return Err(invalid_argument_type(what, "List or Dictionary")),
    };
    let mut best = None;
    for value in &values {
        let n = value.to_number()?;
        let better = match best {
            None => true,
            Some(b) => n.cmp(&b) == pick,
        };
        if better {
            best = Some(n);
        }
    }
    Ok(best.map_or_else(|| Value::int(0), Value::Number))
}

pub(super) fn min(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    extreme(args, "min()", Ordering::Less)
}

pub(super) fn max(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    extreme(args, "max()", Ordering::Greater)
}

// Queries and simple constructors

pub(super) fn copy(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(args[0].shallow_copy())
}

pub(super) fn deepcopy(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(args[0].deep_copy())
}

pub(super) fn len(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    args[0]
        .len()
        .map(count_value)
        .ok_or_else(|| EvalError::new("E701: Invalid type for len()"))
}

pub(super) fn empty(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    Ok(Value::bool(args[0].is_empty()))
}

fn dict_arg<'a>(args: &'a [Value]) -> Result<&'a DictRef, EvalError> {
    args[0].as_dict().ok_or_else(dict_required)
}

pub(super) fn keys(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let dict = dict_arg(args)?;
    Ok(Value::list(dict.keys().into_iter().map(Value::String).collect()))
}

pub(super) fn values(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let dict = dict_arg(args)?;
    Ok(Value::list(
        dict.to_pairs().into_iter().map(|(_, v)| v).collect(),
    ))
}

pub(super) fn items(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let pairs: Vec<Value> = match &args[0] {
        Value::Dict(dict) => dict
            .to_pairs()
            .into_iter()
            .map(|(k, v)| Value::list(vec![Value::String(k), v]))
            .collect(),
        Value::List(list) => list
            .to_vec()
            .into_iter()
            .enumerate()
            .map(|(i, v)| Value::list(vec![count_value(i), v]))
            .collect(),
        _ => return Err(dict_required()),
    };
    Ok(Value::list(pairs))
}

pub(super) fn has_key(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let dict = dict_arg(args)?;
    Ok(Value::bool(dict.contains_key(&args[1].to_concat_string()?)))
}

pub(super) fn add(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    match &args[0] {
        Value::List(list) => list.push(args[1].clone(), "add()")?,
        Value::Blob(blob) => blob.push(byte_value(&args[1], "add()")?, "add()")?,
        _ => return Err(invalid_argument_type("add()", "List or Blob")),
    }
    Ok(args[0].clone())
}

pub(super) fn insert(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let index = args.get(2).map(Value::to_i64).transpose()?.unwrap_or(0);
    match &args[0] {
        Value::List(list) => {
            let at = insert_position(list.len(), index)?;
            list.insert(at, args[1].clone(), "insert()")?;
        }
        Value::Blob(blob) => {
            let at = insert_position(blob.len(), index)?;
            blob.insert(at, byte_value(&args[1], "insert()")?, "insert()")?;
        }
        _ => return Err(invalid_argument_type("insert()", "List or Blob")),
    }
    Ok(args[0].clone())
}

/// `index(list, expr [, start [, ic]])`: position of the first item equal
/// to `expr`, or -1.
pub(super) fn index(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let start = args.get(2).map(Value::to_i64).transpose()?.unwrap_or(0);
    let ignore_case = args.get(3).map(Value::to_bool).transpose()?.unwrap_or(false);
    let items: Vec<Value> = match &args[0] {
        Value::List(list) => list.to_vec(),
        Value::Blob(blob) => blob
            .to_vec()
            .into_iter()
            .map(|b| Value::int(i32::from(b)))
            .collect(),
        _ => return Err(invalid_argument_type("index()", "List or Blob")),
    };
    let (first, _) = exclusive_bounds(items.len(), start, None);
    let found = items
        .iter()
        .enumerate()
        .skip(first)
        .find(|(_, item)| {
            item.value_type() == args[1].value_type()
                && structural_equals(item, &args[1], ignore_case)
        })
        .map(|(i, _)| i);
    Ok(found.map_or_else(|| Value::int(-1), count_value))
}

/// `count(comp, expr [, ic [, start]])`.
pub(super) fn count(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let ignore_case = args.get(2).map(Value::to_bool).transpose()?.unwrap_or(false);
    let needle = &args[1];
    let n = match &args[0] {
        Value::String(text) => {
            let pattern = needle.to_concat_string()?;
            count_substrings(text, &pattern, ignore_case)
        }
        Value::List(list) => {
            let start = args.get(3).map(Value::to_i64).transpose()?.unwrap_or(0);
            let items = list.to_vec();
            let (first, _) = exclusive_bounds(items.len(), start, None);
            items[first..]
                .iter()
                .filter(|item| {
                    item.value_type() == needle.value_type()
                        && structural_equals(item, needle, ignore_case)
                })
                .count()
        }
        Value::Dict(dict) => {
            if args.len() > 3 {
                return Err(too_many_arguments("count()"));
            }
            dict.to_pairs()
                .iter()
                .filter(|(_, v)| {
                    v.value_type() == needle.value_type()
                        && structural_equals(v, needle, ignore_case)
                })
                .count()
        }
        _ => {
            return Err(invalid_argument_type(
                "count()",
                "String, List or Dictionary",
            ))
        }
    };
    Ok(count_value(n))
}

/// Non-overlapping occurrences of `pattern` in `text`.
fn count_substrings(text: &str, pattern: &str, ignore_case: bool) -> usize {
    if pattern.is_empty() {
        return 0;
    }
    if ignore_case {
        text.to_lowercase().matches(&pattern.to_lowercase()).count()
    } else {
        text.matches(pattern).count()
    }
}

pub(super) fn join(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let list = args[0].as_list().ok_or_else(list_required)?;
    let separator = match args.get(1) {
        Some(sep) => sep.to_concat_string()?,
        None => " ".into(),
    };
    let parts: Vec<String> = list
        .to_vec()
        .iter()
        .map(|item| match item {
            Value::String(s) => s.to_string(),
            other => string_repr(other),
        })
        .collect();
    Ok(Value::string(parts.join(&separator)))
}

/// `split(text [, pattern [, keepempty]])`. The `ignorecase` option is
/// not consulted; patterns carry `\c` when they want it.
pub(super) fn split(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let text = args[0].to_concat_string()?;
    let pattern = match args.get(1) {
        Some(p) => p.to_concat_string()?,
        None => "\\s\\+".into(),
    };
    let keep_empty = args.get(2).map(Value::to_bool).transpose()?.unwrap_or(false);
    if pattern.is_empty() {
        return Ok(Value::list(
            text.chars().map(|c| Value::string(c.to_string())).collect(),
        ));
    }
    let regex = interp.patterns().compile(&pattern, false)?;
    let mut pieces: Vec<&str> = regex.split(&text).collect();
    if !keep_empty {
        if pieces.first().is_some_and(|p| p.is_empty()) {
            pieces.remove(0);
        }
        if pieces.last().is_some_and(|p| p.is_empty()) {
            pieces.pop();
        }
    }
    Ok(Value::list(pieces.into_iter().map(Value::string).collect()))
}

pub(super) fn range(_interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let first = args[0].to_i64()?;
    let (start, end) = match args.get(1) {
        Some(end) => (first, end.to_i64()?),
        None => (0, first - 1),
    };
    let stride = args.get(2).map(Value::to_i64).transpose()?.unwrap_or(1);
    if stride == 0 {
        return Err(EvalError::new("E726: Stride is zero"));
    }
    if (stride > 0 && end < start - 1) || (stride < 0 && end > start + 1) {
        return Err(EvalError::new("E727: Start past end"));
    }
    let mut values = Vec::new();
    let mut n = start;
    while (stride > 0 && n <= end) || (stride < 0 && n >= end) {
        values.push(Value::Number(VimInt::saturating_from_i64(n)));
        n += stride;
    }
    Ok(Value::list(values))
}

// sort(), uniq()

/// Ordering requested by the second argument of `sort()`/`uniq()`.
enum SortOrder {
    /// String forms, optionally folding case.
    Text { ignore_case: bool },
    /// `'n'`: Numbers and Floats by value, everything else as zero.
    Numeric,
    /// `'N'`: like `'n'` but Strings are parsed.
    NumericStrings,
    /// `'f'`: Floats and Numbers as floats.
    Float,
    Function(Value),
}

impl SortOrder {
    fn from_arg(arg: Option<&Value>) -> Result<Self, EvalError> {
        let Some(arg) = arg else {
            return Ok(SortOrder::Text { ignore_case: false });
        };
        match arg {
            Value::Funcref(_) => Ok(SortOrder::Function(arg.clone())),
            Value::Number(n) => Ok(SortOrder::Text {
                ignore_case: !n.is_zero(),
            }),
            Value::String(s) => match &**s {
                "" => Ok(SortOrder::Text { ignore_case: false }),
                "i" => Ok(SortOrder::Text { ignore_case: true }),
                "n" => Ok(SortOrder::Numeric),
                "N" => Ok(SortOrder::NumericStrings),
                "f" => Ok(SortOrder::Float),
                _ => Ok(SortOrder::Function(arg.clone())),
            },
            _ => Err(invalid_argument_type("sort()", "String or Funcref")),
        }
    }

    fn compare(&self, interp: &mut Interpreter, a: &Value, b: &Value) -> Result<Ordering, EvalError> {
        match self {
            SortOrder::Text { ignore_case } => Ok(compare_strings(
                &sort_text(a),
                &sort_text(b),
                *ignore_case,
            )),
            SortOrder::Numeric | SortOrder::Float => {
                Ok(numeric_key(a, false).total_cmp(&numeric_key(b, false)))
            }
            SortOrder::NumericStrings => {
                Ok(numeric_key(a, true).total_cmp(&numeric_key(b, true)))
            }
            SortOrder::Function(f) => {
                let result = interp.call_value(f, &[a.clone(), b.clone()])?;
                Ok(result.to_number()?.raw().cmp(&0))
            }
        }
    }
}

fn sort_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.to_string(),
        other => string_repr(other),
    }
}

fn numeric_key(value: &Value, parse_strings: bool) -> f64 {
    match value {
        Value::Number(n) => n.to_f64(),
        Value::Float(f) => *f,
        Value::String(s) if parse_strings => str_to_number(s).to_f64(),
        _ => 0.0,
    }
}

pub(super) fn sort(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let list = args[0]
        .as_list()
        .ok_or_else(|| invalid_argument_type("sort()", "List"))?;
    list.check_unlocked("sort()")?;
    let order = SortOrder::from_arg(args.get(1))?;
    let mut items = list.borrow().items.clone();
    let mut failure = None;
    items.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        order
            .compare(interp, &a.value, &b.value)
            .unwrap_or_else(|err| {
                failure = Some(err);
                Ordering::Equal
            })
    });
    if let Some(err) = failure {
        return Err(err);
    }
    list.borrow_mut().items = items;
    Ok(args[0].clone())
}

pub(super) fn uniq(interp: &mut Interpreter, args: &[Value]) -> EvalResult {
    let list = args[0]
        .as_list()
        .ok_or_else(|| invalid_argument_type("uniq()", "List"))?;
    list.check_unlocked("uniq()")?;
    let order = SortOrder::from_arg(args.get(1))?;
    let items = list.borrow().items.clone();
    let mut kept: Vec<ListItem> = Vec::with_capacity(items.len());
    for item in items {
        let duplicate = match kept.last() {
            Some(prev) => order.compare(interp, &prev.value, &item.value)? == Ordering::Equal,
            None => false,
        };
        if !duplicate {
            kept.push(item);
        }
    }
    list.borrow_mut().items = kept;
    Ok(args[0].clone())
}

#[cfg(test)]
mod tests;

