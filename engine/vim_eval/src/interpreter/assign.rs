//! `:let`, `:unlet` and `:lockvar` targets.
//!
//! Each target is resolved down to the container slot it names before
//! anything is written, so a failing index leaves the container as it was.

use std::rc::Rc;

use vim_syntax::{parse_let, parse_targets, AssignOp, Expr, ExprKind, LetStatement, LetTarget};
use vim_value::{
    blob_index_out_of_range, fewer_targets_than_items, index_out_of_range, invalid_argument,
    invalid_range, key_not_present, list_required, locked_value, more_targets_than_items,
    not_enough_list_items, too_many_list_items, DictRef, EvalError, ListItem, LockDepth, Value,
};

use super::Interpreter;
use crate::operators::evaluate_binary;

#[cold]
fn not_indexable() -> EvalError {
    EvalError::new("E689: Can only index a List, Dictionary or Blob")
}

#[cold]
fn dot_requires_dict() -> EvalError {
    EvalError::new("E1203: Dot can only be used on a dictionary")
}

#[cold]
fn slice_requires_list() -> EvalError {
    EvalError::new("E709: [:] requires a List value")
}

fn byte_value(value: &Value) -> Result<u8, EvalError> {
    let n = value.to_i64()?;
    u8::try_from(n).map_err(|_| invalid_argument(n.to_string()))
}

impl Interpreter {
    /// Run the argument of a `:let` command.
    pub fn execute_let(&mut self, source: &str) -> Result<(), EvalError> {
        let statement = parse_let(source)?;
        self.run_let(&statement, source)
    }

    fn run_let(&mut self, statement: &LetStatement, source: &str) -> Result<(), EvalError> {
        let value = self.eval(&statement.value)?;
        match &statement.target {
            LetTarget::Single(target) => self.assign(target, statement.op, value, source),
            LetTarget::Unpack { items, rest } => {
                let Value::List(list) = value else {
                    return Err(list_required());
                };
                let values = list.to_vec();
                if values.len() < items.len() {
                    return Err(more_targets_than_items());
                }
                if rest.is_none() && values.len() > items.len() {
                    return Err(fewer_targets_than_items());
                }
                for (target, value) in items.iter().zip(&values) {
                    self.assign(target, statement.op, value.clone(), source)?;
                }
                if let Some(rest) = rest {
                    let tail = Value::list(values[items.len()..].to_vec());
                    self.assign(rest, statement.op, tail, source)?;
                }
                Ok(())
            }
        }
    }

    /// Combine the current value of `target` with `value` for a compound
    /// assignment. `list += list` extends in place and yields `None`.
    fn compound_value(
        &mut self,
        target: &Expr,
        op: AssignOp,
        value: Value,
        label: &str,
    ) -> Result<Option<Value>, EvalError> {
        let Some(binary) = op.binary_op() else {
            return Ok(Some(value));
        };
        let current = self.eval(target)?;
        if let (AssignOp::Add, Value::List(list), Value::List(extra)) = (op, &current, &value) {
            list.check_unlocked(label)?;
            let items = extra.to_vec();
            let mut data = list.borrow_mut();
            data.items
                .extend(items.into_iter().map(ListItem::new));
            return Ok(None);
        }
        evaluate_binary(&current, &value, binary, self.operator_context()).map(Some)
    }

    fn assign(
        &mut self,
        target: &Expr,
        op: AssignOp,
        value: Value,
        source: &str,
    ) -> Result<(), EvalError> {
        let label = target.span.slice(source);
        let Some(value) = self.compound_value(target, op, value, label)? else {
            return Ok(());
        };
        tracing::trace!(target = label, op = op.as_symbol(), "let");
        match &target.kind {
            ExprKind::Variable(name) => self.env.set(name, value),
            ExprKind::Option(name) => self.set_option(name, &value),
            ExprKind::Env(name) => {
                let text = value.to_concat_string()?;
                self.env_overrides.insert(Rc::clone(name), text);
                Ok(())
            }
            ExprKind::Index { base, index } => {
                let container = self.eval(base)?;
                let index = self.eval(index)?;
                assign_index(&container, &index, value, label)
            }
            ExprKind::Member { base, key } => match self.eval(base)? {
                Value::Dict(dict) => dict.set(key, value, label),
                _ => Err(dot_requires_dict()),
            },
            ExprKind::Slice { base, start, end } => {
                let container = self.eval(base)?;
                let start = self.eval_bound(start.as_deref())?;
                let end = self.eval_bound(end.as_deref())?;
                assign_slice(&container, start, end, &value, label)
            }
            _ => Err(EvalError::new(format!("E475: Invalid argument: {label}"))),
        }
    }

    /// Run the argument of `:unlet` (`force` for `:unlet!`).
    pub fn unlet(&mut self, source: &str, force: bool) -> Result<(), EvalError> {
        for target in parse_targets(source)? {
            self.unlet_target(&target, source, force)?;
        }
        Ok(())
    }

    fn unlet_target(&mut self, target: &Expr, source: &str, force: bool) -> Result<(), EvalError> {
        let label = target.span.slice(source);
        match &target.kind {
            ExprKind::Variable(name) => self.env.unlet(name, force),
            ExprKind::Env(name) => {
                self.env_overrides.insert(Rc::clone(name), Rc::from(""));
                Ok(())
            }
            ExprKind::Index { base, index } => {
                let container = self.eval(base)?;
                let index = self.eval(index)?;
                unlet_index(&container, &index, label, force)
            }
            ExprKind::Member { base, key } => match self.eval(base)? {
                Value::Dict(dict) => unlet_key(&dict, key, label, force),
                _ => Err(dot_requires_dict()),
            },
            ExprKind::Slice { base, start, end } => {
                let container = self.eval(base)?;
                let start = self.eval_bound(start.as_deref())?;
                let end = self.eval_bound(end.as_deref())?;
                unlet_slice(&container, start, end, label)
            }
            _ => Err(EvalError::new(format!("E475: Invalid argument: {label}"))),
        }
    }

    /// Run the argument of `:lockvar` (`lock`) or `:unlockvar`.
    pub fn lockvar(&mut self, source: &str, depth: LockDepth, lock: bool) -> Result<(), EvalError> {
        for target in parse_targets(source)? {
            let label: Rc<str> = Rc::from(target.span.slice(source));
            match &target.kind {
                ExprKind::Variable(name) => self.env.set_lock(name, depth, lock)?,
                ExprKind::Index { base, index } => {
                    let container = self.eval(base)?;
                    let index = self.eval(index)?;
                    lock_index(&container, &index, depth, lock, &label)?;
                }
                ExprKind::Member { base, key } => match self.eval(base)? {
                    Value::Dict(dict) => lock_key(&dict, key, depth, lock, &label)?,
                    _ => return Err(dot_requires_dict()),
                },
                _ => {
                    return Err(EvalError::new(format!(
                        "E475: Invalid argument: {label}"
                    )))
                }
            }
        }
        Ok(())
    }

    /// `islocked()` on a target given as text. `None` when a plain
    /// variable does not exist.
    pub fn is_locked(&mut self, source: &str) -> Result<Option<bool>, EvalError> {
        let mut targets = parse_targets(source)?;
        let Some(target) = targets.pop().filter(|_| targets.is_empty()) else {
            return Err(EvalError::new(format!("E475: Invalid argument: {source}")));
        };
        match &target.kind {
            ExprKind::Variable(name) => {
                if self.env.lookup(name).is_none() {
                    return Ok(None);
                }
                self.env.is_locked(name).map(Some)
            }
            ExprKind::Index { base, index } => {
                let container = self.eval(base)?;
                let index = self.eval(index)?;
                match &container {
                    Value::List(list) => {
                        let i = index.to_i64()?;
                        let data = list.borrow();
                        let pos = data.resolve_index(i).ok_or_else(|| index_out_of_range(i))?;
                        let item = &data.items[pos];
                        Ok(Some(item.locked || item.value.is_locked()))
                    }
                    Value::Dict(dict) => {
                        let key = index.to_concat_string()?;
                        dict_entry_locked(dict, &key).map(Some)
                    }
                    Value::Blob(blob) => Ok(Some(blob.is_locked())),
                    _ => Err(not_indexable()),
                }
            }
            ExprKind::Member { base, key } => match self.eval(base)? {
                Value::Dict(dict) => dict_entry_locked(&dict, key).map(Some),
                _ => Err(dot_requires_dict()),
            },
            _ => Err(EvalError::new(format!("E475: Invalid argument: {source}"))),
        }
    }
}

fn dict_entry_locked(dict: &DictRef, key: &str) -> Result<bool, EvalError> {
    let data = dict.borrow();
    let entry = data.entry(key).ok_or_else(|| key_not_present(key))?;
    Ok(entry.locked || entry.value.is_locked())
}

fn assign_index(container: &Value, index: &Value, value: Value, label: &str) -> Result<(), EvalError> {
    match container {
        Value::List(list) => list.set(index.to_i64()?, value, label),
        Value::Dict(dict) => dict.set(&index.to_concat_string()?, value, label),
        Value::Blob(blob) => {
            let i = index.to_i64()?;
            let byte = byte_value(&value)?;
            if usize::try_from(i).is_ok_and(|i| i == blob.len()) {
                blob.push(byte, label)
            } else {
                blob.set(i, byte, label)
            }
        }
        _ => Err(not_indexable()),
    }
}

/// `let l[a:b] = values`: replace items in place. The target may run
/// past the end of the List, which then grows.
fn assign_slice(
    container: &Value,
    start: Option<i64>,
    end: Option<i64>,
    value: &Value,
    label: &str,
) -> Result<(), EvalError> {
    let Value::List(list) = container else {
        return Err(not_indexable());
    };
    let Value::List(source) = value else {
        return Err(slice_requires_list());
    };
    let values = source.to_vec();
    let len = i64::try_from(list.len()).unwrap_or(i64::MAX);
    let start = start.unwrap_or(0);
    let first = if start < 0 { start + len } else { start };
    if first < 0 || first > len || (first == len && end.is_some()) {
        return Err(index_out_of_range(start));
    }
    let count = i64::try_from(values.len()).unwrap_or(i64::MAX);
    match end {
        Some(end) => {
            let last = if end < 0 { end + len } else { end };
            if last < first {
                return Err(invalid_range());
            }
            let needed = last - first + 1;
            if count < needed {
                return Err(not_enough_list_items());
            }
            if count > needed {
                return Err(too_many_list_items());
            }
        }
        None if count < len - first => return Err(not_enough_list_items()),
        None => {}
    }

    let first = usize::try_from(first).map_err(|_| index_out_of_range(start))?;
    let mut data = list.borrow_mut();
    let grows = first + values.len() > data.items.len();
    if grows && data.lock.is_locked() {
        return Err(locked_value(label));
    }
    let overwritten = data.items.len().min(first + values.len());
    if data.items[first..overwritten].iter().any(|item| item.locked) {
        return Err(locked_value(label));
    }
    for (offset, value) in values.into_iter().enumerate() {
        match data.items.get_mut(first + offset) {
            Some(item) => item.value = value,
            None => data.items.push(ListItem::new(value)),
        }
    }
    Ok(())
}

fn unlet_index(container: &Value, index: &Value, label: &str, force: bool) -> Result<(), EvalError> {
    match container {
        Value::List(list) => {
            let i = index.to_i64()?;
            let slot_locked = {
                let data = list.borrow();
                match data.resolve_index(i) {
                    Some(pos) => data.items[pos].locked,
                    None if force => return Ok(()),
                    None => return Err(index_out_of_range(i)),
                }
            };
            if slot_locked {
                return Err(locked_value(label));
            }
            list.remove(i, label).map(|_| ())
        }
        Value::Dict(dict) => unlet_key(dict, &index.to_concat_string()?, label, force),
        Value::Blob(blob) => {
            let i = index.to_i64()?;
            if force && blob.get(i).is_none() {
                return Ok(());
            }
            blob.remove(i, label).map(|_| ())
        }
        _ => Err(not_indexable()),
    }
}

fn unlet_key(dict: &DictRef, key: &str, label: &str, force: bool) -> Result<(), EvalError> {
    let locked = match dict.borrow().entry(key) {
        Some(entry) => entry.locked,
        None if force => return Ok(()),
        None => return Err(key_not_present(key)),
    };
    if locked {
        return Err(locked_value(label));
    }
    dict.remove(key, label).map(|_| ())
}

fn unlet_slice(
    container: &Value,
    start: Option<i64>,
    end: Option<i64>,
    label: &str,
) -> Result<(), EvalError> {
    match container {
        Value::List(list) => {
            let start = start.unwrap_or(0);
            let end = end.unwrap_or(-1);
            if list.is_empty() {
                return Ok(());
            }
            list.remove_range(start, end, label).map(|_| ())
        }
        Value::Blob(blob) => {
            let start = start.unwrap_or(0);
            let end = end.unwrap_or(-1);
            if blob.is_empty() {
                return Ok(());
            }
            blob.remove_range(start, end, label).map(|_| ())
        }
        _ => Err(not_indexable()),
    }
}

/// Lock one List item or Blob: the item slot, then its value to
/// `depth - 1` below it.
fn lock_index(
    container: &Value,
    index: &Value,
    depth: LockDepth,
    lock: bool,
    label: &Rc<str>,
) -> Result<(), EvalError> {
    match container {
        Value::List(list) => {
            let i = index.to_i64()?;
            let value = {
                let mut data = list.borrow_mut();
                let pos = data.resolve_index(i).ok_or_else(|| index_out_of_range(i))?;
                let item = &mut data.items[pos];
                item.locked = lock;
                item.value.clone()
            };
            value.set_lock(depth, lock, Some(label));
            Ok(())
        }
        Value::Dict(dict) => lock_key(dict, &index.to_concat_string()?, depth, lock, label),
        Value::Blob(blob) => {
            let i = index.to_i64()?;
            if blob.get(i).is_none() {
                return Err(blob_index_out_of_range(i));
            }
            container.set_lock(depth, lock, Some(label));
            Ok(())
        }
        _ => Err(not_indexable()),
    }
}

fn lock_key(
    dict: &DictRef,
    key: &str,
    depth: LockDepth,
    lock: bool,
    label: &Rc<str>,
) -> Result<(), EvalError> {
    let value = {
        let mut data = dict.borrow_mut();
        let entry = data.entry_mut(key).ok_or_else(|| key_not_present(key))?;
        entry.locked = lock;
        entry.value.clone()
    };
    value.set_lock(depth, lock, Some(label));
    Ok(())
}
