//! Vim script values.
//!
//! The closed [`Value`] type with its implicit conversions, structural and
//! reference equality, text forms, `:lockvar` state and the error taxonomy
//! shared by the evaluator and the command dispatcher.

mod coerce;
pub mod display;
pub mod equality;
mod errors;
mod value;

pub use coerce::{str_to_float, str_to_number};
pub use equality::{reference_equals, str_equals, structural_equals};
pub use errors::*;
pub use value::{
    resolve_index, BlobData, BlobRef, Closure, DictData, DictEntry, DictRef, FuncTarget, Funcref,
    FuncrefKind, Lambda, ListData, ListItem, ListRef, LockDepth, LockState, Value, ValueType,
    VimInt,
};
