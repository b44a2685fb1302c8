//! Builtin functions.
//!
//! The set is fixed, so builtins live in one static table sorted by name
//! and are found by binary search. Each entry declares its arity; the
//! caller checks it before the function runs, so implementations index
//! `args` up to `min_args` freely.
//!
//! - `collections`: the List/Dictionary/String/Blob library
//! - `callback`: expression-string and Funcref callbacks with `v:key`/`v:val`
//! - `misc`: conversions, introspection and bit operations

mod callback;
mod collections;
mod misc;

use vim_value::{EvalResult, Value};

use crate::Interpreter;

pub(crate) use callback::Callback;

pub(crate) type BuiltinFn = fn(&mut Interpreter, &[Value]) -> EvalResult;

pub(crate) struct Builtin {
    pub name: &'static str,
    pub min_args: usize,
    pub max_args: usize,
    pub func: BuiltinFn,
}

const fn builtin(name: &'static str, min_args: usize, max_args: usize, func: BuiltinFn) -> Builtin {
    Builtin {
        name,
        min_args,
        max_args,
        func,
    }
}

/// Every builtin, sorted by name.
static BUILTINS: &[Builtin] = &[
    builtin("abs", 1, 1, misc::abs),
    builtin("add", 2, 2, collections::add),
    builtin("and", 2, 2, misc::and),
    builtin("call", 2, 3, misc::call),
    builtin("copy", 1, 1, collections::copy),
    builtin("count", 2, 4, collections::count),
    builtin("deepcopy", 1, 2, collections::deepcopy),
    builtin("empty", 1, 1, collections::empty),
    builtin("eval", 1, 1, misc::eval),
    builtin("exists", 1, 1, misc::exists),
    builtin("extend", 2, 3, collections::extend),
    builtin("extendnew", 2, 3, collections::extendnew),
    builtin("filter", 2, 2, collections::filter),
    builtin("float2nr", 1, 1, misc::float2nr),
    builtin("foreach", 2, 2, collections::foreach),
    builtin("funcref", 1, 3, misc::funcref),
    builtin("function", 1, 3, misc::function),
    builtin("get", 2, 3, collections::get),
    builtin("has_key", 2, 2, collections::has_key),
    builtin("index", 2, 4, collections::index),
    builtin("insert", 2, 3, collections::insert),
    builtin("invert", 1, 1, misc::invert),
    builtin("islocked", 1, 1, misc::islocked),
    builtin("items", 1, 1, collections::items),
    builtin("join", 1, 2, collections::join),
    builtin("keys", 1, 1, collections::keys),
    builtin("len", 1, 1, collections::len),
    builtin("map", 2, 2, collections::map),
    builtin("mapnew", 2, 2, collections::mapnew),
    builtin("max", 1, 1, collections::max),
    builtin("min", 1, 1, collections::min),
    builtin("or", 2, 2, misc::or),
    builtin("range", 1, 3, collections::range),
    builtin("reduce", 2, 3, collections::reduce),
    builtin("remove", 2, 3, collections::remove),
    builtin("reverse", 1, 1, collections::reverse),
    builtin("slice", 2, 3, collections::slice),
    builtin("sort", 1, 2, collections::sort),
    builtin("split", 1, 3, collections::split),
    builtin("str2float", 1, 1, misc::str2float),
    builtin("str2nr", 1, 2, misc::str2nr),
    builtin("string", 1, 1, misc::string),
    builtin("strlen", 1, 1, misc::strlen),
    builtin("tolower", 1, 1, misc::tolower),
    builtin("toupper", 1, 1, misc::toupper),
    builtin("type", 1, 1, misc::type_of),
    builtin("uniq", 1, 2, collections::uniq),
    builtin("values", 1, 1, collections::values),
    builtin("xor", 2, 2, misc::xor),
];

pub(crate) fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS
        .binary_search_by(|b| b.name.cmp(name))
        .ok()
        .map(|i| &BUILTINS[i])
}

/// Names of all builtins, for completion and `exists()`.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|b| b.name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_is_sorted_and_unique() {
        for pair in BUILTINS.windows(2) {
            assert!(
                pair[0].name < pair[1].name,
                "{} must sort before {}",
                pair[0].name,
                pair[1].name
            );
        }
    }

    #[test]
    fn arity_bounds_are_consistent() {
        for b in BUILTINS {
            assert!(b.min_args <= b.max_args, "{}", b.name);
        }
    }

    #[test]
    fn lookup_finds_entries() {
        assert_eq!(lookup("filter").map(|b| b.name), Some("filter"));
        assert!(lookup("Filter").is_none());
        assert!(lookup("nosuch").is_none());
    }
}
