#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use super::*;
use pretty_assertions::assert_eq;
use vim_value::display::string_repr;
use vim_value::{EvalErrorKind, LockDepth};

fn run(interp: &mut Interpreter, source: &str) -> Value {
    interp.eval_str(source).unwrap()
}

fn repr(interp: &mut Interpreter, source: &str) -> String {
    string_repr(&run(interp, source))
}

fn kind(interp: &mut Interpreter, source: &str) -> EvalErrorKind {
    interp.eval_str(source).unwrap_err().kind
}

fn with_vars(lets: &[&str]) -> Interpreter {
    let mut interp = Interpreter::new();
    for statement in lets {
        interp.execute_let(statement).unwrap();
    }
    interp
}

// Expressions

#[test]
fn arithmetic_and_coercion() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "1 + 2 * 3"), Value::int(7));
    assert_eq!(run(&mut interp, "'10' + 5"), Value::int(15));
    assert_eq!(run(&mut interp, "7 / 2.0"), Value::float(3.5));
    assert_eq!(repr(&mut interp, "'a' . 1"), "'a1'");
    assert!(matches!(
        kind(&mut interp, "'a' .. 2.5"),
        EvalErrorKind::TypeCoercion(_)
    ));
    assert_eq!(repr(&mut interp, "[1] + [2]"), "[1, 2]");
}

#[test]
fn string_comparison_follows_case_mode() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "'abc' == 'ABC'"), Value::int(0));
    assert_eq!(run(&mut interp, "'abc' ==? 'ABC'"), Value::int(1));
    interp.options_mut().ignorecase = true;
    assert_eq!(run(&mut interp, "'abc' == 'ABC'"), Value::int(1));
    assert_eq!(run(&mut interp, "'abc' ==# 'ABC'"), Value::int(0));
}

#[test]
fn logical_operators_short_circuit() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "0 && nosuch"), Value::int(0));
    assert_eq!(run(&mut interp, "1 || nosuch"), Value::int(1));
    assert_eq!(run(&mut interp, "1 ? 'y' : nosuch"), Value::string("y"));
    assert_eq!(run(&mut interp, "'' ?? 'fallback'"), Value::string("fallback"));
}

#[test]
fn strings_index_by_character() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "'héllo'[1]"), "'é'");
    assert_eq!(repr(&mut interp, "'abc'[10]"), "''");
    assert_eq!(repr(&mut interp, "'abcdef'[1:3]"), "'bcd'");
    assert_eq!(repr(&mut interp, "'abc'[-2:]"), "'bc'");
}

#[test]
fn list_index_and_slice() {
    let mut interp = with_vars(&["nums = [1, 2, 3, 4]"]);
    assert_eq!(run(&mut interp, "nums[-1]"), Value::int(4));
    assert_eq!(repr(&mut interp, "nums[1:2]"), "[2, 3]");
    assert_eq!(repr(&mut interp, "nums[2:]"), "[3, 4]");
    assert_eq!(repr(&mut interp, "nums[3:1]"), "[]");
    assert_eq!(kind(&mut interp, "nums[9]"), EvalErrorKind::IndexOutOfRange { index: 9 });
    assert_eq!(kind(&mut interp, "{'a': 1}[0:1]"), EvalErrorKind::CannotSliceDict);
}

#[test]
fn dict_members_and_missing_keys() {
    let mut interp = with_vars(&["d = {'one': 1, 'nested': {'two': 2}}"]);
    assert_eq!(run(&mut interp, "d.one"), Value::int(1));
    assert_eq!(run(&mut interp, "d.nested.two"), Value::int(2));
    assert_eq!(run(&mut interp, "d['one']"), Value::int(1));
    assert!(matches!(
        kind(&mut interp, "d.three"),
        EvalErrorKind::KeyNotPresent { .. }
    ));
    let err = interp.eval_str("{'a': 1, 'a': 2}").unwrap_err();
    assert!(err.message.starts_with("E721"), "{}", err.message);
}

#[test]
fn undefined_variable_is_reported() {
    let mut interp = Interpreter::new();
    assert_eq!(
        kind(&mut interp, "missing + 1"),
        EvalErrorKind::UndefinedVariable {
            name: "g:missing".into()
        }
    );
    assert_eq!(interp.variable("g:missing"), None);
    assert_eq!(run(&mut interp, "exists('g:missing')"), Value::int(0));
}

#[test]
fn scope_dicts_read_as_dictionaries() {
    let mut interp = with_vars(&["g:answer = 42"]);
    assert_eq!(run(&mut interp, "g:['answer']"), Value::int(42));
    assert_eq!(run(&mut interp, "has_key(g:, 'answer')"), Value::int(1));
    assert_eq!(run(&mut interp, "v:true"), Value::int(1));
}

// Functions

#[test]
fn user_function_with_varargs() {
    let mut interp = Interpreter::new();
    interp
        .define_function("Sum", &["first", "..."], "a:first + a:0 + len(a:000)", false)
        .unwrap();
    assert_eq!(run(&mut interp, "Sum(1, 5, 6)"), Value::int(5));
    assert_eq!(run(&mut interp, "Sum(1)"), Value::int(1));
    assert!(matches!(
        kind(&mut interp, "Sum()"),
        EvalErrorKind::TooFewArguments { .. }
    ));
}

#[test]
fn function_names_must_be_capitalized() {
    let mut interp = Interpreter::new();
    let err = interp.define_function("lower", &[], "1", false).unwrap_err();
    assert!(err.message.starts_with("E128"), "{}", err.message);
    interp.define_function("s:helper", &[], "1", false).unwrap();
}

#[test]
fn dict_function_binds_self() {
    let mut interp = Interpreter::new();
    interp.define_function("Get", &[], "self.v", true).unwrap();
    interp.execute_let("obj = {'v': 7, 'get': function('Get')}").unwrap();
    assert_eq!(run(&mut interp, "obj.get()"), Value::int(7));
    assert!(matches!(
        kind(&mut interp, "Get()"),
        EvalErrorKind::DictFunctionWithoutDict { .. }
    ));
}

#[test]
fn partial_dict_wins_over_call_site() {
    let mut interp = Interpreter::new();
    interp.define_function("Get", &[], "self.v", true).unwrap();
    interp
        .execute_let("bound = function('Get', {'v': 'bound'})")
        .unwrap();
    interp
        .execute_let("obj = {'v': 'site', 'get': bound}")
        .unwrap();
    assert_eq!(repr(&mut interp, "obj.get()"), "'bound'");
}

#[test]
fn recursion_limit_is_enforced() {
    let mut interp = InterpreterBuilder::new().max_call_depth(10).build();
    interp
        .define_function("Loop", &["n"], "Loop(a:n + 1)", false)
        .unwrap();
    assert_eq!(kind(&mut interp, "Loop(0)"), EvalErrorKind::RecursionLimit);
    assert_eq!(interp.env().depth(), 0);
}

#[test]
fn unknown_function_is_reported() {
    let mut interp = Interpreter::new();
    assert_eq!(
        kind(&mut interp, "NoSuch(1)"),
        EvalErrorKind::UnknownFunction {
            name: "NoSuch".into()
        }
    );
}

#[test]
fn lambdas_capture_the_defining_frame() {
    let mut interp = Interpreter::new();
    interp.define_function("Scaler", &["n"], "{x -> x * n}", false).unwrap();
    interp.execute_let("Triple = Scaler(3)").unwrap();
    assert_eq!(run(&mut interp, "Triple(5)"), Value::int(15));
}

#[test]
fn lambda_falls_back_to_globals() {
    let mut interp = with_vars(&["base = 100"]);
    assert_eq!(run(&mut interp, "{x -> x + base}(1)"), Value::int(101));
    assert!(matches!(
        kind(&mut interp, "{x -> x}()"),
        EvalErrorKind::TooFewArguments { .. }
    ));
}

#[test]
fn method_calls_prepend_receiver() {
    let mut interp = Interpreter::new();
    assert_eq!(repr(&mut interp, "[3, 1, 2]->sort()->reverse()"), "[3, 2, 1]");
    assert_eq!(repr(&mut interp, "'abc'->toupper()"), "'ABC'");
    assert_eq!(run(&mut interp, "5->{x -> x * 2}()"), Value::int(10));
}

#[test]
fn call_and_funcref_builtins() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "call('len', [[1, 2, 3]])"), Value::int(3));
    assert_eq!(run(&mut interp, "call({a, b -> a - b}, [5, 2])"), Value::int(3));
    let err = interp.eval_str("function('NoSuch')").unwrap_err();
    assert!(err.message.starts_with("E700"), "{}", err.message);
    assert_eq!(run(&mut interp, "funcref('len', [[1]])()"), Value::int(1));
}

// :let, :unlet, :lockvar

#[test]
fn let_compound_operators() {
    let mut interp = with_vars(&["n = 10", "n += 5", "n -= 1", "s = 'a'", "s .= 'b'"]);
    assert_eq!(run(&mut interp, "n"), Value::int(14));
    assert_eq!(repr(&mut interp, "s"), "'ab'");
}

#[test]
fn list_add_assign_extends_in_place() {
    let mut interp = with_vars(&["nums = [1]", "alias = nums", "nums += [2]"]);
    assert_eq!(repr(&mut interp, "alias"), "[1, 2]");
}

#[test]
fn let_unpack_with_rest() {
    let mut interp = with_vars(&["[x, y; rest] = [1, 2, 3, 4]"]);
    assert_eq!(run(&mut interp, "x"), Value::int(1));
    assert_eq!(run(&mut interp, "y"), Value::int(2));
    assert_eq!(repr(&mut interp, "rest"), "[3, 4]");
}

#[test]
fn let_unpack_count_mismatch() {
    let mut interp = Interpreter::new();
    assert_eq!(
        interp.execute_let("[x, y] = [1]").unwrap_err().kind,
        EvalErrorKind::MoreTargetsThanItems
    );
    assert_eq!(
        interp.execute_let("[x, y] = [1, 2, 3]").unwrap_err().kind,
        EvalErrorKind::FewerTargetsThanItems
    );
    assert_eq!(
        interp.execute_let("[x, y] = 5").unwrap_err().kind,
        EvalErrorKind::ListRequired
    );
}

#[test]
fn let_slice_assignment() {
    let mut interp = with_vars(&["nums = [1, 2, 3, 4]", "nums[1:2] = [8, 9]"]);
    assert_eq!(repr(&mut interp, "nums"), "[1, 8, 9, 4]");
    assert_eq!(
        interp.execute_let("nums[0:1] = [7]").unwrap_err().kind,
        EvalErrorKind::NotEnoughListItems
    );
    assert_eq!(
        interp.execute_let("nums[0:1] = [7, 7, 7]").unwrap_err().kind,
        EvalErrorKind::TooManyListItems
    );
    interp.execute_let("nums[2:] = [5, 6, 7]").unwrap();
    assert_eq!(repr(&mut interp, "nums"), "[1, 8, 5, 6, 7]");
}

#[test]
fn let_index_and_member_targets() {
    let mut interp = with_vars(&["d = {}", "d.k = 1", "d['j'] = 2", "b = 0z01", "b[1] = 255"]);
    assert_eq!(repr(&mut interp, "d"), "{'k': 1, 'j': 2}");
    assert_eq!(repr(&mut interp, "b"), "0z01FF");
}

#[test]
fn let_env_var_overrides_without_touching_process() {
    let mut interp = with_vars(&["$VIMX_TEST_ONLY_VAR = 'set'"]);
    assert_eq!(repr(&mut interp, "$VIMX_TEST_ONLY_VAR"), "'set'");
    assert!(std::env::var_os("VIMX_TEST_ONLY_VAR").is_none());
}

#[test]
fn let_option() {
    let mut interp = with_vars(&["&ignorecase = 1"]);
    assert!(interp.options().ignorecase);
    assert_eq!(run(&mut interp, "&ic"), Value::int(1));
    assert!(matches!(
        interp.execute_let("&nosuchoption = 1").unwrap_err().kind,
        EvalErrorKind::Custom { .. }
    ));
}

#[test]
fn unlet_variables_items_and_slices() {
    let mut interp = with_vars(&["x = 1", "nums = [1, 2, 3, 4]", "d = {'a': 1, 'b': 2}"]);
    interp.unlet("x nums[0] d.a", false).unwrap();
    assert!(interp.variable("x").is_none());
    assert_eq!(repr(&mut interp, "nums"), "[2, 3, 4]");
    assert_eq!(repr(&mut interp, "d"), "{'b': 2}");
    interp.unlet("nums[1:]", false).unwrap();
    assert_eq!(repr(&mut interp, "nums"), "[2]");
}

#[test]
fn unlet_missing_needs_bang() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        interp.unlet("nosuch", false).unwrap_err().kind,
        EvalErrorKind::NoSuchVariable { .. }
    ));
    interp.unlet("nosuch", true).unwrap();
}

#[test]
fn lockvar_depth_one_locks_values_not_container() {
    let mut interp = with_vars(&["d = {'k': [1]}", "l = [1, 2, 3]"]);
    interp.lockvar("d", LockDepth::ITEMS, true).unwrap();
    // Existing entries are frozen; the Dictionary itself can still grow.
    assert!(interp.execute_let("d.k = [2]").unwrap_err().is_lock_error());
    interp.execute_let("d.new = 1").unwrap();
    assert!(interp.execute_let("d = {}").unwrap_err().is_lock_error());
    interp.eval_str("add(d.k, 3)").unwrap();
    assert_eq!(repr(&mut interp, "d.k"), "[1, 3]");

    interp.lockvar("l", LockDepth::ITEMS, true).unwrap();
    let err = interp.execute_let("l[0] = 9").unwrap_err();
    assert!(matches!(err.kind, EvalErrorKind::LockedValue { .. }));
    assert_eq!(interp.eval_str("remove(l, 0)").unwrap(), Value::int(1));
    assert_eq!(repr(&mut interp, "l"), "[2, 3]");
}

#[test]
fn lockvar_default_depth_reaches_items() {
    let mut interp = with_vars(&["d = {'k': [1]}"]);
    interp.lockvar("d", LockDepth::DEFAULT, true).unwrap();
    assert!(interp.execute_let("d.k = [2]").unwrap_err().is_lock_error());
    assert!(interp.execute_let("d.new = 1").unwrap_err().is_lock_error());
    assert!(interp.execute_let("d.k[0] = 2").unwrap_err().is_lock_error());
    // Two levels stop short of the nested List's own structure.
    interp.eval_str("add(d.k, 3)").unwrap();
    interp.lockvar("d", LockDepth::DEFAULT, false).unwrap();
    interp.execute_let("d.k = [2]").unwrap();
}

#[test]
fn islocked_reports_state() {
    let mut interp = with_vars(&["nums = [1, 2]"]);
    assert_eq!(run(&mut interp, "islocked('nums')"), Value::int(0));
    interp.lockvar("nums[1]", LockDepth::DEFAULT, true).unwrap();
    assert_eq!(run(&mut interp, "islocked('nums[1]')"), Value::int(1));
    assert_eq!(run(&mut interp, "islocked('nums[0]')"), Value::int(0));
    assert_eq!(run(&mut interp, "islocked('nosuch')"), Value::int(-1));
}

#[test]
fn read_only_vim_variables() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        interp.execute_let("v:true = 0").unwrap_err().kind,
        EvalErrorKind::ReadOnlyVariable { .. }
    ));
}

// Conversions and misc builtins

#[test]
fn str2nr_bases() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "str2nr('  42abc')"), Value::int(42));
    assert_eq!(run(&mut interp, "str2nr('-0x1F', 16)"), Value::int(-31));
    assert_eq!(run(&mut interp, "str2nr('0b101', 2)"), Value::int(5));
    assert_eq!(run(&mut interp, "str2nr('017', 8)"), Value::int(15));
    assert_eq!(run(&mut interp, "str2nr('0x1F')"), Value::int(0));
    assert!(matches!(
        kind(&mut interp, "str2nr('1', 7)"),
        EvalErrorKind::InvalidArgument { .. }
    ));
}

#[test]
fn float_conversions() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "str2float(' 1.5e1')"), Value::float(15.0));
    assert_eq!(run(&mut interp, "float2nr(-3.9)"), Value::int(-3));
    assert_eq!(run(&mut interp, "abs(-2.5)"), Value::float(2.5));
    assert_eq!(run(&mut interp, "abs(-7)"), Value::int(7));
    let err = interp.eval_str("float2nr('x')").unwrap_err();
    assert!(err.message.starts_with("E808"), "{}", err.message);
}

#[test]
fn type_and_string_forms() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "type(1)"), Value::int(0));
    assert_eq!(run(&mut interp, "type('')"), Value::int(1));
    assert_eq!(run(&mut interp, "type([]) == v:t_list"), Value::int(1));
    assert_eq!(run(&mut interp, "string([1, 'a'])"), Value::string("[1, 'a']"));
    assert_eq!(run(&mut interp, "strlen('héllo')"), Value::int(6));
}

#[test]
fn bitwise_builtins() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "and(12, 10)"), Value::int(8));
    assert_eq!(run(&mut interp, "or(12, 10)"), Value::int(14));
    assert_eq!(run(&mut interp, "xor(12, 10)"), Value::int(6));
    assert_eq!(run(&mut interp, "invert(0)"), Value::int(-1));
}

#[test]
fn exists_checks_each_namespace() {
    let mut interp = with_vars(&["g:present = {'k': 1}"]);
    assert_eq!(run(&mut interp, "exists('g:present')"), Value::int(1));
    assert_eq!(run(&mut interp, "exists('g:present.k')"), Value::int(1));
    assert_eq!(run(&mut interp, "exists('g:absent')"), Value::int(0));
    assert_eq!(run(&mut interp, "exists('*len')"), Value::int(1));
    assert_eq!(run(&mut interp, "exists('*NoSuch')"), Value::int(0));
    assert_eq!(run(&mut interp, "exists('&ignorecase')"), Value::int(1));
    assert_eq!(run(&mut interp, "exists('&nosuch')"), Value::int(0));
}

#[test]
fn eval_builtin_parses_text() {
    let mut interp = Interpreter::new();
    assert_eq!(run(&mut interp, "eval('1 + 1')"), Value::int(2));
}

#[test]
fn builtin_arity_is_checked() {
    let mut interp = Interpreter::new();
    assert!(matches!(
        kind(&mut interp, "len()"),
        EvalErrorKind::TooFewArguments { .. }
    ));
    assert!(matches!(
        kind(&mut interp, "len(1, 2)"),
        EvalErrorKind::TooManyArguments { .. }
    ));
}
