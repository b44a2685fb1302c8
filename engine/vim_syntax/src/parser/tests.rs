#![expect(clippy::unwrap_used, reason = "Tests use unwrap for brevity")]

use pretty_assertions::assert_eq;

use super::*;
use crate::ast::{AssignOp, CaseMode, ScopeKind};

fn parse(src: &str) -> Expr {
    parse_expression(src).unwrap()
}

/// Render an expression back as a fully parenthesized string.
fn sexp(expr: &Expr) -> String {
    match &expr.kind {
        ExprKind::Number(n) => n.to_string(),
        ExprKind::Float(f) => format!("{f:?}"),
        ExprKind::String(s) => format!("'{s}'"),
        ExprKind::Blob(b) => format!("0z{}", b.len()),
        ExprKind::List(items) => {
            let inner: Vec<_> = items.iter().map(sexp).collect();
            format!("[{}]", inner.join(", "))
        }
        ExprKind::Dict(entries) => {
            let inner: Vec<_> = entries
                .iter()
                .map(|(k, v)| format!("{}: {}", sexp(k), sexp(v)))
                .collect();
            format!("{{{}}}", inner.join(", "))
        }
        ExprKind::Lambda(lambda) => {
            format!("{{{} -> {}}}", lambda.params.join(", "), sexp(&lambda.body))
        }
        ExprKind::Variable(name) => name.to_string(),
        ExprKind::Option(name) => format!("&{name}"),
        ExprKind::Env(name) => format!("${name}"),
        ExprKind::Index { base, index } => format!("{}[{}]", sexp(base), sexp(index)),
        ExprKind::Slice { base, start, end } => format!(
            "{}[{}:{}]",
            sexp(base),
            start.as_deref().map(sexp).unwrap_or_default(),
            end.as_deref().map(sexp).unwrap_or_default()
        ),
        ExprKind::Member { base, key } => format!("{}.{}", sexp(base), key),
        ExprKind::Call { callee, args } => {
            let inner: Vec<_> = args.iter().map(sexp).collect();
            format!("{}({})", sexp(callee), inner.join(", "))
        }
        ExprKind::MethodCall {
            receiver,
            callee,
            args,
        } => {
            let inner: Vec<_> = args.iter().map(sexp).collect();
            format!("{}->{}({})", sexp(receiver), sexp(callee), inner.join(", "))
        }
        ExprKind::Unary { op, operand } => format!("({}{})", op.as_symbol(), sexp(operand)),
        ExprKind::Binary { op, left, right } => {
            format!("({} {} {})", sexp(left), op, sexp(right))
        }
        ExprKind::Ternary {
            cond,
            then,
            otherwise,
        } => format!("({} ? {} : {})", sexp(cond), sexp(then), sexp(otherwise)),
        ExprKind::Coalesce { left, right } => format!("({} ?? {})", sexp(left), sexp(right)),
    }
}

fn shape(src: &str) -> String {
    sexp(&parse(src))
}

#[test]
fn arithmetic_precedence() {
    assert_eq!(shape("1 + 2 * 3"), "(1 + (2 * 3))");
    assert_eq!(shape("1 - 2 - 3"), "((1 - 2) - 3)");
    assert_eq!(shape("-x[0]"), "(-x[0])");
    assert_eq!(shape("!a && b || c"), "(((!a) && b) || c)");
}

#[test]
fn logical_binds_looser_than_comparison() {
    assert_eq!(shape("a == 1 && b < 2"), "((a == 1) && (b < 2))");
    assert_eq!(shape("a || b && c"), "(a || (b && c))");
}

#[test]
fn shift_sits_between_comparison_and_additive() {
    assert_eq!(shape("1 << 2 + 1"), "(1 << (2 + 1))");
    assert_eq!(shape("x >> 1 == 0"), "((x >> 1) == 0)");
}

#[test]
fn comparisons_do_not_chain() {
    let err = parse_expression("1 == 1 == 1").unwrap_err();
    assert!(matches!(err.kind, SyntaxErrorKind::TrailingCharacters(_)));
}

#[test]
fn case_suffix_is_kept() {
    let expr = parse("a ==? b");
    let ExprKind::Binary { op, .. } = expr.kind else {
        panic!("expected binary");
    };
    assert_eq!(op, BinaryOp::Eq(CaseMode::IgnoreCase));
}

#[test]
fn ternary_and_coalesce() {
    assert_eq!(shape("a ? 1 : b ? 2 : 3"), "(a ? 1 : (b ? 2 : 3))");
    assert_eq!(shape("x ?? 'default'"), "(x ?? 'default')");
}

#[test]
fn concat_versus_member() {
    assert_eq!(shape("a . b"), "(a . b)");
    assert_eq!(shape("d.key"), "d.key");
    assert_eq!(shape("d.a.b"), "d.a.b");
    assert_eq!(shape("a .. 'x'"), "(a .. 'x')");
}

#[test]
fn index_slice_and_calls() {
    assert_eq!(shape("l[1:2]"), "l[1:2]");
    assert_eq!(shape("l[:2]"), "l[:2]");
    assert_eq!(shape("l[1:]"), "l[1:]");
    assert_eq!(shape("len(l) + 1"), "(len(l) + 1)");
    assert_eq!(shape("d['k'](1, 2)"), "d['k'](1, 2)");
}

#[test]
fn method_calls_chain() {
    assert_eq!(shape("l->filter('v:val')->len()"), "l->filter('v:val')->len()");
    assert_eq!(shape("x->{a -> a + 1}()"), "x->{a -> (a + 1)}()");
}

#[test]
fn lambda_versus_dict() {
    assert_eq!(shape("{a, b -> a + b}"), "{a, b -> (a + b)}");
    assert_eq!(shape("{-> 1}"), "{ -> 1}");
    assert_eq!(shape("{'a': 1, 'b': [2]}"), "{'a': 1, 'b': [2]}");
    assert_eq!(shape("#{a: 1, b2: 2}"), "{'a': 1, 'b2': 2}");
}

#[test]
fn literals() {
    assert_eq!(shape("[1, 2.5, 'x', \"y\"]"), "[1, 2.5, 'x', 'y']");
    assert_eq!(shape("[1, 2,]"), "[1, 2]");
    assert_eq!(shape("0x10 + 010"), "(16 + 8)");
}

#[test]
fn scoped_variables() {
    let expr = parse("v:val");
    assert_eq!(
        expr.kind,
        ExprKind::Variable(VarName::new(Some(ScopeKind::Vim), "val"))
    );
    assert_eq!(shape("g:"), "g:");
}

#[test]
fn expression_list_splits_on_whitespace() {
    let exprs = parse_expression_list("'a' 'b' 1 + 2").unwrap();
    let shapes: Vec<_> = exprs.iter().map(sexp).collect();
    assert_eq!(shapes, vec!["'a'", "'b'", "(1 + 2)"]);
}

#[test]
fn let_statement_forms() {
    let stmt = parse_let("x += 1").unwrap();
    assert_eq!(stmt.op, AssignOp::Add);
    let LetTarget::Single(target) = &stmt.target else {
        panic!("expected single target");
    };
    assert_eq!(sexp(target), "x");

    let stmt = parse_let("[a, b; rest] = l").unwrap();
    let LetTarget::Unpack { items, rest } = &stmt.target else {
        panic!("expected unpack");
    };
    assert_eq!(items.len(), 2);
    assert!(rest.is_some());

    let stmt = parse_let("d.k[0] ..= 'x'").unwrap();
    assert_eq!(stmt.op, AssignOp::Concat);
}

#[test]
fn let_rejects_non_lvalues() {
    let err = parse_let("f(1) = 2").unwrap_err();
    assert!(matches!(err.kind, SyntaxErrorKind::InvalidTarget(_)));
    assert!(parse_let("x").is_err());
}

#[test]
fn targets_for_unlet() {
    let targets = parse_targets("a g:b l[0] d.k").unwrap();
    let shapes: Vec<_> = targets.iter().map(sexp).collect();
    assert_eq!(shapes, vec!["a", "g:b", "l[0]", "d.k"]);
}

#[test]
fn errors_carry_vim_numbers() {
    assert_eq!(
        parse_expression("[1, 2").unwrap_err().to_string(),
        "E697: Missing end of List ']'"
    );
    assert_eq!(
        parse_expression("(1 + 2").unwrap_err().to_string(),
        "E110: Missing ')'"
    );
    assert!(parse_expression("1 +")
        .unwrap_err()
        .to_string()
        .starts_with("E15:"));
}

#[test]
fn deeply_nested_lists_parse() {
    let depth = 5_000;
    let src = format!("{}{}", "[".repeat(depth), "]".repeat(depth));
    assert!(parse_expression(&src).is_ok());
}
