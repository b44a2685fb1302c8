//! Expression tree for Vim script.
//!
//! Nodes own their children through `Box`. Lambda bodies are held in an
//! `Rc` so a runtime funcref can keep its body alive after the command
//! line that defined it is gone.

use std::fmt;
use std::rc::Rc;

use crate::Span;

/// How a comparison treats letter case.
///
/// `==` follows the `ignorecase` option, `==#` always matches case and
/// `==?` always ignores it.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Default)]
pub enum CaseMode {
    #[default]
    Default,
    MatchCase,
    IgnoreCase,
}

impl CaseMode {
    /// Resolve against the `ignorecase` option.
    #[inline]
    pub const fn ignores_case(self, ignorecase_option: bool) -> bool {
        match self {
            CaseMode::Default => ignorecase_option,
            CaseMode::MatchCase => false,
            CaseMode::IgnoreCase => true,
        }
    }

    const fn suffix(self) -> &'static str {
        match self {
            CaseMode::Default => "",
            CaseMode::MatchCase => "#",
            CaseMode::IgnoreCase => "?",
        }
    }
}

/// Binary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum BinaryOp {
    // Arithmetic
    Add,
    Sub,
    Mul,
    Div,
    Mod,

    // String concatenation: `.` and `..`
    Concat,
    DotDot,

    // Comparison
    Eq(CaseMode),
    NotEq(CaseMode),
    Lt(CaseMode),
    LtEq(CaseMode),
    Gt(CaseMode),
    GtEq(CaseMode),
    Match(CaseMode),
    NoMatch(CaseMode),
    Is(CaseMode),
    IsNot(CaseMode),

    // Bitwise shift
    Shl,
    Shr,

    // Logical
    And,
    Or,
}

impl BinaryOp {
    /// Source-level symbol without the case suffix.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Sub => "-",
            Self::Mul => "*",
            Self::Div => "/",
            Self::Mod => "%",
            Self::Concat => ".",
            Self::DotDot => "..",
            Self::Eq(_) => "==",
            Self::NotEq(_) => "!=",
            Self::Lt(_) => "<",
            Self::LtEq(_) => "<=",
            Self::Gt(_) => ">",
            Self::GtEq(_) => ">=",
            Self::Match(_) => "=~",
            Self::NoMatch(_) => "!~",
            Self::Is(_) => "is",
            Self::IsNot(_) => "isnot",
            Self::Shl => "<<",
            Self::Shr => ">>",
            Self::And => "&&",
            Self::Or => "||",
        }
    }

    /// Case mode of a comparison, `None` for every other operator.
    pub const fn case_mode(self) -> Option<CaseMode> {
        match self {
            Self::Eq(c)
            | Self::NotEq(c)
            | Self::Lt(c)
            | Self::LtEq(c)
            | Self::Gt(c)
            | Self::GtEq(c)
            | Self::Match(c)
            | Self::NoMatch(c)
            | Self::Is(c)
            | Self::IsNot(c) => Some(c),
            _ => None,
        }
    }

    /// Binding strength, higher binds tighter.
    ///
    /// - 1: `||`
    /// - 2: `&&`
    /// - 3: comparisons (non-associative)
    /// - 4: `<<` `>>`
    /// - 5: `+` `-` `.` `..`
    /// - 6: `*` `/` `%`
    pub const fn precedence(self) -> u8 {
        match self {
            Self::Or => 1,
            Self::And => 2,
            Self::Eq(_)
            | Self::NotEq(_)
            | Self::Lt(_)
            | Self::LtEq(_)
            | Self::Gt(_)
            | Self::GtEq(_)
            | Self::Match(_)
            | Self::NoMatch(_)
            | Self::Is(_)
            | Self::IsNot(_) => 3,
            Self::Shl | Self::Shr => 4,
            Self::Add | Self::Sub | Self::Concat | Self::DotDot => 5,
            Self::Mul | Self::Div | Self::Mod => 6,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let suffix = self.case_mode().map_or("", CaseMode::suffix);
        write!(f, "{}{}", self.as_symbol(), suffix)
    }
}

/// Unary operators.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum UnaryOp {
    Neg,
    Plus,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            Self::Neg => "-",
            Self::Plus => "+",
            Self::Not => "!",
        }
    }
}

/// Variable scope prefix (`g:`, `l:`, ...).
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ScopeKind {
    Global,
    Script,
    Local,
    Argument,
    Vim,
    Buffer,
    Window,
    Tab,
}

impl ScopeKind {
    pub const fn from_char(c: char) -> Option<ScopeKind> {
        match c {
            'g' => Some(ScopeKind::Global),
            's' => Some(ScopeKind::Script),
            'l' => Some(ScopeKind::Local),
            'a' => Some(ScopeKind::Argument),
            'v' => Some(ScopeKind::Vim),
            'b' => Some(ScopeKind::Buffer),
            'w' => Some(ScopeKind::Window),
            't' => Some(ScopeKind::Tab),
            _ => None,
        }
    }

    pub const fn prefix(self) -> &'static str {
        match self {
            ScopeKind::Global => "g:",
            ScopeKind::Script => "s:",
            ScopeKind::Local => "l:",
            ScopeKind::Argument => "a:",
            ScopeKind::Vim => "v:",
            ScopeKind::Buffer => "b:",
            ScopeKind::Window => "w:",
            ScopeKind::Tab => "t:",
        }
    }
}

/// A possibly scope-qualified variable name. An empty `name` with a scope
/// denotes the scope dictionary itself (`g:`).
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct VarName {
    pub scope: Option<ScopeKind>,
    pub name: Rc<str>,
}

impl VarName {
    pub fn new(scope: Option<ScopeKind>, name: impl Into<Rc<str>>) -> Self {
        VarName {
            scope,
            name: name.into(),
        }
    }

    pub fn is_scope_dict(&self) -> bool {
        self.scope.is_some() && self.name.is_empty()
    }
}

impl fmt::Display for VarName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.scope {
            Some(scope) => write!(f, "{}{}", scope.prefix(), self.name),
            None => f.write_str(&self.name),
        }
    }
}

/// `{a, b -> body}`
#[derive(Debug, PartialEq)]
pub struct LambdaExpr {
    pub params: Vec<Rc<str>>,
    pub body: Expr,
}

/// Expression node with its source span.
#[derive(Clone, Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn new(kind: ExprKind, span: Span) -> Self {
        Expr { kind, span }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ExprKind {
    Number(i64),
    Float(f64),
    String(Rc<str>),
    Blob(Rc<[u8]>),
    List(Vec<Expr>),
    /// Key expressions are evaluated and converted to strings at runtime.
    Dict(Vec<(Expr, Expr)>),
    Lambda(Rc<LambdaExpr>),
    Variable(VarName),
    /// `&opt`, `&l:opt`
    Option(Rc<str>),
    /// `$NAME`
    Env(Rc<str>),
    Index {
        base: Box<Expr>,
        index: Box<Expr>,
    },
    Slice {
        base: Box<Expr>,
        start: Option<Box<Expr>>,
        end: Option<Box<Expr>>,
    },
    /// `base.key`: dictionary member, or concatenation when `base` is not a
    /// dictionary at runtime.
    Member {
        base: Box<Expr>,
        key: Rc<str>,
    },
    Call {
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    /// `receiver->callee(args)`: `receiver` becomes the first argument.
    MethodCall {
        receiver: Box<Expr>,
        callee: Box<Expr>,
        args: Vec<Expr>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Ternary {
        cond: Box<Expr>,
        then: Box<Expr>,
        otherwise: Box<Expr>,
    },
    /// `left ?? right`
    Coalesce {
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl ExprKind {
    /// Whether this node can appear on the left of `:let`.
    pub fn is_assignable(&self) -> bool {
        match self {
            ExprKind::Variable(name) => !name.is_scope_dict(),
            ExprKind::Option(_) | ExprKind::Env(_) => true,
            ExprKind::Index { base, .. }
            | ExprKind::Slice { base, .. }
            | ExprKind::Member { base, .. } => base.kind.is_lvalue_base(),
            _ => false,
        }
    }

    fn is_lvalue_base(&self) -> bool {
        match self {
            ExprKind::Variable(_) => true,
            ExprKind::Index { base, .. } | ExprKind::Member { base, .. } => {
                base.kind.is_lvalue_base()
            }
            _ => false,
        }
    }
}

/// Assignment operator of `:let`.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum AssignOp {
    Assign,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Concat,
}

impl AssignOp {
    /// Source-level symbol of the assignment.
    pub const fn as_symbol(self) -> &'static str {
        match self {
            AssignOp::Assign => "=",
            AssignOp::Add => "+=",
            AssignOp::Sub => "-=",
            AssignOp::Mul => "*=",
            AssignOp::Div => "/=",
            AssignOp::Mod => "%=",
            AssignOp::Concat => "..=",
        }
    }

    /// The binary operator a compound assignment applies.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            AssignOp::Assign => None,
            AssignOp::Add => Some(BinaryOp::Add),
            AssignOp::Sub => Some(BinaryOp::Sub),
            AssignOp::Mul => Some(BinaryOp::Mul),
            AssignOp::Div => Some(BinaryOp::Div),
            AssignOp::Mod => Some(BinaryOp::Mod),
            AssignOp::Concat => Some(BinaryOp::DotDot),
        }
    }
}

/// Left-hand side of `:let`.
#[derive(Clone, Debug, PartialEq)]
pub enum LetTarget {
    Single(Expr),
    /// `[a, b; rest]`
    Unpack {
        items: Vec<Expr>,
        rest: Option<Expr>,
    },
}

/// `:let {target} {op} {value}`
#[derive(Clone, Debug, PartialEq)]
pub struct LetStatement {
    pub target: LetTarget,
    pub op: AssignOp,
    pub value: Expr,
}
