//! Callable references.
//!
//! A `Funcref` names its target (a builtin or user function by name, or a
//! lambda) and may carry bound leading arguments and a bound `self`
//! Dictionary. References made with `function()` compare by target, bound
//! arguments and bound Dictionary. Lambdas and `funcref()` results only
//! equal themselves.

use std::fmt;
use std::rc::Rc;

use smallvec::SmallVec;
use vim_syntax::LambdaExpr;

use super::{DictRef, Value};

/// The `l:` and `a:` scopes a lambda closes over.
#[derive(Clone, Debug)]
pub struct Closure {
    pub locals: DictRef,
    pub args: DictRef,
}

/// A lambda expression plus its captured scope.
#[derive(Debug)]
pub struct Lambda {
    /// `<lambda>N`, unique per evaluation of the lambda literal.
    pub name: Rc<str>,
    pub expr: Rc<LambdaExpr>,
    pub closure: Option<Closure>,
}

#[derive(Clone, Debug)]
pub enum FuncTarget {
    /// Builtin or user-defined function, looked up at call time.
    Named(Rc<str>),
    Lambda(Rc<Lambda>),
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FuncrefKind {
    /// Made by `function()`: compares by value.
    Function,
    /// Lambda or `funcref()` result: compares by identity.
    Identity,
}

#[derive(Debug)]
struct FuncrefData {
    target: FuncTarget,
    bound_args: SmallVec<[Value; 2]>,
    self_dict: Option<DictRef>,
    kind: FuncrefKind,
}

/// Shared callable reference. Clones share identity.
#[derive(Clone)]
pub struct Funcref(Rc<FuncrefData>);

impl Funcref {
    /// Plain reference to a named function, as `function('name')`.
    pub fn named(name: impl Into<Rc<str>>) -> Self {
        Self::new(
            FuncTarget::Named(name.into()),
            SmallVec::new(),
            None,
            FuncrefKind::Function,
        )
    }

    pub fn lambda(lambda: Lambda) -> Self {
        Self::new(
            FuncTarget::Lambda(Rc::new(lambda)),
            SmallVec::new(),
            None,
            FuncrefKind::Identity,
        )
    }

    pub fn new(
        target: FuncTarget,
        bound_args: SmallVec<[Value; 2]>,
        self_dict: Option<DictRef>,
        kind: FuncrefKind,
    ) -> Self {
        Funcref(Rc::new(FuncrefData {
            target,
            bound_args,
            self_dict,
            kind,
        }))
    }

    /// New partial: this reference's target with extra bound arguments
    /// appended and, if given, a replacement `self`.
    #[must_use]
    pub fn partial(&self, args: &[Value], self_dict: Option<DictRef>) -> Self {
        let mut bound = self.0.bound_args.clone();
        bound.extend(args.iter().cloned());
        Self::new(
            self.0.target.clone(),
            bound,
            self_dict.or_else(|| self.0.self_dict.clone()),
            self.0.kind,
        )
    }

    pub fn target(&self) -> &FuncTarget {
        &self.0.target
    }

    pub fn bound_args(&self) -> &[Value] {
        &self.0.bound_args
    }

    pub fn self_dict(&self) -> Option<&DictRef> {
        self.0.self_dict.as_ref()
    }

    pub fn kind(&self) -> FuncrefKind {
        self.0.kind
    }

    /// Function name as shown by `:echo` and `get(F, 'name')`.
    pub fn name(&self) -> &str {
        match &self.0.target {
            FuncTarget::Named(name) => name,
            FuncTarget::Lambda(lambda) => &lambda.name,
        }
    }

    pub fn ptr_eq(&self, other: &Funcref) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub fn is_partial(&self) -> bool {
        !self.0.bound_args.is_empty() || self.0.self_dict.is_some()
    }

    /// Equality used by `==`.
    pub fn equals(&self, other: &Funcref) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        if self.kind() == FuncrefKind::Identity || other.kind() == FuncrefKind::Identity {
            return false;
        }
        let same_target = match (self.target(), other.target()) {
            (FuncTarget::Named(a), FuncTarget::Named(b)) => a == b,
            (FuncTarget::Lambda(a), FuncTarget::Lambda(b)) => Rc::ptr_eq(a, b),
            _ => false,
        };
        let same_dict = match (self.self_dict(), other.self_dict()) {
            (None, None) => true,
            (Some(a), Some(b)) => a.ptr_eq(b),
            _ => false,
        };
        same_target && same_dict && self.bound_args() == other.bound_args()
    }
}

impl fmt::Debug for Funcref {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Funcref({}, args={}, kind={:?})",
            self.name(),
            self.bound_args().len(),
            self.kind()
        )
    }
}
