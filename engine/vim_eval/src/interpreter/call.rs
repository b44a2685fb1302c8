//! Function calls.
//!
//! Resolution order for `Name(...)`: a user function, then a builtin,
//! then a variable holding a Funcref. Qualified names (`l:F`, `a:F`) only
//! ever refer to variables; `s:name` refers to a script function first.

use std::rc::Rc;

use vim_syntax::{Expr, ExprKind, ScopeKind, VarName};
use vim_value::{
    dict_function_without_dict, key_not_present, not_callable, recursion_limit,
    too_few_arguments, too_many_arguments, unknown_function, DictRef, EvalError, EvalResult,
    FuncTarget, Funcref, Lambda, Value,
};

use super::{count_value, normalize_function_name, Interpreter, UserFunction};
use crate::builtins::{self, Builtin};
use crate::environment::{Frame, FrameKind};

/// What a call expression resolved to before its arguments were
/// evaluated.
enum Callee {
    Named(Rc<str>),
    Value {
        value: Value,
        self_dict: Option<DictRef>,
    },
}

impl Interpreter {
    /// Call a function by name (`:call Foo(1)`, `call('Foo', [1])`).
    pub fn call_function(&mut self, name: &str, args: &[Value]) -> EvalResult {
        self.call_named(name, args, None)
    }

    /// Call a Funcref or a function name held in a String.
    pub fn call_value(&mut self, callee: &Value, args: &[Value]) -> EvalResult {
        self.call_value_with_self(callee, args, None)
    }

    pub fn call_value_with_self(
        &mut self,
        callee: &Value,
        args: &[Value],
        self_dict: Option<DictRef>,
    ) -> EvalResult {
        match callee {
            Value::Funcref(f) => self.call_funcref(f, args, self_dict),
            Value::String(name) => self.call_named(name, args, self_dict),
            other => Err(not_callable(other.value_type())),
        }
    }

    /// Bound arguments come first; a Dictionary bound into the partial
    /// wins over the one the call went through.
    pub fn call_funcref(
        &mut self,
        funcref: &Funcref,
        args: &[Value],
        self_dict: Option<DictRef>,
    ) -> EvalResult {
        let mut all = funcref.bound_args().to_vec();
        all.extend_from_slice(args);
        let self_dict = funcref.self_dict().cloned().or(self_dict);
        match funcref.target() {
            FuncTarget::Named(name) => self.call_named(name, &all, self_dict),
            FuncTarget::Lambda(lambda) => self.call_lambda(lambda, &all),
        }
    }

    pub(crate) fn call_named(
        &mut self,
        name: &str,
        args: &[Value],
        self_dict: Option<DictRef>,
    ) -> EvalResult {
        let name = normalize_function_name(name);
        if let Some(function) = self.functions.get(name).cloned() {
            return self.call_user(&function, args, self_dict);
        }
        if let Some(builtin) = builtins::lookup(name) {
            return self.call_builtin(builtin, args);
        }
        Err(unknown_function(name))
    }

    fn call_builtin(&mut self, builtin: &Builtin, args: &[Value]) -> EvalResult {
        if args.len() < builtin.min_args {
            return Err(too_few_arguments(builtin.name));
        }
        if args.len() > builtin.max_args {
            return Err(too_many_arguments(builtin.name));
        }
        tracing::trace!(name = builtin.name, args = args.len(), "builtin call");
        (builtin.func)(self, args)
    }

    fn check_depth(&self) -> Result<(), EvalError> {
        if self.env.depth() >= self.options.max_call_depth {
            tracing::debug!(depth = self.env.depth(), "call depth exceeded");
            return Err(recursion_limit());
        }
        Ok(())
    }

    fn call_user(
        &mut self,
        function: &Rc<UserFunction>,
        args: &[Value],
        self_dict: Option<DictRef>,
    ) -> EvalResult {
        self.check_depth()?;
        let name = &function.name;
        if args.len() < function.params.len() {
            return Err(too_few_arguments(name));
        }
        if !function.varargs && args.len() > function.params.len() {
            return Err(too_many_arguments(name));
        }
        if function.dict && self_dict.is_none() {
            return Err(dict_function_without_dict(name));
        }

        let frame = Frame::new(Rc::clone(name), FrameKind::Function);
        for (param, value) in function.params.iter().zip(args) {
            frame.args.insert(Rc::clone(param), value.clone());
        }
        if function.varargs {
            let extra = &args[function.params.len()..];
            frame.args.insert("0", count_value(extra.len()));
            frame.args.insert("000", Value::list(extra.to_vec()));
            for (i, value) in extra.iter().enumerate() {
                frame.args.insert((i + 1).to_string(), value.clone());
            }
        }
        if let Some(dict) = self_dict {
            frame.locals.insert("self", Value::Dict(dict));
        }

        tracing::debug!(%name, args = args.len(), "call");
        let body = Rc::clone(&function.body);
        let mut guard = self.enter_frame(frame);
        guard.eval(&body)
    }

    fn call_lambda(&mut self, lambda: &Rc<Lambda>, args: &[Value]) -> EvalResult {
        self.check_depth()?;
        let params = &lambda.expr.params;
        if args.len() < params.len() {
            return Err(too_few_arguments(&lambda.name));
        }
        if args.len() > params.len() {
            return Err(too_many_arguments(&lambda.name));
        }
        let mut frame = Frame::new(Rc::clone(&lambda.name), FrameKind::Lambda);
        frame.closure.clone_from(&lambda.closure);
        for (param, value) in params.iter().zip(args) {
            frame.args.insert(Rc::clone(param), value.clone());
        }
        let lambda = Rc::clone(lambda);
        let mut guard = self.enter_frame(frame);
        guard.eval(&lambda.expr.body)
    }

    // Call expressions

    fn resolve_callee(&mut self, callee: &Expr) -> Result<Callee, EvalError> {
        match &callee.kind {
            ExprKind::Variable(name) => Ok(self.resolve_name(name)),
            ExprKind::Member { base, key } => {
                let base = self.eval(base)?;
                if let Value::Dict(dict) = &base {
                    let value = dict.get(key).ok_or_else(|| key_not_present(key))?;
                    return Ok(Callee::Value {
                        value,
                        self_dict: Some(dict.clone()),
                    });
                }
                Ok(Callee::Value {
                    value: self.member_value(&base, key)?,
                    self_dict: None,
                })
            }
            _ => Ok(Callee::Value {
                value: self.eval(callee)?,
                self_dict: None,
            }),
        }
    }

    fn resolve_name(&self, name: &VarName) -> Callee {
        let function_name: Option<Rc<str>> = match name.scope {
            None | Some(ScopeKind::Global) => Some(Rc::clone(&name.name)),
            Some(ScopeKind::Script) => Some(Rc::from(format!("s:{}", name.name))),
            Some(_) => None,
        };
        if let Some(function_name) = &function_name {
            if self.has_function(function_name) {
                return Callee::Named(Rc::clone(function_name));
            }
        }
        match self.env.lookup(name) {
            Some(value) => Callee::Value {
                value,
                self_dict: None,
            },
            None => Callee::Named(function_name.unwrap_or_else(|| Rc::from(name.to_string()))),
        }
    }

    fn invoke(&mut self, callee: Callee, args: &[Value]) -> EvalResult {
        match callee {
            Callee::Named(name) => self.call_named(&name, args, None),
            Callee::Value { value, self_dict } => {
                self.call_value_with_self(&value, args, self_dict)
            }
        }
    }

    pub(super) fn eval_call(&mut self, callee: &Expr, args: &[Expr]) -> EvalResult {
        let callee = self.resolve_callee(callee)?;
        let args = self.eval_args(args)?;
        self.invoke(callee, &args)
    }

    /// `receiver->callee(args)` is `callee(receiver, args)`.
    pub(super) fn eval_method_call(
        &mut self,
        receiver: &Expr,
        callee: &Expr,
        args: &[Expr],
    ) -> EvalResult {
        let receiver = self.eval(receiver)?;
        let callee = self.resolve_callee(callee)?;
        let mut all = Vec::with_capacity(args.len() + 1);
        all.push(receiver);
        all.extend(self.eval_args(args)?);
        self.invoke(callee, &all)
    }
}
