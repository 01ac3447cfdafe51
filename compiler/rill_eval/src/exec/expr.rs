//! Single-expression evaluation.
//!
//! [`Interpreter::eval`] is the recursive heart of the interpreter: one
//! exhaustive match over the closed [`Node`] enum. Statement forms (jumps,
//! returns, handler scopes, assignments) are handled by the body walker
//! and are malformed when they reach expression position.

use std::sync::Arc;

use rill_ir::{EvalResult, Instance, Name, Node, SyntaxRelay, Value};
use rill_runtime::RootScope;

use crate::errors::{
    malformed_expression, no_frame, raised, static_param_unknown, syntax_error, undefined_variable,
};
use crate::frame::Frame;
use crate::interpreter::Interpreter;
use crate::stack::ensure_sufficient_stack;

impl Interpreter<'_> {
    /// Evaluate one expression in an optional frame.
    pub fn eval(&mut self, node: &Node, frame: Option<&Frame>) -> EvalResult {
        ensure_sufficient_stack(|| self.eval_inner(node, frame))
    }

    fn eval_inner(&mut self, node: &Node, frame: Option<&Frame>) -> EvalResult {
        match node {
            Node::Const(v) | Node::Quote(v) => Ok(v.clone()),

            Node::Slot(n) => match frame {
                Some(f) => f.load_slot(*n, &self.rt.interner),
                None => Err(no_frame("slot")),
            },

            Node::SsaUse(id) => match frame {
                Some(f) => f.load_ssa(*id),
                None => Err(no_frame("SSA value")),
            },

            Node::GlobalRef(module_id, name) => {
                let Some(module) = self.rt.modules.module(*module_id) else {
                    return Err(malformed_expression("reference to unknown module"));
                };
                module
                    .global(*name)
                    .ok_or_else(|| undefined_variable(self.rt.name_str(*name)))
            }

            Node::Sym(name) => {
                let module = self.context_module(frame);
                module
                    .global(*name)
                    .ok_or_else(|| undefined_variable(self.rt.name_str(*name)))
            }

            Node::StaticParam(n) => self.eval_static_param(*n, frame),

            Node::Call(args) => self.do_call(args, frame),

            Node::Invoke { method, args } => self.do_invoke(method, args, frame),

            Node::New(args) => self.eval_new(args, frame),

            Node::CurrentException => {
                Ok(self.exception_in_transit.clone().unwrap_or(Value::Nothing))
            }

            Node::TypeDef(def) => self.eval_typedef(def, frame),

            Node::MethodDef {
                name,
                signature,
                body,
            } => self.eval_method_def(*name, signature.as_deref(), body.as_deref(), frame),

            Node::ConstDecl(name) => {
                let module = self.context_module(frame);
                module.binding_or_create(*name).declare_constant();
                Ok(Value::Nothing)
            }

            Node::GlobalDecl(names) => {
                let module = self.context_module(frame);
                for name in names {
                    module.binding_or_create(*name);
                }
                Ok(Value::Nothing)
            }

            Node::CopyAst(inner) => {
                let value = self.eval(inner, frame)?;
                Ok(deep_copy(&value))
            }

            // No static analysis here; the answer is always the top type.
            Node::StaticTypeof(_) => Ok(Value::Type(self.rt.core.any.clone())),

            Node::Meta(_) => Ok(Value::Nothing),

            Node::SyntaxError(relay) => match relay {
                SyntaxRelay::Message(message) => Err(syntax_error(message)),
                SyntaxRelay::Value(value) => Err(raised(value.clone())),
            },

            Node::ModuleDef { name, body } => self.eval_module_definition(*name, body),

            Node::Assign(..)
            | Node::Goto(_)
            | Node::GotoIfNot(..)
            | Node::Return(_)
            | Node::EnterHandler(_)
            | Node::LeaveHandler(_)
            | Node::Line(_)
            | Node::NewVarScope(_) => Err(malformed_expression(node_form(node))),
        }
    }

    /// Resolve a 1-based static-parameter reference: the caller-supplied
    /// override wins; otherwise the method's declared vector, skipping
    /// entries that are still unbound type variables.
    fn eval_static_param(&self, n: u32, frame: Option<&Frame>) -> EvalResult {
        let Some(f) = frame else {
            return Err(no_frame("static parameter"));
        };
        if n < 1 {
            return Err(malformed_expression("static parameter index 0"));
        }
        let idx = (n - 1) as usize;
        if let Some(sparams) = f.static_param_override() {
            return sparams
                .get(idx)
                .cloned()
                .ok_or_else(static_param_unknown);
        }
        match f.method().static_params.get(idx) {
            Some(v) if !v.is_type_var() => Ok(v.clone()),
            _ => Err(static_param_unknown()),
        }
    }

    /// Construct an instance: `args[0]` evaluates to a composite type, the
    /// rest initialize fields in declaration order. Trailing fields stay
    /// uninitialized.
    fn eval_new(&mut self, args: &[Node], frame: Option<&Frame>) -> EvalResult {
        let Some((type_expr, field_exprs)) = args.split_first() else {
            return Err(malformed_expression("new with no type"));
        };
        let _roots = RootScope::new(&*self.rt.roots, args.len());
        let ty_value = self.eval(type_expr, frame)?;
        let Some(ty) = ty_value.as_type() else {
            return Err(malformed_expression("new of a non-type"));
        };
        if !ty.is_composite() {
            return Err(malformed_expression("new of a non-composite type"));
        }
        let nfields = ty.field_count();
        if field_exprs.len() > nfields {
            return Err(malformed_expression("new with too many field values"));
        }
        let instance = Arc::new(Instance::new_uninit(ty.clone(), nfields));
        for (i, expr) in field_exprs.iter().enumerate() {
            let value = self.eval(expr, frame)?;
            instance.set_field(i, value);
        }
        Ok(Value::Instance(instance))
    }

    /// Define a method. The bare form (name only) declares the generic
    /// function and evaluates to it; the full form evaluates the signature
    /// and the body (which must yield a method record) and registers the
    /// pair with generic dispatch.
    fn eval_method_def(
        &mut self,
        name: Option<Name>,
        signature: Option<&Node>,
        body: Option<&Node>,
        frame: Option<&Frame>,
    ) -> EvalResult {
        let dispatch = Arc::clone(&self.dispatch);
        let mut declared = None;
        if let Some(fname) = name {
            let module = self.context_module(frame);
            let binding = module.binding_or_create(fname);
            declared = Some(dispatch.define_generic_function(fname, &binding)?);
        }
        let (Some(sig_node), Some(body_node)) = (signature, body) else {
            return declared.ok_or_else(|| malformed_expression("method definition with no name"));
        };
        let sig = self.eval(sig_node, frame)?;
        let body_value = self.eval(body_node, frame)?;
        let Value::Method(method) = body_value else {
            return Err(malformed_expression(
                "method body did not evaluate to a method record",
            ));
        };
        dispatch.define_method(sig, method, Value::Nothing)?;
        Ok(Value::Nothing)
    }
}

/// Copy a value so later mutation of the original cannot be observed.
/// Immutable scalars are shared; aggregates and instances are duplicated
/// recursively.
fn deep_copy(value: &Value) -> Value {
    match value {
        Value::Svec(items) => Value::Svec(items.iter().map(deep_copy).collect()),
        Value::Tuple(items) => Value::Tuple(items.iter().map(deep_copy).collect()),
        Value::Instance(inst) => {
            let copy = Instance::new_uninit(inst.ty.clone(), inst.field_count());
            for i in 0..inst.field_count() {
                if let Some(v) = inst.field(i) {
                    copy.set_field(i, deep_copy(&v));
                }
            }
            Value::Instance(Arc::new(copy))
        }
        other => other.clone(),
    }
}

/// Short name of a form, for diagnostics.
pub(crate) fn node_form(node: &Node) -> &'static str {
    match node {
        Node::Const(_) | Node::Quote(_) => "literal",
        Node::Slot(_) => "slot",
        Node::SsaUse(_) => "ssavalue",
        Node::GlobalRef(..) => "globalref",
        Node::Sym(_) => "symbol",
        Node::StaticParam(_) => "static_parameter",
        Node::Call(_) => "call",
        Node::Invoke { .. } => "invoke",
        Node::New(_) => "new",
        Node::CurrentException => "the_exception",
        Node::TypeDef(_) => "type definition",
        Node::MethodDef { .. } => "method",
        Node::ModuleDef { .. } => "module",
        Node::Assign(..) => "=",
        Node::Goto(_) => "goto",
        Node::GotoIfNot(..) => "gotoifnot",
        Node::Return(_) => "return",
        Node::EnterHandler(_) => "enter",
        Node::LeaveHandler(_) => "leave",
        Node::Line(_) => "line",
        Node::NewVarScope(_) => "newvar",
        Node::ConstDecl(_) => "const",
        Node::GlobalDecl(_) => "global",
        Node::CopyAst(_) => "copyast",
        Node::StaticTypeof(_) => "static_typeof",
        Node::Meta(_) => "meta",
        Node::SyntaxError(_) => "error",
    }
}
