//! Generic-dispatch seam.
//!
//! Method selection and the method-table data structure are external
//! collaborators; the interpreter only evaluates arguments and hands them
//! over. The seam returns [`Applied`]: either a finished value (builtins)
//! or the selected method record, which the interpreter then executes
//! itself, the same way the real dispatcher falls back to the interpreter
//! for methods without native code.
//!
//! [`MethodTable`] is the bootstrap implementation: a plain
//! registration-order table with arity filtering, good enough for tests
//! and early bootstrap. It makes no attempt at specificity ordering.

use std::sync::Arc;

use tracing::trace;

use rill_ir::errors::{constant_redefinition, malformed_expression, no_method};
use rill_ir::{EvalError, GenericFn, Method, Name, SharedInterner, Value};

use crate::modules::Binding;

/// Outcome of generic dispatch.
#[derive(Debug)]
pub enum Applied {
    /// The call completed in the dispatcher (builtin).
    Value(Value),
    /// The dispatcher selected this method; the caller executes it with
    /// the full argument list.
    Invoke(Arc<Method>),
}

/// The dispatch collaborator interface.
pub trait GenericDispatch: Send + Sync {
    /// Dispatch a call. `args[0]` is the callee value.
    fn apply_generic(&self, args: &[Value]) -> Result<Applied, EvalError>;

    /// Declare (or fetch) the generic function stored in `binding`,
    /// creating and const-binding it if absent.
    fn define_generic_function(
        &self,
        name: Name,
        binding: &Arc<Binding>,
    ) -> Result<Value, EvalError>;

    /// Register a method. `signature` is an svec whose first entry is the
    /// generic function value and whose remaining entries are argument
    /// types; `meta` carries lowering-pass extras and is opaque here.
    fn define_method(
        &self,
        signature: Value,
        method: Arc<Method>,
        meta: Value,
    ) -> Result<(), EvalError>;
}

/// Registration-order method table.
pub struct MethodTable {
    interner: SharedInterner,
}

impl MethodTable {
    pub fn new(interner: SharedInterner) -> Self {
        MethodTable { interner }
    }

    /// Whether `method` accepts `nargs` arguments (callee included).
    fn arity_accepts(method: &Method, nargs: usize) -> bool {
        let declared = method.nargs as usize;
        if method.is_varargs {
            nargs >= declared.saturating_sub(1)
        } else {
            nargs == declared
        }
    }
}

impl GenericDispatch for MethodTable {
    fn apply_generic(&self, args: &[Value]) -> Result<Applied, EvalError> {
        let Some(callee) = args.first() else {
            return Err(malformed_expression("call with no callee"));
        };
        match callee {
            Value::Builtin(b) => {
                trace!(name = b.name, nargs = args.len() - 1, "builtin call");
                (b.f)(&args[1..]).map(Applied::Value)
            }
            Value::Method(m) => Ok(Applied::Invoke(m.clone())),
            Value::GenericFn(f) => {
                // Most recent applicable registration wins; specificity
                // ordering is the real dispatcher's job.
                let methods = f.methods.read();
                let selected = methods
                    .iter()
                    .rev()
                    .map(|(_, m)| m)
                    .find(|m| Self::arity_accepts(m, args.len()));
                match selected {
                    Some(m) => {
                        trace!(name = self.interner.lookup(f.name), "dispatched");
                        Ok(Applied::Invoke(m.clone()))
                    }
                    None => Err(no_method(self.interner.lookup(f.name))),
                }
            }
            other => Err(malformed_expression(&format!(
                "call of non-function ({})",
                other.kind_name()
            ))),
        }
    }

    fn define_generic_function(
        &self,
        name: Name,
        binding: &Arc<Binding>,
    ) -> Result<Value, EvalError> {
        match binding.value() {
            Some(existing @ Value::GenericFn(_)) => Ok(existing),
            Some(_) if binding.is_constant() => {
                Err(constant_redefinition(self.interner.lookup(name)))
            }
            _ => {
                let f = Value::GenericFn(Arc::new(GenericFn::new(name)));
                binding.checked_assign(f.clone(), self.interner.lookup(name))?;
                binding.declare_constant();
                Ok(f)
            }
        }
    }

    fn define_method(
        &self,
        signature: Value,
        method: Arc<Method>,
        _meta: Value,
    ) -> Result<(), EvalError> {
        let Some(entries) = signature.as_svec() else {
            return Err(malformed_expression("method signature is not an svec"));
        };
        let Some(Value::GenericFn(f)) = entries.first() else {
            return Err(malformed_expression(
                "method signature does not begin with a generic function",
            ));
        };
        trace!(
            name = self.interner.lookup(f.name),
            nmethods = f.methods.read().len() + 1,
            "method defined"
        );
        f.methods.write().push((signature.clone(), method));
        Ok(())
    }
}
