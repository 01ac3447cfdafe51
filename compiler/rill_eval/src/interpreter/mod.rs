//! The interpreter instance and its entry points.
//!
//! One [`Interpreter`] per task: it carries the exception-handler stack,
//! the exception-in-transit cell, toplevel line tracking, and the
//! type-definition re-entrancy latch. The global state it executes
//! against (modules, core types, root set) lives in the shared
//! [`Runtime`]; the dispatch collaborator is pluggable through the
//! builder.
//!
//! Entry points mirror the four call protocols:
//!
//! - [`Interpreter::eval_toplevel`] — evaluate a single expression with
//!   no frame, resolving bare symbols against the ambient current module
//! - [`Interpreter::eval_toplevel_in`] — the same, with the ambient
//!   current module temporarily switched (restored on every exit path)
//!   and an optional method supplying context
//! - [`Interpreter::interpret_call`] — run a method body with bound
//!   arguments
//! - [`Interpreter::interpret_toplevel_thunk`] — run a zero-argument
//!   thunk

mod builder;

pub use builder::InterpreterBuilder;

use std::cell::Cell;
use std::sync::Arc;

use tracing::debug;

use rill_ir::{EvalResult, Method, ModuleId, Name, Node, Value};
use rill_runtime::{GenericDispatch, Module, Runtime};

use crate::frame::Frame;

/// An active exception scope: where to resume when a value is raised.
pub(crate) struct Handler {
    /// 1-based statement label of the handler code.
    pub(crate) label: u32,
}

/// A tree-walking interpreter over lowered IR.
pub struct Interpreter<'rt> {
    pub(crate) rt: &'rt Runtime,
    pub(crate) dispatch: Arc<dyn GenericDispatch>,
    /// Active exception scopes, most recent last.
    pub(crate) handlers: Vec<Handler>,
    /// The exception currently being handled, read by
    /// `Node::CurrentException`.
    pub(crate) exception_in_transit: Option<Value>,
    /// Source line of the last toplevel line marker.
    pub(crate) lineno: Cell<u32>,
    /// Set while a type definition is under construction; definitions do
    /// not compose.
    pub(crate) inside_typedef: Cell<bool>,
}

impl<'rt> Interpreter<'rt> {
    /// An interpreter with the default (bootstrap) dispatch table.
    pub fn new(rt: &'rt Runtime) -> Self {
        InterpreterBuilder::new(rt).build()
    }

    /// Evaluate a single toplevel expression with no frame.
    pub fn eval_toplevel(&mut self, node: &Node) -> EvalResult {
        self.eval_toplevel_form(node)
    }

    /// Evaluate a toplevel expression with `module` as the ambient
    /// current module, optionally inside `method`'s context (defining
    /// module, declared static parameters, no locals).
    ///
    /// The prior ambient module is restored on both the success and the
    /// failure path; failures re-raise unchanged.
    pub fn eval_toplevel_in(
        &mut self,
        module: ModuleId,
        node: &Node,
        method: Option<Arc<Method>>,
    ) -> EvalResult {
        let _guard = self.rt.modules.enter_module(module);
        match method {
            Some(m) => {
                let frame = Frame::context_only(m);
                self.eval(node, Some(&frame))
            }
            None => self.eval_toplevel_form(node),
        }
    }

    /// Run a method body: bind `args` into slots `1..=nargs` (the last
    /// declared argument collects any surplus if the method is variadic)
    /// and execute the statement list from the first statement.
    pub fn interpret_call(
        &mut self,
        method: &Arc<Method>,
        args: &[Value],
        static_params: Option<Vec<Value>>,
    ) -> EvalResult {
        let mut frame = Frame::for_call(method.clone(), args, static_params, &*self.rt.roots)?;
        let code = Arc::clone(&method.code);
        // Zero-argument bodies are toplevel thunks; their statement lists
        // may contain toplevel-only forms.
        let toplevel = method.nargs == 0;
        self.eval_body(&code, Some(&mut frame), 0, toplevel)
    }

    /// Run a zero-argument toplevel thunk.
    pub fn interpret_toplevel_thunk(&mut self, method: &Arc<Method>) -> EvalResult {
        self.interpret_call(method, &[], None)
    }

    /// Evaluate a form that must be handled at toplevel: module
    /// definitions, frameless assignments. Plain expressions fall through
    /// to ordinary evaluation.
    pub(crate) fn eval_toplevel_form(&mut self, node: &Node) -> EvalResult {
        match node {
            Node::ModuleDef { name, body } => self.eval_module_definition(*name, body),
            Node::Assign(lhs, rhs) => {
                let value = self.eval(rhs, None)?;
                self.assign(lhs, value.clone(), &mut None)?;
                Ok(value)
            }
            _ => self.eval(node, None),
        }
    }

    /// Define a module and evaluate its body inside it.
    ///
    /// The module system proper (imports, exports, bindings visibility)
    /// is external; this covers the definition form the IR carries.
    pub(crate) fn eval_module_definition(&mut self, name: Name, body: &[Node]) -> EvalResult {
        let id = self.rt.modules.define_module(name);
        debug!(name = self.rt.name_str(name), "module defined");
        let _guard = self.rt.modules.enter_module(id);
        for stmt in body {
            self.eval_toplevel_form(stmt)?;
        }
        Ok(Value::Module(id))
    }

    /// The module that resolves bare symbols and plain assignments: the
    /// frame's defining module, or the ambient current module without one.
    pub(crate) fn context_module(&self, frame: Option<&Frame>) -> Arc<Module> {
        let id = frame
            .and_then(Frame::module)
            .unwrap_or_else(|| self.rt.modules.current_module());
        self.rt
            .modules
            .module(id)
            .unwrap_or_else(|| self.rt.modules.root())
    }

    /// Source line recorded by the most recent toplevel line marker.
    pub fn current_line(&self) -> u32 {
        self.lineno.get()
    }
}
