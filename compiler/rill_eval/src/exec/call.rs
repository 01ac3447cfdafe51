//! Call paths: generic calls and pre-resolved invocations.
//!
//! Arguments are evaluated strictly left to right, callee first, into a
//! rooted temporary buffer. Generic dispatch then either completes the
//! call itself (builtins) or hands back the selected method record, which
//! is executed here so that interpreted methods always run through
//! [`Interpreter::interpret_call`].

use std::sync::Arc;

use smallvec::SmallVec;

use rill_ir::{EvalResult, Method, Node, Value};
use rill_runtime::{Applied, RootScope};

use crate::errors::unanalyzed_method;
use crate::frame::Frame;
use crate::interpreter::Interpreter;

/// Inline capacity of the argument buffer; calls wider than this spill to
/// the heap.
const ARG_BUF: usize = 8;

impl Interpreter<'_> {
    /// Evaluate a generic call: `args[0]` is the callee expression.
    pub(crate) fn do_call(&mut self, args: &[Node], frame: Option<&Frame>) -> EvalResult {
        let _roots = RootScope::new(&*self.rt.roots, args.len());
        let mut argv: SmallVec<[Value; ARG_BUF]> = SmallVec::with_capacity(args.len());
        for arg in args {
            argv.push(self.eval(arg, frame)?);
        }
        let dispatch = Arc::clone(&self.dispatch);
        match dispatch.apply_generic(&argv)? {
            Applied::Value(v) => Ok(v),
            Applied::Invoke(method) => self.interpret_call(&method, &argv, None),
        }
    }

    /// Execute a pre-resolved invocation, bypassing dispatch. The method
    /// record must have completed dispatch analysis.
    pub(crate) fn do_invoke(
        &mut self,
        method: &Arc<Method>,
        args: &[Node],
        frame: Option<&Frame>,
    ) -> EvalResult {
        if !method.analyzed {
            return Err(unanalyzed_method(self.rt.name_str(method.name)));
        }
        let _roots = RootScope::new(&*self.rt.roots, args.len());
        let mut argv: SmallVec<[Value; ARG_BUF]> = SmallVec::with_capacity(args.len());
        for arg in args {
            argv.push(self.eval(arg, frame)?);
        }
        self.interpret_call(method, &argv, None)
    }
}
