//! Builder for configuring an [`Interpreter`].

use std::cell::Cell;
use std::sync::Arc;

use rill_ir::ModuleId;
use rill_runtime::{GenericDispatch, MethodTable, Runtime};

use super::Interpreter;

/// Configures and constructs an [`Interpreter`].
///
/// The pluggable collaborator is the generic-dispatch table (default: the
/// bootstrap [`MethodTable`]); the ambient current module can also be
/// switched at construction time.
pub struct InterpreterBuilder<'rt> {
    rt: &'rt Runtime,
    dispatch: Option<Arc<dyn GenericDispatch>>,
    current_module: Option<ModuleId>,
}

impl<'rt> InterpreterBuilder<'rt> {
    pub fn new(rt: &'rt Runtime) -> Self {
        InterpreterBuilder {
            rt,
            dispatch: None,
            current_module: None,
        }
    }

    /// Replace the dispatch collaborator, e.g. with a specializing
    /// method table once one exists.
    #[must_use]
    pub fn with_dispatch(mut self, dispatch: Arc<dyn GenericDispatch>) -> Self {
        self.dispatch = Some(dispatch);
        self
    }

    /// Make `module` the ambient current module when the interpreter is
    /// built, instead of whatever the runtime currently has.
    #[must_use]
    pub fn with_current_module(mut self, module: ModuleId) -> Self {
        self.current_module = Some(module);
        self
    }

    pub fn build(self) -> Interpreter<'rt> {
        if let Some(module) = self.current_module {
            self.rt.modules.set_current_module(module);
        }
        let dispatch = self
            .dispatch
            .unwrap_or_else(|| Arc::new(MethodTable::new(self.rt.interner.clone())));
        Interpreter {
            rt: self.rt,
            dispatch,
            handlers: Vec::new(),
            exception_in_transit: None,
            lineno: Cell::new(0),
            inside_typedef: Cell::new(false),
        }
    }
}
