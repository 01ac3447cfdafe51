//! Method (lambda) records.
//!
//! A [`Method`] is the lowered body of a function plus the frame metadata
//! the interpreter relies on: slot and SSA-temporary counts, argument
//! arity, variadic flag, declared static-parameter values, and the
//! defining module. The lowering pass produces these; the interpreter
//! treats them as immutable.

use std::sync::Arc;

use crate::{ModuleId, Name, Node, Value};

/// A lowered method record.
#[derive(Debug)]
pub struct Method {
    /// Name, for diagnostics only.
    pub name: Name,
    /// The statement list. Must terminate in a `Return` on every path.
    pub code: Arc<[Node]>,
    /// Number of declared positional arguments. Arguments occupy slots
    /// `1..=nargs`.
    pub nargs: u32,
    /// Whether the last argument collects surplus arguments into a tuple.
    pub is_varargs: bool,
    /// Names of local slots, 1-based when referenced from IR. The slot
    /// count is the length of this vector.
    pub slot_names: Vec<Name>,
    /// Number of SSA temporaries, 0-based when referenced from IR.
    pub nssavalues: u32,
    /// Declared static-parameter values. Entries that are still unbound
    /// type variables are skipped during resolution.
    pub static_params: Vec<Value>,
    /// The defining module, resolving bare symbols and plain assignments.
    /// `None` for toplevel thunks, which resolve against the ambient
    /// current module instead.
    pub module: Option<ModuleId>,
    /// Whether the dispatch subsystem has completed its analysis of this
    /// record. Direct invocation of an unanalyzed record is a contract
    /// violation.
    pub analyzed: bool,
}

impl Method {
    /// Create an analyzed thunk-style record with no arguments, no slots,
    /// and no temporaries. Callers layer the rest on with the `with_*`
    /// methods.
    pub fn new(name: Name, code: impl Into<Arc<[Node]>>) -> Self {
        Method {
            name,
            code: code.into(),
            nargs: 0,
            is_varargs: false,
            slot_names: Vec::new(),
            nssavalues: 0,
            static_params: Vec::new(),
            module: None,
            analyzed: true,
        }
    }

    /// Set the defining module.
    #[must_use]
    pub fn in_module(mut self, module: ModuleId) -> Self {
        self.module = Some(module);
        self
    }

    /// Set the slot names (and thereby the slot count).
    #[must_use]
    pub fn with_slots(mut self, slot_names: Vec<Name>) -> Self {
        self.slot_names = slot_names;
        self
    }

    /// Set the SSA-temporary count.
    #[must_use]
    pub fn with_ssa(mut self, nssavalues: u32) -> Self {
        self.nssavalues = nssavalues;
        self
    }

    /// Declare the argument arity; arguments bind to slots `1..=nargs`.
    #[must_use]
    pub fn with_args(mut self, nargs: u32, is_varargs: bool) -> Self {
        self.nargs = nargs;
        self.is_varargs = is_varargs;
        self
    }

    /// Set the declared static-parameter values.
    #[must_use]
    pub fn with_static_params(mut self, static_params: Vec<Value>) -> Self {
        self.static_params = static_params;
        self
    }

    /// Mark the record unanalyzed (dispatch analysis still pending).
    #[must_use]
    pub fn unanalyzed(mut self) -> Self {
        self.analyzed = false;
        self
    }

    /// Number of local slots.
    #[inline]
    pub fn nslots(&self) -> u32 {
        u32::try_from(self.slot_names.len()).unwrap_or(u32::MAX)
    }

    /// Total frame storage cells: slots then SSA temporaries.
    #[inline]
    pub fn frame_size(&self) -> usize {
        self.slot_names.len() + self.nssavalues as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_size_counts_slots_and_ssa() {
        let m = Method::new(Name::EMPTY, Vec::<Node>::new())
            .with_slots(vec![Name::from_raw(1), Name::from_raw(2)])
            .with_ssa(3);
        assert_eq!(m.nslots(), 2);
        assert_eq!(m.frame_size(), 5);
    }

    #[test]
    fn test_default_record_is_thunk_style() {
        let m = Method::new(Name::EMPTY, Vec::<Node>::new());
        assert!(m.analyzed);
        assert_eq!(m.module, None);
        assert!(!m.unanalyzed().analyzed);
        assert_eq!(
            Method::new(Name::EMPTY, Vec::<Node>::new())
                .in_module(ModuleId::ROOT)
                .module,
            Some(ModuleId::ROOT)
        );
    }
}
