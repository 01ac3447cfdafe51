//! Per-call execution frames.
//!
//! A frame owns one storage array sized `nslots + nssavalues`: local
//! slots first (1-based as referenced from IR), SSA temporaries after
//! them (0-based, offset by the slot count). `None` cells are the
//! *unassigned* state; reading an unassigned slot is an undefined-variable
//! condition, while an out-of-range index is malformed IR and fatal.
//!
//! Frame storage is registered with the GC root set for the whole call:
//! the root scope is acquired when the frame is built and released when
//! the frame drops, on the return path and the unwind path alike.

use std::sync::Arc;

use rill_ir::errors::{
    argument_mismatch, invalid_slot_access, invalid_ssa_access, undefined_variable,
};
use rill_ir::{EvalError, EvalResult, Method, ModuleId, StringInterner, Value};
use rill_runtime::{RootScope, RootSet};

/// The per-call environment: local slots, SSA temporaries, and the
/// defining method record.
pub struct Frame<'rt> {
    method: Arc<Method>,
    storage: Vec<Option<Value>>,
    /// Caller-supplied static-parameter values, overriding the method's
    /// declared vector.
    static_params: Option<Vec<Value>>,
    /// Context-only frames (toplevel evaluation inside a method's module)
    /// carry no locals; slot access through them is malformed IR.
    has_locals: bool,
    _roots: Option<RootScope<'rt>>,
}

impl<'rt> Frame<'rt> {
    /// Build the frame for a call: allocate storage, register it with the
    /// root set, and bind positional arguments into slots `1..=nargs`.
    ///
    /// If the method is variadic, the last declared argument collects all
    /// surplus arguments into a tuple.
    pub fn for_call(
        method: Arc<Method>,
        args: &[Value],
        static_params: Option<Vec<Value>>,
        roots: &'rt dyn RootSet,
    ) -> Result<Self, EvalError> {
        let size = method.frame_size();
        let mut storage = vec![None; size];
        let nargs = method.nargs as usize;

        if method.is_varargs {
            if args.len() < nargs.saturating_sub(1) {
                return Err(argument_mismatch(method.nargs, args.len()));
            }
        } else if args.len() != nargs {
            return Err(argument_mismatch(method.nargs, args.len()));
        }

        for i in 0..nargs {
            if method.is_varargs && i + 1 == nargs {
                storage[i] = Some(Value::tuple(args[i..].to_vec()));
            } else {
                storage[i] = Some(args[i].clone());
            }
        }

        Ok(Frame {
            method,
            storage,
            static_params,
            has_locals: true,
            _roots: Some(RootScope::new(roots, size)),
        })
    }

    /// A frame that only supplies method context (defining module,
    /// declared static parameters) with no local storage.
    pub fn context_only(method: Arc<Method>) -> Self {
        Frame {
            method,
            storage: Vec::new(),
            static_params: None,
            has_locals: false,
            _roots: None,
        }
    }

    pub fn method(&self) -> &Arc<Method> {
        &self.method
    }

    /// The defining module, if the method has one.
    pub fn module(&self) -> Option<ModuleId> {
        self.method.module
    }

    /// The caller-supplied static-parameter override, if any.
    pub fn static_param_override(&self) -> Option<&[Value]> {
        self.static_params.as_deref()
    }

    fn slot_index(&self, n: u32) -> Result<usize, EvalError> {
        if !self.has_locals || n < 1 || n > self.method.nslots() {
            return Err(invalid_slot_access(n));
        }
        Ok((n - 1) as usize)
    }

    fn ssa_index(&self, id: u32) -> Result<usize, EvalError> {
        if !self.has_locals || id >= self.method.nssavalues {
            return Err(invalid_ssa_access(id));
        }
        Ok(self.method.nslots() as usize + id as usize)
    }

    /// Read local slot `n` (1-based).
    pub fn load_slot(&self, n: u32, interner: &StringInterner) -> EvalResult {
        let idx = self.slot_index(n)?;
        self.storage[idx].clone().ok_or_else(|| {
            let name = self.method.slot_names[idx];
            undefined_variable(interner.lookup(name))
        })
    }

    /// Write local slot `n` (1-based).
    pub fn store_slot(&mut self, n: u32, value: Value) -> Result<(), EvalError> {
        let idx = self.slot_index(n)?;
        self.storage[idx] = Some(value);
        Ok(())
    }

    /// Reset local slot `n` to the unassigned state.
    pub fn clear_slot(&mut self, n: u32) -> Result<(), EvalError> {
        let idx = self.slot_index(n)?;
        self.storage[idx] = None;
        Ok(())
    }

    /// Read SSA temporary `id` (0-based). An unassigned read means the
    /// lowering pass numbered uses before definitions: malformed IR.
    pub fn load_ssa(&self, id: u32) -> EvalResult {
        let idx = self.ssa_index(id)?;
        self.storage[idx].clone().ok_or_else(|| invalid_ssa_access(id))
    }

    /// Write SSA temporary `id` (0-based).
    pub fn store_ssa(&mut self, id: u32, value: Value) -> Result<(), EvalError> {
        let idx = self.ssa_index(id)?;
        self.storage[idx] = Some(value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rill_ir::errors::EvalErrorKind;
    use rill_ir::Node;
    use rill_runtime::{CountingRootSet, NoopRootSet};

    fn test_method(interner: &StringInterner) -> Arc<Method> {
        Arc::new(
            Method::new(interner.intern("test"), Vec::<Node>::new())
                .with_slots(vec![interner.intern("a"), interner.intern("b")])
                .with_ssa(2),
        )
    }

    #[test]
    fn test_slot_write_then_read() {
        let interner = StringInterner::new();
        let roots = NoopRootSet;
        let mut frame =
            Frame::for_call(test_method(&interner), &[], None, &roots).expect("frame builds");
        for n in 1..=2u32 {
            frame.store_slot(n, Value::int(i64::from(n))).unwrap();
            assert_eq!(
                frame.load_slot(n, &interner).unwrap(),
                Value::int(i64::from(n))
            );
        }
    }

    #[test]
    fn test_read_before_write_is_undefined_variable() {
        let interner = StringInterner::new();
        let roots = NoopRootSet;
        let frame =
            Frame::for_call(test_method(&interner), &[], None, &roots).expect("frame builds");
        let err = frame.load_slot(1, &interner).unwrap_err();
        assert_eq!(
            err.kind,
            EvalErrorKind::UndefinedVariable {
                name: "a".to_owned()
            }
        );
        assert!(err.is_catchable());
    }

    #[test]
    fn test_out_of_range_indices_are_fatal() {
        let interner = StringInterner::new();
        let roots = NoopRootSet;
        let mut frame =
            Frame::for_call(test_method(&interner), &[], None, &roots).expect("frame builds");
        assert!(!frame.load_slot(0, &interner).unwrap_err().is_catchable());
        assert!(!frame.load_slot(3, &interner).unwrap_err().is_catchable());
        assert!(!frame.load_ssa(2).unwrap_err().is_catchable());
        assert!(!frame.store_ssa(7, Value::int(1)).unwrap_err().is_catchable());
    }

    #[test]
    fn test_ssa_write_then_read() {
        let interner = StringInterner::new();
        let roots = NoopRootSet;
        let mut frame =
            Frame::for_call(test_method(&interner), &[], None, &roots).expect("frame builds");
        for id in 0..2u32 {
            frame.store_ssa(id, Value::int(i64::from(id) + 10)).unwrap();
            assert_eq!(frame.load_ssa(id).unwrap(), Value::int(i64::from(id) + 10));
        }
    }

    #[test]
    fn test_varargs_collect_surplus() {
        let interner = StringInterner::new();
        let roots = NoopRootSet;
        let method = Arc::new(
            Method::new(interner.intern("va"), Vec::<Node>::new())
                .with_slots(vec![interner.intern("x"), interner.intern("rest")])
                .with_args(2, true),
        );
        let frame = Frame::for_call(
            method,
            &[Value::int(1), Value::int(2), Value::int(3)],
            None,
            &roots,
        )
        .expect("frame builds");
        assert_eq!(frame.load_slot(1, &interner).unwrap(), Value::int(1));
        assert_eq!(
            frame.load_slot(2, &interner).unwrap(),
            Value::tuple(vec![Value::int(2), Value::int(3)])
        );
    }

    #[test]
    fn test_context_only_frame_rejects_slot_access() {
        let interner = StringInterner::new();
        let frame = Frame::context_only(test_method(&interner));
        assert!(!frame.load_slot(1, &interner).unwrap_err().is_catchable());
    }

    #[test]
    fn test_roots_released_when_frame_drops() {
        let interner = StringInterner::new();
        let roots = CountingRootSet::new();
        {
            let _frame =
                Frame::for_call(test_method(&interner), &[], None, &roots).expect("frame builds");
            assert_eq!(roots.pushes(), 1);
            assert_eq!(roots.pops(), 0);
        }
        assert!(roots.is_balanced());
    }
}
