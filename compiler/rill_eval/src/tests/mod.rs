//! Test modules relocated from implementation files.
//!
//! Shared fixtures live here: a throwaway runtime, a handful of native
//! helper functions, and thunk/method constructors used across the
//! statement, entry-point, and type-definition suites.

mod body_tests;

use std::sync::Arc;

use rill_ir::errors::raised;
use rill_ir::{Builtin, EvalError, Method, Node, SharedInterner, Value};
use rill_runtime::Runtime;

pub(crate) fn runtime() -> Runtime {
    Runtime::new(SharedInterner::new())
}

fn native_add(args: &[Value]) -> Result<Value, EvalError> {
    let mut total = 0i64;
    for a in args {
        if let Value::Int(v) = a {
            total += v;
        }
    }
    Ok(Value::int(total))
}

fn native_is_zero(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::bool(matches!(args.first(), Some(Value::Int(0)))))
}

fn native_raise(args: &[Value]) -> Result<Value, EvalError> {
    Err(raised(args.first().cloned().unwrap_or(Value::Nothing)))
}

fn native_svec(args: &[Value]) -> Result<Value, EvalError> {
    Ok(Value::svec(args.to_vec()))
}

pub(crate) fn plus() -> Value {
    Value::Builtin(Builtin {
        name: "+",
        f: native_add,
    })
}

pub(crate) fn is_zero() -> Value {
    Value::Builtin(Builtin {
        name: "iszero",
        f: native_is_zero,
    })
}

pub(crate) fn raiser() -> Value {
    Value::Builtin(Builtin {
        name: "throw",
        f: native_raise,
    })
}

pub(crate) fn make_svec() -> Value {
    Value::Builtin(Builtin {
        name: "svec",
        f: native_svec,
    })
}

/// A zero-argument toplevel thunk.
pub(crate) fn thunk(rt: &Runtime, slots: &[&str], nssa: u32, code: Vec<Node>) -> Arc<Method> {
    let slot_names = slots.iter().map(|s| rt.interner.intern(s)).collect();
    Arc::new(
        Method::new(rt.interner.intern("thunk"), code)
            .with_slots(slot_names)
            .with_ssa(nssa),
    )
}

/// A method whose first `nargs` slots are arguments.
pub(crate) fn method(
    rt: &Runtime,
    name: &str,
    slots: &[&str],
    nargs: u32,
    nssa: u32,
    code: Vec<Node>,
) -> Arc<Method> {
    let slot_names = slots.iter().map(|s| rt.interner.intern(s)).collect();
    Arc::new(
        Method::new(rt.interner.intern(name), code)
            .with_slots(slot_names)
            .with_args(nargs, false)
            .with_ssa(nssa),
    )
}
