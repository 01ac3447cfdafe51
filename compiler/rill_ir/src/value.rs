//! Dynamic value model for the interpreter.
//!
//! Every expression evaluates to a [`Value`]. Scalars are stored inline;
//! aggregates and runtime objects are reference-counted so values can be
//! freely copied between frame slots, bindings, and argument buffers.
//!
//! Equality follows identity semantics for mutable objects (instances,
//! methods, generic functions, types) and structural semantics for
//! immutable data (scalars, strings, tuples, simple vectors). Floats
//! compare by bit pattern so that equality is reflexive.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::errors::EvalError;
use crate::{Method, ModuleId, Name, TypeRef};

/// Signature of a native (builtin) function.
pub type BuiltinFn = fn(&[Value]) -> Result<Value, EvalError>;

/// A named native function value.
#[derive(Clone, Copy)]
pub struct Builtin {
    /// Diagnostic name, e.g. `"+"`.
    pub name: &'static str,
    /// The native implementation.
    pub f: BuiltinFn,
}

impl PartialEq for Builtin {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::fn_addr_eq(self.f, other.f)
    }
}

impl fmt::Debug for Builtin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Builtin({})", self.name)
    }
}

/// A type variable, as it appears in type-parameter lists and unresolved
/// static-parameter vectors.
#[derive(Debug)]
pub struct TypeVar {
    pub name: Name,
}

/// A generic function object.
///
/// The container is dumb on purpose: method storage and selection policy
/// belong to the dispatch collaborator, which owns instances of this type
/// through the `define_generic_function` / `define_method` seam.
#[derive(Debug)]
pub struct GenericFn {
    /// The function's name.
    pub name: Name,
    /// Registered (signature, method) pairs, in registration order.
    pub methods: RwLock<Vec<(Value, Arc<Method>)>>,
}

impl GenericFn {
    pub fn new(name: Name) -> Self {
        GenericFn {
            name,
            methods: RwLock::new(Vec::new()),
        }
    }
}

/// An allocated instance of a composite type.
///
/// Fields start uninitialized (`None`) and are assigned in declaration
/// order by object construction; reading an uninitialized field is an
/// error surfaced by the caller.
#[derive(Debug)]
pub struct Instance {
    /// The instance's type. Must be a composite type.
    pub ty: TypeRef,
    fields: RwLock<Vec<Option<Value>>>,
}

impl Instance {
    /// Allocate an instance with all fields uninitialized.
    pub fn new_uninit(ty: TypeRef, nfields: usize) -> Self {
        Instance {
            ty,
            fields: RwLock::new(vec![None; nfields]),
        }
    }

    /// Read field `i`, or `None` if out of range or uninitialized.
    pub fn field(&self, i: usize) -> Option<Value> {
        self.fields.read().get(i).cloned().flatten()
    }

    /// Write field `i`. Out-of-range writes are ignored; the evaluator
    /// bounds-checks against the type's field count before storing.
    pub fn set_field(&self, i: usize, value: Value) {
        if let Some(slot) = self.fields.write().get_mut(i) {
            *slot = Some(value);
        }
    }

    /// Number of field cells.
    pub fn field_count(&self) -> usize {
        self.fields.read().len()
    }
}

/// A dynamically typed runtime value.
#[derive(Clone, Debug)]
pub enum Value {
    /// The unit value.
    Nothing,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Arc<str>),
    /// An interned symbol.
    Sym(Name),
    /// A simple vector: type-parameter lists, field-name lists, signatures.
    Svec(Arc<[Value]>),
    Tuple(Arc<[Value]>),
    Type(TypeRef),
    TypeVar(Arc<TypeVar>),
    Instance(Arc<Instance>),
    /// A method record (lambda).
    Method(Arc<Method>),
    /// A generic function object.
    GenericFn(Arc<GenericFn>),
    Builtin(Builtin),
    Module(ModuleId),
}

impl Value {
    /// The unit value.
    #[inline]
    pub const fn nothing() -> Self {
        Value::Nothing
    }

    #[inline]
    pub fn int(v: i64) -> Self {
        Value::Int(v)
    }

    #[inline]
    pub fn bool(v: bool) -> Self {
        Value::Bool(v)
    }

    pub fn str(s: &str) -> Self {
        Value::Str(Arc::from(s))
    }

    /// Build a simple vector from values.
    pub fn svec(items: impl Into<Arc<[Value]>>) -> Self {
        Value::Svec(items.into())
    }

    /// An empty simple vector.
    pub fn empty_svec() -> Self {
        Value::Svec(Arc::from([]))
    }

    pub fn tuple(items: impl Into<Arc<[Value]>>) -> Self {
        Value::Tuple(items.into())
    }

    /// Whether this is the unit value.
    #[inline]
    pub fn is_nothing(&self) -> bool {
        matches!(self, Value::Nothing)
    }

    /// Whether this is an unbound type variable.
    #[inline]
    pub fn is_type_var(&self) -> bool {
        matches!(self, Value::TypeVar(_))
    }

    /// The contained type, if this value is a type.
    pub fn as_type(&self) -> Option<&TypeRef> {
        match self {
            Value::Type(t) => Some(t),
            _ => None,
        }
    }

    /// The contained simple vector, if any.
    pub fn as_svec(&self) -> Option<&Arc<[Value]>> {
        match self {
            Value::Svec(items) => Some(items),
            _ => None,
        }
    }

    /// Short type name of this value, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Nothing => "nothing",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "str",
            Value::Sym(_) => "symbol",
            Value::Svec(_) => "svec",
            Value::Tuple(_) => "tuple",
            Value::Type(_) => "type",
            Value::TypeVar(_) => "typevar",
            Value::Instance(_) => "instance",
            Value::Method(_) => "method",
            Value::GenericFn(_) => "generic function",
            Value::Builtin(_) => "builtin",
            Value::Module(_) => "module",
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nothing, Value::Nothing) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            // Bit equality keeps value equality reflexive (NaN == NaN).
            (Value::Float(a), Value::Float(b)) => a.to_bits() == b.to_bits(),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Sym(a), Value::Sym(b)) => a == b,
            (Value::Svec(a), Value::Svec(b)) | (Value::Tuple(a), Value::Tuple(b)) => a == b,
            (Value::Type(a), Value::Type(b)) => Arc::ptr_eq(a, b),
            (Value::TypeVar(a), Value::TypeVar(b)) => Arc::ptr_eq(a, b),
            (Value::Instance(a), Value::Instance(b)) => Arc::ptr_eq(a, b),
            (Value::Method(a), Value::Method(b)) => Arc::ptr_eq(a, b),
            (Value::GenericFn(a), Value::GenericFn(b)) => Arc::ptr_eq(a, b),
            (Value::Builtin(a), Value::Builtin(b)) => a == b,
            (Value::Module(a), Value::Module(b)) => a == b,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_equality() {
        assert_eq!(Value::int(3), Value::int(3));
        assert_ne!(Value::int(3), Value::Float(3.0));
        assert_eq!(Value::Float(f64::NAN), Value::Float(f64::NAN));
    }

    #[test]
    fn test_tuple_structural_equality() {
        let a = Value::tuple(vec![Value::int(1), Value::str("x")]);
        let b = Value::tuple(vec![Value::int(1), Value::str("x")]);
        assert_eq!(a, b);
    }

    #[test]
    fn test_instance_field_cells() {
        use crate::TypeObject;
        let ty = Arc::new(TypeObject::new_abstract(Name::EMPTY, Vec::new()));
        let inst = Instance::new_uninit(ty, 2);
        assert_eq!(inst.field(0), None);
        inst.set_field(0, Value::int(7));
        assert_eq!(inst.field(0), Some(Value::int(7)));
        assert_eq!(inst.field(1), None);
    }
}
