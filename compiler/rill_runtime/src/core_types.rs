//! Pre-built well-known types.
//!
//! The type-definition evaluator validates declared supertypes against a
//! handful of special types (the top type, the vararg marker, the tuple
//! type, the type-type, the builtin marker). Those are built once per
//! runtime, with their names pre-interned, and compared by identity.

use std::sync::Arc;

use rill_ir::{StringInterner, TypeObject, TypeRef};

/// The well-known types of a runtime instance.
pub struct CoreTypes {
    /// The top type; every type's supertype chain ends here.
    pub any: TypeRef,
    /// The type of types.
    pub type_type: TypeRef,
    /// The universal vararg marker; never a valid supertype.
    pub vararg: TypeRef,
    /// The tuple type; never a valid supertype.
    pub tuple: TypeRef,
    /// Marker type of builtin functions; never a valid supertype.
    pub builtin: TypeRef,
    /// The boolean type, used to check jump conditions in diagnostics.
    pub bool_type: TypeRef,
}

impl CoreTypes {
    /// Build the core types, pre-interning their names.
    pub fn new(interner: &StringInterner) -> Self {
        let any: TypeRef = Arc::new(TypeObject::new_abstract(interner.intern("Any"), Vec::new()));
        // The top type is its own supertype; the chain walk treats the
        // self-edge as the end of the chain.
        any.set_supertype(any.clone());

        let abstract_under_any = |name: &str| -> TypeRef {
            let t: TypeRef = Arc::new(TypeObject::new_abstract(interner.intern(name), Vec::new()));
            t.set_supertype(any.clone());
            t
        };

        let bool_type: TypeRef = Arc::new(TypeObject::new_primitive(
            interner.intern("Bool"),
            Vec::new(),
            8,
        ));
        bool_type.set_supertype(any.clone());

        CoreTypes {
            type_type: abstract_under_any("Type"),
            vararg: abstract_under_any("Vararg"),
            tuple: abstract_under_any("Tuple"),
            builtin: abstract_under_any("Builtin"),
            bool_type,
            any,
        }
    }
}
