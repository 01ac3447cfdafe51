//! User-defined type objects.
//!
//! A [`TypeObject`] is mutable while a type definition is under
//! construction: the supertype, field types, layout, and cached inner
//! instantiations are filled in by the type-definition evaluator inside a
//! rollback scope. Once the definition commits, the object is durably
//! visible through its module binding and is no longer written.
//!
//! Identity matters: bindings and values reference types through
//! [`TypeRef`] (an `Arc`), and type equality is pointer equality. The
//! structural check [`equiv_type`] exists solely to make re-running a
//! definition with an identical shape keep the previously installed object.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Name, Value};

/// Shared reference to a type object. Equality is identity.
pub type TypeRef = Arc<TypeObject>;

/// What sort of type a [`TypeObject`] is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeKind {
    /// An abstract type: no fields, no instances of its own.
    Abstract,
    /// A fixed-width primitive type of `nbits` bits.
    Primitive { nbits: u32 },
    /// A composite (record) type.
    Composite {
        /// Whether instances are mutable.
        mutable: bool,
        /// Number of fields guaranteed initialized by inner constructors.
        ninitialized: u32,
    },
}

/// Computed storage layout of a composite type.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    /// Total instance size in bytes.
    pub size: u32,
    /// Byte offset of each field.
    pub offsets: Vec<u32>,
}

/// A user-defined type under construction or committed.
pub struct TypeObject {
    pub name: Name,
    pub kind: TypeKind,
    /// Declared type parameters (type variables). Empty for most types;
    /// redefinition equivalence is only recognized when empty.
    pub params: Vec<Value>,
    /// Field names, in declaration order. Empty unless composite.
    pub field_names: Vec<Name>,
    supertype: RwLock<Option<TypeRef>>,
    field_types: RwLock<Vec<Value>>,
    layout: RwLock<Option<Layout>>,
    /// Cached shared instance for eligible zero-parameter composites.
    instance: RwLock<Option<Value>>,
    /// Cache of re-instantiated self-referential inner types. Discarded
    /// wholesale when a definition rolls back.
    inner_cache: RwLock<Vec<Value>>,
}

impl TypeObject {
    /// Create a provisional abstract type. Supertype is set later, inside
    /// the definition's rollback scope.
    pub fn new_abstract(name: Name, params: Vec<Value>) -> Self {
        TypeObject::new(name, TypeKind::Abstract, params, Vec::new())
    }

    /// Create a provisional fixed-width primitive type.
    pub fn new_primitive(name: Name, params: Vec<Value>, nbits: u32) -> Self {
        TypeObject::new(name, TypeKind::Primitive { nbits }, params, Vec::new())
    }

    /// Create a provisional composite type. Field types are evaluated and
    /// attached later, inside the definition's rollback scope.
    pub fn new_composite(
        name: Name,
        params: Vec<Value>,
        field_names: Vec<Name>,
        mutable: bool,
        ninitialized: u32,
    ) -> Self {
        TypeObject::new(
            name,
            TypeKind::Composite {
                mutable,
                ninitialized,
            },
            params,
            field_names,
        )
    }

    fn new(name: Name, kind: TypeKind, params: Vec<Value>, field_names: Vec<Name>) -> Self {
        TypeObject {
            name,
            kind,
            params,
            field_names,
            supertype: RwLock::new(None),
            field_types: RwLock::new(Vec::new()),
            layout: RwLock::new(None),
            instance: RwLock::new(None),
            inner_cache: RwLock::new(Vec::new()),
        }
    }

    #[inline]
    pub fn is_abstract(&self) -> bool {
        matches!(self.kind, TypeKind::Abstract)
    }

    #[inline]
    pub fn is_composite(&self) -> bool {
        matches!(self.kind, TypeKind::Composite { .. })
    }

    /// Whether instances of this type are mutable.
    pub fn is_mutable(&self) -> bool {
        matches!(self.kind, TypeKind::Composite { mutable: true, .. })
    }

    /// Width in bits, for primitive types.
    pub fn nbits(&self) -> Option<u32> {
        match self.kind {
            TypeKind::Primitive { nbits } => Some(nbits),
            _ => None,
        }
    }

    pub fn supertype(&self) -> Option<TypeRef> {
        self.supertype.read().clone()
    }

    /// Install the declared supertype. Validation happens in the
    /// type-definition evaluator before this is called.
    pub fn set_supertype(&self, super_ty: TypeRef) {
        *self.supertype.write() = Some(super_ty);
    }

    pub fn field_types(&self) -> Vec<Value> {
        self.field_types.read().clone()
    }

    pub fn set_field_types(&self, types: Vec<Value>) {
        *self.field_types.write() = types;
    }

    pub fn field_count(&self) -> usize {
        self.field_names.len()
    }

    pub fn layout(&self) -> Option<Layout> {
        self.layout.read().clone()
    }

    pub fn set_layout(&self, layout: Layout) {
        *self.layout.write() = Some(layout);
    }

    /// The cached singleton instance, if one was computed.
    pub fn instance(&self) -> Option<Value> {
        self.instance.read().clone()
    }

    pub fn set_instance(&self, value: Value) {
        *self.instance.write() = Some(value);
    }

    /// Record re-instantiated inner types that referred to this type while
    /// it was provisionally bound.
    pub fn cache_inner(&self, value: Value) {
        self.inner_cache.write().push(value);
    }

    pub fn inner_cache_len(&self) -> usize {
        self.inner_cache.read().len()
    }

    /// Discard everything a failed definition may have computed: the
    /// inner-instantiation cache, the layout, and any singleton. After this
    /// call no partially built state is observable.
    pub fn reset_construction(&self) {
        self.inner_cache.write().clear();
        *self.layout.write() = None;
        *self.instance.write() = None;
    }

}

/// Walk `ty`'s supertype chain looking for `ancestor` (identity comparison).
pub fn is_subtype_of(ty: &TypeRef, ancestor: &TypeRef) -> bool {
    let mut cur = ty.clone();
    loop {
        if Arc::ptr_eq(&cur, ancestor) {
            return true;
        }
        let Some(super_ty) = cur.supertype() else {
            return false;
        };
        // The top type is its own supertype; stop there.
        if Arc::ptr_eq(&super_ty, &cur) {
            return false;
        }
        cur = super_ty;
    }
}

// Print the shape only; walking supertype chains through the interior
// locks would recurse on self-referential types.
impl fmt::Debug for TypeObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeObject")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("nparams", &self.params.len())
            .field("nfields", &self.field_names.len())
            .finish_non_exhaustive()
    }
}

/// Structural equivalence of two type objects, used to allow "redefining"
/// a type to something identical without disturbing the existing binding.
///
/// Parametric types are deliberately excluded: constructors cannot yet
/// survive identity-swapping of a parametric type, so only zero-parameter
/// shapes are candidates.
pub fn equiv_type(a: &TypeRef, b: &TypeRef) -> bool {
    let kinds_match = match (a.kind, b.kind) {
        (TypeKind::Abstract, TypeKind::Abstract) => true,
        (TypeKind::Primitive { nbits: na }, TypeKind::Primitive { nbits: nb }) => na == nb,
        (
            TypeKind::Composite {
                mutable: ma,
                ninitialized: ia,
            },
            TypeKind::Composite {
                mutable: mb,
                ninitialized: ib,
            },
        ) => ma == mb && ia == ib,
        _ => false,
    };
    kinds_match
        && a.params.is_empty()
        && b.params.is_empty()
        && a.name == b.name
        && a.field_names == b.field_names
        && a.field_types() == b.field_types()
        && match (a.supertype(), b.supertype()) {
            (Some(sa), Some(sb)) => Arc::ptr_eq(&sa, &sb),
            (None, None) => true,
            _ => false,
        }
        && a.layout().map(|l| l.size) == b.layout().map(|l| l.size)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed_composite(name: Name, fields: Vec<(Name, Value)>) -> TypeRef {
        let (names, types): (Vec<_>, Vec<_>) = fields.into_iter().unzip();
        let ty = Arc::new(TypeObject::new_composite(name, Vec::new(), names, false, 0));
        ty.set_field_types(types);
        ty
    }

    #[test]
    fn test_equiv_type_identical_shape() {
        let int_ty: TypeRef = Arc::new(TypeObject::new_primitive(Name::from_raw(9), vec![], 64));
        let x = Name::from_raw(1);
        let y = Name::from_raw(2);
        let a = committed_composite(
            Name::from_raw(7),
            vec![
                (x, Value::Type(int_ty.clone())),
                (y, Value::Type(int_ty.clone())),
            ],
        );
        let b = committed_composite(
            Name::from_raw(7),
            vec![(x, Value::Type(int_ty.clone())), (y, Value::Type(int_ty))],
        );
        assert!(equiv_type(&a, &b));
    }

    #[test]
    fn test_equiv_type_rejects_different_fields() {
        let int_ty: TypeRef = Arc::new(TypeObject::new_primitive(Name::from_raw(9), vec![], 64));
        let float_ty: TypeRef = Arc::new(TypeObject::new_primitive(Name::from_raw(10), vec![], 64));
        let x = Name::from_raw(1);
        let a = committed_composite(Name::from_raw(7), vec![(x, Value::Type(int_ty))]);
        let b = committed_composite(Name::from_raw(7), vec![(x, Value::Type(float_ty))]);
        assert!(!equiv_type(&a, &b));
    }

    #[test]
    fn test_equiv_type_rejects_parametric() {
        let tv = Value::TypeVar(Arc::new(crate::TypeVar {
            name: Name::from_raw(3),
        }));
        let a: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(7),
            vec![tv.clone()],
            vec![],
            false,
            0,
        ));
        let b: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(7),
            vec![tv],
            vec![],
            false,
            0,
        ));
        assert!(!equiv_type(&a, &b));
    }

    #[test]
    fn test_subtype_chain() {
        let any: TypeRef = Arc::new(TypeObject::new_abstract(Name::from_raw(1), vec![]));
        let mid: TypeRef = Arc::new(TypeObject::new_abstract(Name::from_raw(2), vec![]));
        mid.set_supertype(any.clone());
        let leaf: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(3),
            vec![],
            vec![],
            false,
            0,
        ));
        leaf.set_supertype(mid.clone());
        assert!(is_subtype_of(&leaf, &any));
        assert!(is_subtype_of(&leaf, &mid));
        assert!(!is_subtype_of(&any, &leaf));
    }

    #[test]
    fn test_reset_construction_discards_partial_state() {
        let ty: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(4),
            vec![],
            vec![],
            false,
            0,
        ));
        ty.cache_inner(Value::Nothing);
        ty.set_layout(Layout {
            size: 16,
            offsets: vec![0, 8],
        });
        ty.set_instance(Value::Nothing);
        ty.reset_construction();
        assert_eq!(ty.inner_cache_len(), 0);
        assert_eq!(ty.layout(), None);
        assert_eq!(ty.instance(), None);
    }
}
