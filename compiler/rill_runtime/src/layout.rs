//! Field storage layout and singleton computation.
//!
//! Run on the success path of a composite type definition, after field
//! types validated: compute each field's byte offset and the total size,
//! and cache a shared singleton instance when the shape permits one.

use std::sync::Arc;

use rill_ir::{Instance, Layout, TypeRef, Value};

/// Storage size of one field, in bytes.
///
/// Fixed-width primitives are stored inline; everything else is stored as
/// a reference.
fn field_size(field_type: &Value) -> u32 {
    const REF_SIZE: u32 = 8;
    match field_type.as_type().and_then(|t| t.nbits()) {
        Some(nbits) => nbits.div_ceil(8),
        None => REF_SIZE,
    }
}

/// Compute and attach the storage layout of a composite type.
pub fn compute_field_offsets(ty: &TypeRef) {
    let mut offsets = Vec::with_capacity(ty.field_count());
    let mut size: u32 = 0;
    for field_type in &ty.field_types() {
        let fsize = field_size(field_type);
        // Natural alignment, capped at reference alignment.
        let align = fsize.clamp(1, 8).next_power_of_two();
        size = size.next_multiple_of(align);
        offsets.push(size);
        size = size.saturating_add(fsize);
    }
    ty.set_layout(Layout { size, offsets });
}

/// Whether the type's shape permits a cached shared instance: a
/// zero-parameter immutable composite with no fields.
pub fn is_singleton_shape(ty: &TypeRef) -> bool {
    ty.is_composite() && ty.params.is_empty() && ty.field_count() == 0 && !ty.is_mutable()
}

/// Compute and cache the singleton instance.
pub fn make_singleton(ty: &TypeRef) {
    let instance = Value::Instance(Arc::new(Instance::new_uninit(ty.clone(), 0)));
    ty.set_instance(instance);
}

/// Re-instantiate inner types that referred to the type while it was
/// provisionally bound; the recorded entries are discarded wholesale if
/// the definition rolls back.
pub fn reinstantiate_inner_types(ty: &TypeRef) {
    for field_type in ty.field_types() {
        if let Some(ft) = field_type.as_type() {
            if Arc::ptr_eq(ft, ty) {
                ty.cache_inner(field_type.clone());
            }
        }
    }
}

/// Discard partially computed construction state after a failure.
pub fn reset_instantiate_inner_types(ty: &TypeRef) {
    ty.reset_construction();
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rill_ir::{Name, TypeObject};

    fn primitive(nbits: u32) -> Value {
        let t: TypeRef = Arc::new(TypeObject::new_primitive(Name::EMPTY, Vec::new(), nbits));
        Value::Type(t)
    }

    #[test]
    fn test_offsets_respect_alignment() {
        let ty: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(1),
            Vec::new(),
            vec![Name::from_raw(2), Name::from_raw(3), Name::from_raw(4)],
            false,
            0,
        ));
        // 1-byte field, then 8-byte field, then a reference field.
        ty.set_field_types(vec![primitive(8), primitive(64), Value::Nothing]);
        compute_field_offsets(&ty);
        let layout = ty.layout().expect("layout computed");
        assert_eq!(layout.offsets, vec![0, 8, 16]);
        assert_eq!(layout.size, 24);
    }

    #[test]
    fn test_singleton_shape() {
        let empty: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(1),
            Vec::new(),
            Vec::new(),
            false,
            0,
        ));
        assert!(is_singleton_shape(&empty));
        make_singleton(&empty);
        assert!(empty.instance().is_some());

        let mutable: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(1),
            Vec::new(),
            Vec::new(),
            true,
            0,
        ));
        assert!(!is_singleton_shape(&mutable));
    }

    #[test]
    fn test_reinstantiate_records_self_reference() {
        let ty: TypeRef = Arc::new(TypeObject::new_composite(
            Name::from_raw(1),
            Vec::new(),
            vec![Name::from_raw(2)],
            true,
            0,
        ));
        ty.set_field_types(vec![Value::Type(ty.clone())]);
        reinstantiate_inner_types(&ty);
        assert_eq!(ty.inner_cache_len(), 1);
        reset_instantiate_inner_types(&ty);
        assert_eq!(ty.inner_cache_len(), 0);
    }
}
