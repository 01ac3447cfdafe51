//! Type definitions and their rollback protocol.
//!
//! A definition installs a provisional type object under its binding
//! before evaluating the supertype and field-type expressions, so those
//! expressions can refer to the type by name (self-referential fields,
//! recursive shapes). Everything evaluated after the speculative install
//! runs inside a rollback scope: on any failure the partially built
//! construction state is discarded and the binding's prior value is
//! restored, byte for byte, before the error re-raises.
//!
//! Redefinition: when the freshly built type is structurally equivalent
//! to the existing one, the existing object keeps its identity and the
//! binding is untouched. A different shape installs the new type object
//! and the old one stops being reachable from the binding. The only
//! binding that blocks a definition is a constant holding a non-type
//! value; one type object may always replace another.
//!
//! Definitions do not compose: evaluating a definition while another is
//! under construction is a defect, not a catchable condition.

use std::sync::Arc;

use tracing::{debug, trace};

use rill_ir::{equiv_type, is_subtype_of, Name, Node, TypeDefNode, TypeObject, TypeRef, Value};
use rill_runtime::{
    compute_field_offsets, is_singleton_shape, make_singleton, reinstantiate_inner_types,
    reset_instantiate_inner_types, Binding,
};

use crate::errors::{
    constant_redefinition, field_not_a_type, invalid_subtyping, invalid_type_declaration,
    malformed_expression, typedef_reentry, EvalError, EvalResult,
};
use crate::frame::Frame;
use crate::interpreter::Interpreter;

/// A constant binding may be rebound by a type definition only if its
/// current value is itself a type (the equivalence check decides the rest).
fn check_can_assign_type(binding: &Binding, name_str: &str) -> Result<(), EvalError> {
    if binding.is_constant() && matches!(binding.value(), Some(v) if v.as_type().is_none()) {
        return Err(constant_redefinition(name_str));
    }
    Ok(())
}

impl Interpreter<'_> {
    pub(crate) fn eval_typedef(&mut self, def: &TypeDefNode, frame: Option<&Frame>) -> EvalResult {
        if self.inside_typedef.get() {
            return Err(typedef_reentry(def.form_word()));
        }
        match def {
            TypeDefNode::Abstract {
                name,
                params,
                supertype,
            } => {
                let para = self.eval_type_params(params, frame)?;
                let name_str = self.rt.name_str(*name);
                let dt: TypeRef = Arc::new(TypeObject::new_abstract(*name, para));
                self.define_type(*name, dt, frame, |interp, dt| {
                    let declared = interp.eval(supertype, frame)?;
                    interp.install_supertype(dt, &declared, name_str)
                })
            }

            TypeDefNode::Primitive {
                name,
                params,
                nbits,
                supertype,
            } => {
                let para = self.eval_type_params(params, frame)?;
                let name_str = self.rt.name_str(*name);
                let nb_value = self.eval(nbits, frame)?;
                let Value::Int(nb) = nb_value else {
                    return Err(invalid_type_declaration(
                        name_str,
                        "bit width is not an integer",
                    ));
                };
                if !(1..1 << 23).contains(&nb) || nb % 8 != 0 {
                    return Err(invalid_type_declaration(name_str, "invalid number of bits"));
                }
                let nbits = u32::try_from(nb).unwrap_or(u32::MAX);
                let dt: TypeRef = Arc::new(TypeObject::new_primitive(*name, para, nbits));
                self.define_type(*name, dt, frame, |interp, dt| {
                    let declared = interp.eval(supertype, frame)?;
                    interp.install_supertype(dt, &declared, name_str)
                })
            }

            TypeDefNode::Composite {
                name,
                params,
                field_names,
                supertype,
                field_types,
                mutable,
                ninitialized,
            } => {
                let para = self.eval_type_params(params, frame)?;
                let names = self.eval_field_names(field_names, frame)?;
                let name_str = self.rt.name_str(*name);
                let dt: TypeRef = Arc::new(TypeObject::new_composite(
                    *name,
                    para,
                    names,
                    *mutable,
                    *ninitialized,
                ));
                self.define_type(*name, dt, frame, |interp, dt| {
                    let declared = interp.eval(supertype, frame)?;
                    interp.install_supertype(dt, &declared, name_str)?;
                    let types_value = interp.eval(field_types, frame)?;
                    interp.install_field_types(dt, &types_value, name_str)
                })
            }
        }
    }

    /// The speculative-install / rollback / commit protocol shared by the
    /// three definition forms. `build` fills in everything that may refer
    /// to the type by name; it runs with the provisional type installed.
    fn define_type<B>(
        &mut self,
        name: Name,
        dt: TypeRef,
        frame: Option<&Frame>,
        build: B,
    ) -> EvalResult
    where
        B: FnOnce(&mut Self, &TypeRef) -> Result<(), EvalError>,
    {
        let name_str = self.rt.name_str(name);
        let module = self.context_module(frame);
        let binding = module.binding_or_create(name);
        check_can_assign_type(&binding, name_str)?;
        let saved = binding.value();

        binding.store_raw(Some(Value::Type(dt.clone())));
        self.inside_typedef.set(true);
        let built = build(self, &dt);
        self.inside_typedef.set(false);

        if let Err(err) = built {
            reset_instantiate_inner_types(&dt);
            binding.store_raw(saved);
            trace!(name = name_str, "type definition rolled back");
            return Err(err);
        }

        if dt.is_composite() {
            compute_field_offsets(&dt);
            if is_singleton_shape(&dt) {
                make_singleton(&dt);
            }
        }
        reinstantiate_inner_types(&dt);

        // Restore the prior value, then commit. An equivalent existing
        // definition keeps the old object's identity and leaves the
        // binding untouched; anything else installs the new type object.
        binding.store_raw(saved.clone());
        let keep_existing = matches!(
            saved.as_ref().and_then(Value::as_type),
            Some(old) if equiv_type(old, &dt)
        );
        if keep_existing {
            debug!(name = name_str, "equivalent redefinition; keeping existing type");
            return Ok(Value::Nothing);
        }
        if binding.is_constant() {
            // The pre-check guarantees a constant binding here holds a
            // type, and one type object may replace another.
            binding.store_raw(Some(Value::Type(dt)));
        } else {
            binding.checked_assign(Value::Type(dt), name_str)?;
        }
        debug!(name = name_str, "type defined");
        Ok(Value::Nothing)
    }

    /// Install a validated supertype. The declared supertype must be an
    /// abstract type, must not share the defined type's name (which also
    /// rejects the previous same-named object during a redefinition), and
    /// must not reach any of the structural marker types.
    fn install_supertype(
        &self,
        dt: &TypeRef,
        declared: &Value,
        name_str: &str,
    ) -> Result<(), EvalError> {
        let Some(super_ty) = declared.as_type() else {
            return Err(invalid_subtyping(name_str));
        };
        let core = &self.rt.core;
        let invalid = !super_ty.is_abstract()
            || super_ty.name == dt.name
            || is_subtype_of(super_ty, &core.vararg)
            || is_subtype_of(super_ty, &core.tuple)
            || is_subtype_of(super_ty, &core.type_type)
            || is_subtype_of(super_ty, &core.builtin);
        if invalid {
            return Err(invalid_subtyping(name_str));
        }
        dt.set_supertype(super_ty.clone());
        Ok(())
    }

    /// Validate and attach the declared field types: one per field, each a
    /// type or an unbound type variable.
    fn install_field_types(
        &self,
        dt: &TypeRef,
        declared: &Value,
        name_str: &str,
    ) -> Result<(), EvalError> {
        let Some(items) = declared.as_svec() else {
            return Err(malformed_expression("field type list is not an svec"));
        };
        if items.len() != dt.field_count() {
            return Err(invalid_type_declaration(
                name_str,
                "field type count does not match field names",
            ));
        }
        for (i, ft) in items.iter().enumerate() {
            if ft.as_type().is_none() && !ft.is_type_var() {
                let field = dt.field_names.get(i).copied().unwrap_or(Name::EMPTY);
                return Err(field_not_a_type(name_str, self.rt.name_str(field)));
            }
        }
        dt.set_field_types(items.to_vec());
        Ok(())
    }

    /// Evaluate a type-parameter list to a vector of values (an svec of
    /// type variables in well-formed input).
    fn eval_type_params(
        &mut self,
        node: &Node,
        frame: Option<&Frame>,
    ) -> Result<Vec<Value>, EvalError> {
        let value = self.eval(node, frame)?;
        match value.as_svec() {
            Some(items) => Ok(items.to_vec()),
            None => Err(malformed_expression("type parameter list is not an svec")),
        }
    }

    /// Evaluate a field-name list to names; every entry must be a symbol.
    fn eval_field_names(
        &mut self,
        node: &Node,
        frame: Option<&Frame>,
    ) -> Result<Vec<Name>, EvalError> {
        let value = self.eval(node, frame)?;
        let Some(items) = value.as_svec() else {
            return Err(malformed_expression("field name list is not an svec"));
        };
        items
            .iter()
            .map(|item| match item {
                Value::Sym(n) => Ok(*n),
                _ => Err(malformed_expression("field name is not a symbol")),
            })
            .collect()
    }
}
