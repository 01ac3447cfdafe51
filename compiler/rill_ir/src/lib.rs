//! Rill IR - lowered program representation and value model.
//!
//! This crate defines everything the interpreter consumes but does not
//! own: interned names, module identifiers, the closed [`Node`] IR enum,
//! method (lambda) records, the dynamic [`Value`] model, user-defined
//! [`TypeObject`]s, and the [`EvalError`] taxonomy.
//!
//! The lowering pass that produces [`Node`] trees and the numbering policy
//! for slots and SSA temporaries live upstream; this crate only fixes the
//! contract (1-based contiguous slots, 0-based SSA temporaries).

pub mod errors;
mod interner;
mod method;
mod module_id;
mod name;
mod node;
mod types;
mod value;

pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use interner::{SharedInterner, StringInterner};
pub use method::Method;
pub use module_id::ModuleId;
pub use name::Name;
pub use node::{MetaKind, Node, SyntaxRelay, TypeDefNode};
pub use types::{equiv_type, is_subtype_of, Layout, TypeKind, TypeObject, TypeRef};
pub use value::{Builtin, BuiltinFn, GenericFn, Instance, TypeVar, Value};
