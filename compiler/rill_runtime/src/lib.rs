//! Rill Runtime - global state and collaborator seams for the interpreter.
//!
//! This crate owns what outlives any single call:
//!
//! - `ModuleRegistry`: modules, bindings, and the ambient current-module
//!   context
//! - `CoreTypes`: the pre-built well-known types
//! - `RootSet`: the garbage collector's root-registration seam
//! - `GenericDispatch`: the dispatch seam, with a registration-order
//!   `MethodTable` for bootstrap and tests
//! - layout computation for committed composite types

mod core_types;
mod dispatch;
mod gc;
mod layout;
mod modules;
mod runtime;

pub use core_types::CoreTypes;
pub use dispatch::{Applied, GenericDispatch, MethodTable};
pub use gc::{CountingRootSet, NoopRootSet, RootScope, RootSet};
pub use layout::{
    compute_field_offsets, is_singleton_shape, make_singleton, reinstantiate_inner_types,
    reset_instantiate_inner_types,
};
pub use modules::{Binding, CurrentModuleGuard, Module, ModuleRegistry};
pub use runtime::Runtime;
