//! Execution engines.
//!
//! Split by concern: single-expression evaluation (`expr`), call paths
//! (`call`), type definitions with their rollback protocol (`typedef`),
//! and the statement-list walker with control flow and exception scopes
//! (`body`). All of them are `impl Interpreter` blocks; the split keeps
//! each protocol readable on its own.

mod body;
mod call;
mod expr;
mod typedef;

pub(crate) use expr::node_form;
