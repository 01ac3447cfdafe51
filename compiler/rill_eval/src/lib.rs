//! Rill Eval - tree-walking interpreter over lowered IR.
//!
//! Executes [`rill_ir::Node`] statement lists directly, with no lowering
//! of its own: a program counter over each method body, per-call frames
//! holding local slots and SSA temporaries, recursion-based exception
//! scopes, and the speculative-install rollback protocol for type
//! definitions. Global state (modules, core types, roots) lives in
//! [`rill_runtime::Runtime`]; method selection goes through the
//! [`rill_runtime::GenericDispatch`] seam.
//!
//! # Usage
//!
//! ```ignore
//! let rt = Runtime::new(SharedInterner::new());
//! let mut interp = Interpreter::new(&rt);
//! let result = interp.interpret_toplevel_thunk(&thunk)?;
//! ```

pub mod errors;
mod exec;
mod frame;
mod interpreter;
mod stack;

pub use frame::Frame;
pub use interpreter::{Interpreter, InterpreterBuilder};

#[cfg(test)]
mod tests;
