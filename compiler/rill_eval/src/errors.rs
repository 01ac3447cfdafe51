//! Centralized error constructors for the evaluator.
//!
//! Single import point for every evaluation error factory; the canonical
//! definitions live in `rill_ir::errors` next to the value model.

pub use rill_ir::errors::{EvalError, EvalErrorKind, EvalResult};

// Variable and frame access
pub use rill_ir::errors::{
    invalid_slot_access, invalid_ssa_access, no_frame, static_param_unknown, undefined_variable,
};

// Expression and control forms
pub use rill_ir::errors::{condition_not_bool, malformed_expression, missing_return};

// Type definitions
pub use rill_ir::errors::{
    constant_redefinition, field_not_a_type, invalid_subtyping, invalid_type_declaration,
    typedef_reentry,
};

// Calls and dispatch
pub use rill_ir::errors::{argument_mismatch, no_method, unanalyzed_method};

// Raised values and relayed errors
pub use rill_ir::errors::{raised, syntax_error};
