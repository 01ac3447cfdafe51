//! Evaluation error taxonomy.
//!
//! A single [`EvalError`] type with a closed [`EvalErrorKind`] and one
//! factory function per condition. Factories are the public API; they
//! populate both the kind and the rendered message, so call sites never
//! format strings ad hoc and callers can match on kind instead of parsing
//! text.
//!
//! Kinds split into two classes:
//!
//! - *conditions* — raised values and legitimate runtime failures
//!   (undefined variable, invalid supertype, …). These are catchable by an
//!   exception scope.
//! - *defects* — malformed IR or broken contracts (slot index out of
//!   range, invoking an unanalyzed method, a body without a return). These
//!   pass through handler scopes; they indicate a bug upstream, not a
//!   condition user code may handle.

use std::fmt;

use crate::Value;

/// Result of evaluation.
pub type EvalResult = Result<Value, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    // Conditions
    /// Read of an unassigned slot or unresolved global reference.
    UndefinedVariable { name: String },
    /// A static-parameter value could not be determined at run time.
    StaticParamUnknown,
    /// Unrecognized or misplaced expression form.
    MalformedExpression { form: String },
    /// A conditional jump's condition was not a boolean.
    ConditionNotBool { got: String },
    /// A type definition's declared supertype violates structural rules.
    InvalidSubtyping { type_name: String },
    /// A bad declaration in a type definition (e.g. primitive bit width).
    InvalidTypeDeclaration { type_name: String, detail: String },
    /// A composite field's declared type is not a type.
    FieldNotAType { type_name: String, field: String },
    /// Attempted redefinition of a constant binding with an incompatible
    /// value.
    ConstantRedefinition { name: String },
    /// A pre-detected syntax error relayed from an earlier pass.
    SyntaxError { message: String },
    /// Generic dispatch found no applicable method.
    NoMethod { name: String },
    /// A value raised by evaluated code.
    Raised(Value),

    // Defects (uncatchable)
    /// Slot or SSA index out of declared bounds, or access without a frame.
    InvalidAccess { what: String },
    /// A statement list was exhausted without reaching a return.
    MissingReturn,
    /// Direct invocation of a method record that has not completed
    /// dispatch analysis.
    UnanalyzedMethod { name: String },
    /// A type definition evaluated while another was being constructed.
    TypeDefReentry { form: String },
}

/// An evaluation error: a typed kind plus the rendered message.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    pub kind: EvalErrorKind,
    message: String,
}

impl EvalError {
    fn new(kind: EvalErrorKind, message: String) -> Self {
        EvalError { kind, message }
    }

    /// Whether an exception scope may catch this error.
    ///
    /// Defect kinds signal malformed input or broken contracts and always
    /// propagate past handler scopes.
    pub fn is_catchable(&self) -> bool {
        !matches!(
            self.kind,
            EvalErrorKind::InvalidAccess { .. }
                | EvalErrorKind::MissingReturn
                | EvalErrorKind::UnanalyzedMethod { .. }
                | EvalErrorKind::TypeDefReentry { .. }
        )
    }

    /// The raised payload: the carried value for `Raised`, otherwise the
    /// error itself boxed into a string value. This is what
    /// `CurrentException` observes inside a handler.
    pub fn raised_value(&self) -> Value {
        match &self.kind {
            EvalErrorKind::Raised(v) => v.clone(),
            _ => Value::str(&self.message),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory constructors

pub fn undefined_variable(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UndefinedVariable {
            name: name.to_owned(),
        },
        format!("undefined variable: {name}"),
    )
}

pub fn static_param_unknown() -> EvalError {
    EvalError::new(
        EvalErrorKind::StaticParamUnknown,
        "could not determine static parameter value".to_owned(),
    )
}

pub fn malformed_expression(form: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::MalformedExpression {
            form: form.to_owned(),
        },
        format!("unsupported or misplaced expression: {form}"),
    )
}

pub fn condition_not_bool(got: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ConditionNotBool {
            got: got.to_owned(),
        },
        format!("non-boolean ({got}) used in boolean context"),
    )
}

pub fn invalid_subtyping(type_name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidSubtyping {
            type_name: type_name.to_owned(),
        },
        format!("invalid subtyping in definition of {type_name}"),
    )
}

pub fn invalid_type_declaration(type_name: &str, detail: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidTypeDeclaration {
            type_name: type_name.to_owned(),
            detail: detail.to_owned(),
        },
        format!("invalid declaration of type {type_name}: {detail}"),
    )
}

pub fn field_not_a_type(type_name: &str, field: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::FieldNotAType {
            type_name: type_name.to_owned(),
            field: field.to_owned(),
        },
        format!("in definition of {type_name}: field {field} is not a type"),
    )
}

pub fn constant_redefinition(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::ConstantRedefinition {
            name: name.to_owned(),
        },
        format!("invalid redefinition of constant {name}"),
    )
}

pub fn syntax_error(message: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::SyntaxError {
            message: message.to_owned(),
        },
        format!("syntax: {message}"),
    )
}

pub fn no_method(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::NoMethod {
            name: name.to_owned(),
        },
        format!("no method matching {name}"),
    )
}

/// A value raised by evaluated code.
pub fn raised(value: Value) -> EvalError {
    let message = format!("unhandled exception ({})", value.kind_name());
    EvalError::new(EvalErrorKind::Raised(value), message)
}

pub fn invalid_slot_access(n: u32) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidAccess {
            what: format!("slot {n}"),
        },
        "access to invalid slot number".to_owned(),
    )
}

pub fn invalid_ssa_access(id: u32) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidAccess {
            what: format!("ssa {id}"),
        },
        "access to invalid SSA value".to_owned(),
    )
}

/// Frame-relative access attempted without a frame.
pub fn no_frame(what: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidAccess {
            what: what.to_owned(),
        },
        format!("access to {what} outside a frame"),
    )
}

/// A call reached the interpreter with the wrong number of arguments for
/// the method record. Dispatch is supposed to guarantee the count.
pub fn argument_mismatch(expected: u32, got: usize) -> EvalError {
    EvalError::new(
        EvalErrorKind::InvalidAccess {
            what: "arguments".to_owned(),
        },
        format!("method expects {expected} arguments, got {got}"),
    )
}

pub fn missing_return() -> EvalError {
    EvalError::new(
        EvalErrorKind::MissingReturn,
        "statement body must terminate in a return".to_owned(),
    )
}

pub fn unanalyzed_method(name: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::UnanalyzedMethod {
            name: name.to_owned(),
        },
        format!("direct invocation of unanalyzed method {name}"),
    )
}

pub fn typedef_reentry(form: &str) -> EvalError {
    EvalError::new(
        EvalErrorKind::TypeDefReentry {
            form: form.to_owned(),
        },
        format!("cannot eval a new {form} type definition while defining another type"),
    )
}
