//! Lowered IR nodes.
//!
//! The interpreter consumes a tree of [`Node`]s produced by the lowering
//! pass. The variant set is closed and exhaustively matched by the
//! evaluator, so an unhandled form is a compile error here rather than a
//! runtime surprise. Nodes are immutable; the interpreter never rewrites
//! them.
//!
//! Statement lists address each other by 1-based labels (`Goto`,
//! `GotoIfNot`, `EnterHandler` all carry statement positions).

use std::sync::Arc;

use crate::{Method, ModuleId, Name, Value};

/// One node of the lowered program representation.
#[derive(Clone, Debug)]
pub enum Node {
    /// A literal constant.
    Const(Value),

    /// Local slot reference, 1-based.
    Slot(u32),

    /// SSA-temporary reference, 0-based.
    SsaUse(u32),

    /// Module-qualified global reference.
    GlobalRef(ModuleId, Name),

    /// Bare symbol: a toplevel reference resolved against the current
    /// module (lowering leaves these unwrapped in toplevel code).
    Sym(Name),

    /// Quoted literal; evaluation extracts the payload unchanged.
    Quote(Value),

    /// Static-parameter reference, 1-based into the method's
    /// static-parameter vector (or the caller-supplied override).
    StaticParam(u32),

    /// Generic call. `args[0]` is the callee expression; all elements are
    /// evaluated left to right and handed to generic dispatch.
    Call(Vec<Node>),

    /// Direct invocation of a pre-resolved method, bypassing dispatch.
    Invoke {
        method: Arc<Method>,
        args: Vec<Node>,
    },

    /// Object construction. `args[0]` evaluates to the type; the remaining
    /// elements initialize fields in declaration order.
    New(Vec<Node>),

    /// The exception currently in flight. Valid only inside a handler body.
    CurrentException,

    /// A type definition (abstract / primitive / composite).
    TypeDef(TypeDefNode),

    /// A method definition.
    ///
    /// With only `name` set, declares (or fetches) the generic function for
    /// that binding and evaluates to it. With `signature` and `body` set,
    /// evaluates both and registers the method with generic dispatch.
    MethodDef {
        name: Option<Name>,
        signature: Option<Box<Node>>,
        body: Option<Box<Node>>,
    },

    /// A module definition. Toplevel-only; delegated to the module system.
    ModuleDef { name: Name, body: Vec<Node> },

    /// Assignment. The left-hand side denotes an SSA temporary, a local
    /// slot, a global reference, or a bare symbol.
    Assign(Box<Node>, Box<Node>),

    /// Unconditional jump to a 1-based statement label.
    Goto(u32),

    /// Jump to the label if the condition is `false`; fall through on
    /// `true`; any other condition value is an error.
    GotoIfNot(Box<Node>, u32),

    /// Return from the enclosing call with the operand's value.
    Return(Box<Node>),

    /// Enter an exception scope: push a handler that resumes at the given
    /// label when a value is raised within the scope.
    EnterHandler(u32),

    /// Leave exception scopes: pop the given number of handlers.
    LeaveHandler(u32),

    /// Source-line marker. Updates line tracking at toplevel; no control
    /// effect.
    Line(u32),

    /// Reset the named local slot to the unassigned state (re-entrant and
    /// looped declarations).
    NewVarScope(u32),

    /// Declare the named module binding constant.
    ConstDecl(Name),

    /// Create uninitialized mutable bindings for a `global` declaration.
    GlobalDecl(Vec<Name>),

    /// Deep-copy the evaluated operand.
    CopyAst(Box<Node>),

    /// Static type query; evaluates to the top type in the interpreter.
    StaticTypeof(Box<Node>),

    /// No-op annotation forms; evaluate to the unit value.
    Meta(MetaKind),

    /// A pre-detected error from an earlier pass; evaluating it raises.
    SyntaxError(SyntaxRelay),
}

/// The three type-definition forms.
#[derive(Clone, Debug)]
pub enum TypeDefNode {
    Abstract {
        name: Name,
        /// Evaluates to an svec of type variables.
        params: Box<Node>,
        supertype: Box<Node>,
    },
    Primitive {
        name: Name,
        params: Box<Node>,
        /// Evaluates to the declared width in bits.
        nbits: Box<Node>,
        supertype: Box<Node>,
    },
    Composite {
        name: Name,
        params: Box<Node>,
        /// Evaluates to an svec of field-name symbols.
        field_names: Box<Node>,
        supertype: Box<Node>,
        /// Evaluates to an svec of field types.
        field_types: Box<Node>,
        mutable: bool,
        ninitialized: u32,
    },
}

impl TypeDefNode {
    /// The name being defined.
    pub fn name(&self) -> Name {
        match self {
            TypeDefNode::Abstract { name, .. }
            | TypeDefNode::Primitive { name, .. }
            | TypeDefNode::Composite { name, .. } => *name,
        }
    }

    /// Human word for the form, used in re-entrancy errors.
    pub fn form_word(&self) -> &'static str {
        match self {
            TypeDefNode::Abstract { .. } => "abstract",
            TypeDefNode::Primitive { .. } => "primitive",
            TypeDefNode::Composite { .. } => "composite",
        }
    }
}

/// Annotation forms that evaluate to unit with no side effect.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MetaKind {
    BoundsCheck,
    Inbounds,
    FastMath,
    SimdLoop,
    Meta,
    TypeGoto,
}

/// Error material carried through from an earlier pass.
#[derive(Clone, Debug)]
pub enum SyntaxRelay {
    /// A message to raise as a syntax error.
    Message(String),
    /// A value to re-throw directly.
    Value(Value),
}

impl Node {
    /// Convenience constructor for a literal node.
    pub fn konst(value: Value) -> Self {
        Node::Const(value)
    }

    /// Whether this form must be handled by the toplevel evaluation path
    /// rather than plain expression evaluation.
    pub fn is_toplevel_only(&self) -> bool {
        matches!(self, Node::ModuleDef { .. })
    }
}
