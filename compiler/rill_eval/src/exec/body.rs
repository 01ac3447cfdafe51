//! The statement-list walker.
//!
//! [`Interpreter::eval_body`] runs a method body or thunk as a program
//! counter over the statement list. Control forms are interpreted here:
//! jumps (1-based labels), returns, assignments to every legal
//! left-hand-side shape, line markers, slot resets, and exception scopes.
//!
//! Exception scopes are modeled by recursion: `EnterHandler` pushes a
//! handler and re-enters the walker at the next statement. When a
//! catchable error propagates back to the scope that is still the
//! innermost active handler, the handler stack is truncated to that
//! scope's depth, the raised payload becomes the exception in transit,
//! and execution resumes at the handler label. Uncatchable defects and
//! errors whose scope was already left pass through.

use rill_ir::{EvalError, EvalResult, Node, Value};

use crate::errors::{condition_not_bool, malformed_expression, missing_return, no_frame};
use crate::exec::node_form;
use crate::frame::Frame;
use crate::interpreter::{Handler, Interpreter};

/// Convert a 1-based label into a statement index.
fn target(stmts: &[Node], label: u32) -> Result<usize, EvalError> {
    if label == 0 || label as usize > stmts.len() {
        return Err(malformed_expression("jump outside the statement list"));
    }
    Ok((label - 1) as usize)
}

impl Interpreter<'_> {
    /// Execute `stmts` from `start` until a `Return`. Running off the end
    /// of the list without returning is malformed IR.
    ///
    /// `toplevel` bodies track line markers and may contain toplevel-only
    /// forms; anything else treats those forms as misplaced.
    pub(crate) fn eval_body(
        &mut self,
        stmts: &[Node],
        mut frame: Option<&mut Frame<'_>>,
        start: usize,
        toplevel: bool,
    ) -> EvalResult {
        let mut i = start;
        loop {
            let Some(stmt) = stmts.get(i) else {
                return Err(missing_return());
            };
            match stmt {
                Node::Goto(label) => {
                    i = target(stmts, *label)?;
                    continue;
                }

                Node::GotoIfNot(cond, label) => {
                    let condition = {
                        let shared = frame.as_ref().map(|f| &**f);
                        self.eval(cond, shared)?
                    };
                    match condition {
                        Value::Bool(false) => {
                            i = target(stmts, *label)?;
                            continue;
                        }
                        Value::Bool(true) => {}
                        other => return Err(condition_not_bool(other.kind_name())),
                    }
                }

                Node::Return(operand) => {
                    return if toplevel && operand.is_toplevel_only() {
                        self.eval_toplevel_form(operand)
                    } else {
                        let shared = frame.as_ref().map(|f| &**f);
                        self.eval(operand, shared)
                    };
                }

                Node::Assign(lhs, rhs) => {
                    let value = {
                        let shared = frame.as_ref().map(|f| &**f);
                        self.eval(rhs, shared)?
                    };
                    self.assign(lhs, value, &mut frame)?;
                }

                Node::Line(line) => {
                    if toplevel {
                        self.lineno.set(*line);
                    }
                }

                Node::EnterHandler(label) => {
                    target(stmts, *label)?;
                    let depth = self.handlers.len();
                    self.handlers.push(Handler { label: *label });
                    let result =
                        self.eval_body(stmts, frame.as_mut().map(|f| &mut **f), i + 1, toplevel);
                    match result {
                        Ok(v) => {
                            self.handlers.truncate(depth);
                            return Ok(v);
                        }
                        Err(err) if err.is_catchable() && self.handlers.len() > depth => {
                            // This scope is the innermost still-active
                            // handler. Pop it together with any scopes
                            // entered after it and resume at the label it
                            // recorded.
                            let resume = target(stmts, self.handlers[depth].label)?;
                            self.handlers.truncate(depth);
                            self.exception_in_transit = Some(err.raised_value());
                            i = resume;
                            continue;
                        }
                        Err(err) => {
                            self.handlers.truncate(depth);
                            return Err(err);
                        }
                    }
                }

                Node::LeaveHandler(n) => {
                    let keep = self.handlers.len().saturating_sub(*n as usize);
                    self.handlers.truncate(keep);
                }

                Node::NewVarScope(slot) => match frame.as_mut() {
                    Some(f) => f.clear_slot(*slot)?,
                    None => return Err(no_frame("slot")),
                },

                other if toplevel && other.is_toplevel_only() => {
                    self.eval_toplevel_form(other)?;
                }

                other => {
                    let shared = frame.as_ref().map(|f| &**f);
                    self.eval(other, shared)?;
                }
            }
            i += 1;
        }
    }

    /// Store `value` into an assignment left-hand side: an SSA temporary,
    /// a local slot, a module-qualified global, or a bare symbol resolved
    /// against the context module.
    pub(crate) fn assign(
        &mut self,
        lhs: &Node,
        value: Value,
        frame: &mut Option<&mut Frame<'_>>,
    ) -> Result<(), EvalError> {
        match lhs {
            Node::SsaUse(id) => match frame.as_mut() {
                Some(f) => f.store_ssa(*id, value),
                None => Err(no_frame("SSA value")),
            },
            Node::Slot(n) => match frame.as_mut() {
                Some(f) => f.store_slot(*n, value),
                None => Err(no_frame("slot")),
            },
            Node::GlobalRef(module_id, name) => {
                let Some(module) = self.rt.modules.module(*module_id) else {
                    return Err(malformed_expression("assignment into unknown module"));
                };
                module
                    .binding_or_create(*name)
                    .checked_assign(value, self.rt.name_str(*name))
            }
            Node::Sym(name) => {
                let shared = frame.as_ref().map(|f| &**f);
                let module = self.context_module(shared);
                module
                    .binding_or_create(*name)
                    .checked_assign(value, self.rt.name_str(*name))
            }
            other => Err(malformed_expression(node_form(other))),
        }
    }
}
