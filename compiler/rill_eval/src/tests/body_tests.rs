//! Statement-walker tests: control flow, assignment targets, exception
//! scopes, and unwind discipline.

use std::sync::Arc;

use pretty_assertions::assert_eq;

use rill_ir::errors::EvalErrorKind;
use rill_ir::{Node, SharedInterner, Value};
use rill_runtime::{CountingRootSet, Runtime};

use crate::Interpreter;

use super::{is_zero, method, plus, raiser, runtime, thunk};

#[test]
fn test_call_result_flows_through_ssa_to_return() {
    let rt = runtime();
    let m = method(
        &rt,
        "add2",
        &["a", "b"],
        2,
        1,
        vec![
            Node::Assign(
                Box::new(Node::SsaUse(0)),
                Box::new(Node::Call(vec![
                    Node::konst(plus()),
                    Node::Slot(1),
                    Node::Slot(2),
                ])),
            ),
            Node::Return(Box::new(Node::SsaUse(0))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let result = interp
        .interpret_call(&m, &[Value::int(2), Value::int(3)], None)
        .unwrap();
    assert_eq!(result, Value::int(5));
}

#[test]
fn test_goto_if_not_takes_branch_on_false() {
    let rt = runtime();
    let m = method(
        &rt,
        "pick",
        &["c"],
        1,
        0,
        vec![
            Node::GotoIfNot(Box::new(Node::Slot(1)), 3),
            Node::Return(Box::new(Node::konst(Value::int(1)))),
            Node::Return(Box::new(Node::konst(Value::int(2)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    assert_eq!(
        interp.interpret_call(&m, &[Value::bool(true)], None).unwrap(),
        Value::int(1)
    );
    assert_eq!(
        interp
            .interpret_call(&m, &[Value::bool(false)], None)
            .unwrap(),
        Value::int(2)
    );
}

#[test]
fn test_non_bool_condition_is_a_type_error() {
    let rt = runtime();
    let m = method(
        &rt,
        "pick",
        &["c"],
        1,
        0,
        vec![
            Node::GotoIfNot(Box::new(Node::Slot(1)), 3),
            Node::Return(Box::new(Node::konst(Value::int(1)))),
            Node::Return(Box::new(Node::konst(Value::int(2)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let err = interp.interpret_call(&m, &[Value::int(7)], None).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::ConditionNotBool {
            got: "int".to_owned()
        }
    );
    assert!(err.is_catchable());
}

#[test]
fn test_backward_goto_runs_a_loop() {
    let rt = runtime();
    // acc = 0; while n != 0 { acc += n; n += -1 }; acc
    let m = method(
        &rt,
        "sum_down",
        &["n", "acc"],
        1,
        1,
        vec![
            Node::Assign(Box::new(Node::Slot(2)), Box::new(Node::konst(Value::int(0)))),
            Node::Assign(
                Box::new(Node::SsaUse(0)),
                Box::new(Node::Call(vec![Node::konst(is_zero()), Node::Slot(1)])),
            ),
            Node::GotoIfNot(Box::new(Node::SsaUse(0)), 5),
            Node::Return(Box::new(Node::Slot(2))),
            Node::Assign(
                Box::new(Node::Slot(2)),
                Box::new(Node::Call(vec![
                    Node::konst(plus()),
                    Node::Slot(2),
                    Node::Slot(1),
                ])),
            ),
            Node::Assign(
                Box::new(Node::Slot(1)),
                Box::new(Node::Call(vec![
                    Node::konst(plus()),
                    Node::Slot(1),
                    Node::konst(Value::int(-1)),
                ])),
            ),
            Node::Goto(2),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let result = interp.interpret_call(&m, &[Value::int(3)], None).unwrap();
    assert_eq!(result, Value::int(6));
}

#[test]
fn test_running_off_the_end_is_a_defect() {
    let rt = runtime();
    let t = thunk(
        &rt,
        &["x"],
        0,
        vec![Node::Assign(
            Box::new(Node::Slot(1)),
            Box::new(Node::konst(Value::int(1))),
        )],
    );
    let mut interp = Interpreter::new(&rt);
    let err = interp.interpret_toplevel_thunk(&t).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::MissingReturn);
    assert!(!err.is_catchable());
}

#[test]
fn test_newvar_resets_slot_to_unassigned() {
    let rt = runtime();
    let t = thunk(
        &rt,
        &["x"],
        0,
        vec![
            Node::Assign(Box::new(Node::Slot(1)), Box::new(Node::konst(Value::int(1)))),
            Node::NewVarScope(1),
            Node::Return(Box::new(Node::Slot(1))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let err = interp.interpret_toplevel_thunk(&t).unwrap_err();
    assert_eq!(
        err.kind,
        EvalErrorKind::UndefinedVariable {
            name: "x".to_owned()
        }
    );
}

#[test]
fn test_handler_resumes_at_label_with_exception_in_transit() {
    let rt = runtime();
    let t = thunk(
        &rt,
        &[],
        1,
        vec![
            Node::EnterHandler(4),
            Node::Assign(
                Box::new(Node::SsaUse(0)),
                Box::new(Node::Call(vec![
                    Node::konst(raiser()),
                    Node::konst(Value::int(42)),
                ])),
            ),
            Node::Return(Box::new(Node::konst(Value::int(0)))),
            Node::Return(Box::new(Node::CurrentException)),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let result = interp.interpret_toplevel_thunk(&t).unwrap();
    assert_eq!(result, Value::int(42));
}

#[test]
fn test_handler_scope_popped_on_normal_return() {
    let rt = runtime();
    // Returns out of the protected region without a leave; the scope must
    // not survive the call.
    let t = thunk(
        &rt,
        &[],
        0,
        vec![
            Node::EnterHandler(3),
            Node::Return(Box::new(Node::konst(Value::int(1)))),
            Node::Return(Box::new(Node::konst(Value::int(2)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    assert_eq!(interp.interpret_toplevel_thunk(&t).unwrap(), Value::int(1));
    assert!(interp.handlers.is_empty());
}

#[test]
fn test_raise_after_leave_propagates_to_caller() {
    let rt = runtime();
    let t = thunk(
        &rt,
        &[],
        0,
        vec![
            Node::EnterHandler(4),
            Node::LeaveHandler(1),
            Node::Return(Box::new(Node::Call(vec![
                Node::konst(raiser()),
                Node::konst(Value::int(7)),
            ]))),
            Node::Return(Box::new(Node::konst(Value::int(99)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let err = interp.interpret_toplevel_thunk(&t).unwrap_err();
    assert_eq!(err.kind, EvalErrorKind::Raised(Value::int(7)));
}

#[test]
fn test_innermost_handler_catches_first() {
    let rt = runtime();
    let t = thunk(
        &rt,
        &[],
        1,
        vec![
            Node::EnterHandler(6),
            Node::EnterHandler(5),
            Node::Assign(
                Box::new(Node::SsaUse(0)),
                Box::new(Node::Call(vec![
                    Node::konst(raiser()),
                    Node::konst(Value::int(1)),
                ])),
            ),
            Node::Return(Box::new(Node::konst(Value::int(0)))),
            Node::Return(Box::new(Node::konst(Value::int(10)))),
            Node::Return(Box::new(Node::konst(Value::int(20)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    assert_eq!(interp.interpret_toplevel_thunk(&t).unwrap(), Value::int(10));
}

#[test]
fn test_defects_pass_through_handler_scopes() {
    let rt = runtime();
    // Slot 5 does not exist: malformed IR, never caught.
    let t = thunk(
        &rt,
        &[],
        0,
        vec![
            Node::EnterHandler(3),
            Node::Return(Box::new(Node::Slot(5))),
            Node::Return(Box::new(Node::konst(Value::int(0)))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    let err = interp.interpret_toplevel_thunk(&t).unwrap_err();
    assert!(!err.is_catchable());
}

#[test]
fn test_symbol_assignment_writes_the_context_module() {
    let rt = runtime();
    let x = rt.interner.intern("x");
    let t = thunk(
        &rt,
        &[],
        0,
        vec![
            Node::Assign(Box::new(Node::Sym(x)), Box::new(Node::konst(Value::int(9)))),
            Node::Return(Box::new(Node::Sym(x))),
        ],
    );
    let mut interp = Interpreter::new(&rt);
    assert_eq!(interp.interpret_toplevel_thunk(&t).unwrap(), Value::int(9));
    assert_eq!(rt.modules.root().global(x), Some(Value::int(9)));
}

#[test]
fn test_line_markers_tracked_at_toplevel_only() {
    let rt = runtime();
    let code = vec![
        Node::Line(12),
        Node::Return(Box::new(Node::konst(Value::Nothing))),
    ];
    let mut interp = Interpreter::new(&rt);
    interp.interpret_toplevel_thunk(&thunk(&rt, &[], 0, code.clone())).unwrap();
    assert_eq!(interp.current_line(), 12);

    // The same marker inside a method body leaves line tracking alone.
    let m = method(&rt, "f", &["a"], 1, 0, code);
    let mut interp = Interpreter::new(&rt);
    interp.interpret_call(&m, &[Value::Nothing], None).unwrap();
    assert_eq!(interp.current_line(), 0);
}

#[test]
fn test_roots_balanced_after_unwind() {
    let counting = Arc::new(CountingRootSet::new());
    let rt = Runtime::with_roots(SharedInterner::new(), counting.clone());
    let t = thunk(
        &rt,
        &["x"],
        0,
        vec![Node::Return(Box::new(Node::Call(vec![
            Node::konst(raiser()),
            Node::konst(Value::int(1)),
        ])))],
    );
    let mut interp = Interpreter::new(&rt);
    assert!(interp.interpret_toplevel_thunk(&t).is_err());
    assert!(counting.pushes() > 0);
    assert!(counting.is_balanced());
}
