#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::RefCell;
use std::rc::Rc;

use kabocha_solver::propagation::ClosureAction;
use kabocha_solver::Solver;

#[test]
fn scalar_saves_are_undone_by_pop_state() {
    let mut solver = Solver::new("scalars");
    let counter = solver.new_rev_int64(10);
    let flag = solver.new_rev_bool(false);

    solver.push_state();
    solver.save_and_set_int64(counter, 42);
    solver.save_and_set_bool(flag, true);
    assert_eq!(solver.rev_int64(counter), 42);
    assert!(solver.rev_bool(flag));
    solver.pop_state();

    assert_eq!(solver.rev_int64(counter), 10);
    assert!(!solver.rev_bool(flag));
}

#[test]
fn repeated_saves_restore_the_outermost_value() {
    let mut solver = Solver::new("repeated saves");
    let cell = solver.new_rev_int(1);

    solver.push_state();
    for value in 2..20 {
        solver.save_and_set_int(cell, value);
    }
    solver.pop_state();

    assert_eq!(solver.rev_int(cell), 1);
}

#[test]
fn nested_states_unwind_in_lifo_order() {
    let mut solver = Solver::new("nested states");
    let cell = solver.new_rev_u64(0);

    solver.push_state();
    solver.save_and_set_u64(cell, 1);
    solver.push_state();
    solver.save_and_set_u64(cell, 2);

    solver.pop_state();
    assert_eq!(solver.rev_u64(cell), 1);
    solver.pop_state();
    assert_eq!(solver.rev_u64(cell), 0);
}

#[test]
fn rev_alloc_objects_are_released_on_undo() {
    let mut solver = Solver::new("rev alloc");

    solver.push_state();
    let object = solver.rev_alloc(String::from("scratch"));
    let weak = Rc::downgrade(&object);
    drop(object);
    // The trail still pins the allocation.
    assert!(weak.upgrade().is_some());
    solver.pop_state();

    assert!(weak.upgrade().is_none());
}

#[test]
fn backtrack_actions_run_in_reverse_registration_order() {
    use kabocha_solver::branching::ClosureDecisionBuilder;

    let mut solver = Solver::new("backtrack actions");
    let order = Rc::new(RefCell::new(Vec::new()));

    // The builder registers three undo actions, then fails; the backtrack
    // pops the action markers in LIFO order.
    let registered = Rc::clone(&order);
    let builder = Rc::new(ClosureDecisionBuilder::new(move |solver: &mut Solver| {
        for label in ["first", "second", "third"] {
            let order = Rc::clone(&registered);
            solver.add_backtrack_action(
                Rc::new(ClosureAction::new(move |_: &mut Solver| {
                    order.borrow_mut().push(label);
                })),
                false,
            );
        }
        Err(solver.fail())
    }));

    assert!(!solver.solve(builder, vec![]));
    assert_eq!(*order.borrow(), vec!["third", "second", "first"]);
}
