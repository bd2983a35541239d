#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::Cell;
use std::rc::Rc;

use kabocha_solver::branching::AssignVariableValue;
use kabocha_solver::branching::ClosureDecisionBuilder;
use kabocha_solver::branching::Decision;
use kabocha_solver::branching::InDomainMin;
use kabocha_solver::branching::InputOrder;
use kabocha_solver::branching::InstantiateVariables;
use kabocha_solver::monitors::SolutionCollector;
use kabocha_solver::propagation::ClosureAction;
use kabocha_solver::Solver;

#[test]
fn a_nested_search_runs_under_each_outer_node() {
    let mut solver = Solver::new("nested");
    let x = solver.new_int_var(0, 1);
    let y = solver.new_int_var(0, 1);

    let nested_leaves = Rc::new(Cell::new(0_u64));

    // Branch on x; once x is fixed, enumerate all values of y in a nested
    // search which must find at least one solution for the node to survive.
    let leaves = Rc::clone(&nested_leaves);
    let outer = Rc::new(ClosureDecisionBuilder::new(move |solver: &mut Solver| {
        if !solver.is_bound(x) {
            let value = solver.lower_bound(x);
            return Ok(Some(
                Rc::new(AssignVariableValue::new(x, value)) as Rc<dyn Decision>
            ));
        }
        let collector = Rc::new(SolutionCollector::new(vec![y]));
        let inner = Rc::new(InstantiateVariables::new(vec![y], InputOrder, InDomainMin));
        let _ = solver.nested_solve(inner, true, vec![Rc::clone(&collector) as _]);
        if collector.solution_count() == 0 {
            return Err(solver.fail());
        }
        leaves.set(leaves.get() + collector.solution_count() as u64);
        // The nested search was restored: y is untouched.
        assert!(!solver.is_bound(y));
        Ok(None)
    }));

    solver.new_search(outer, vec![]);
    let mut outer_solutions = 0;
    while solver.next_solution() {
        outer_solutions += 1;
    }
    solver.end_search();

    assert_eq!(outer_solutions, 2);
    // Two nested leaves per outer node, across two outer nodes.
    assert_eq!(nested_leaves.get(), 4);
}

#[test]
fn nested_search_without_restore_keeps_its_reductions() {
    let mut solver = Solver::new("nested keep");
    let x = solver.new_int_var(0, 1);
    let y = solver.new_int_var(0, 3);

    let outer = Rc::new(ClosureDecisionBuilder::new(move |solver: &mut Solver| {
        if !solver.is_bound(x) {
            let value = solver.lower_bound(x);
            return Ok(Some(
                Rc::new(AssignVariableValue::new(x, value)) as Rc<dyn Decision>
            ));
        }
        if !solver.is_bound(y) {
            let inner = Rc::new(InstantiateVariables::new(vec![y], InputOrder, InDomainMin));
            let found = solver.nested_solve(inner, false, vec![]);
            assert!(found);
            // Without restore the nested assignment survives.
            assert!(solver.is_bound(y));
        }
        Ok(None)
    }));

    solver.new_search(outer, vec![]);
    assert!(solver.next_solution());
    assert_eq!(solver.value(y), 0);
    solver.end_search();

    // Tearing the search down undoes the nested reductions too.
    assert!(!solver.is_bound(y));
}

#[test]
fn deferred_actions_of_a_kept_nested_search_migrate_to_the_parent() {
    let mut solver = Solver::new("nested actions");
    let x = solver.new_int_var(0, 1);

    let undo_ran = Rc::new(Cell::new(false));

    let undo = Rc::clone(&undo_ran);
    let outer = Rc::new(ClosureDecisionBuilder::new(move |solver: &mut Solver| {
        if solver.is_bound(x) {
            return Ok(None);
        }
        let undo_for_inner = Rc::clone(&undo);
        let inner = Rc::new(ClosureDecisionBuilder::new(move |solver: &mut Solver| {
            if solver.is_bound(x) {
                return Ok(None);
            }
            let undo = Rc::clone(&undo_for_inner);
            solver.add_backtrack_action(
                Rc::new(ClosureAction::new(move |_: &mut Solver| {
                    undo.set(true);
                })),
                false,
            );
            let value = solver.lower_bound(x);
            Ok(Some(
                Rc::new(AssignVariableValue::new(x, value)) as Rc<dyn Decision>
            ))
        }));
        // Keep the nested result; the backtrack action now belongs to the
        // parent search.
        let found = solver.nested_solve(inner, false, vec![]);
        assert!(found);
        assert!(!undo.get());
        Ok(None)
    }));

    solver.new_search(outer, vec![]);
    assert!(solver.next_solution());
    assert!(!undo_ran.get());
    solver.end_search();

    // Unwinding the outer search runs the migrated action.
    assert!(undo_ran.get());
}
