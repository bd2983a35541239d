#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::Cell;
use std::rc::Rc;

use kabocha_solver::branching::InDomainMin;
use kabocha_solver::branching::InputOrder;
use kabocha_solver::branching::InstantiateVariables;
use kabocha_solver::constraints::EqualsConstant;
use kabocha_solver::constraints::GreaterOrEqualConstant;
use kabocha_solver::monitors::SearchMonitor;
use kabocha_solver::Solver;
use kabocha_solver::SolverState;

#[test]
fn single_variable_model_enumerates_both_solutions() {
    let mut solver = Solver::new("single variable");
    let x = solver.new_int_var(1, 3);
    let _ = solver.add_constraint(Rc::new(GreaterOrEqualConstant::new(x, 2)));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![]);

    assert!(solver.next_solution());
    assert_eq!(solver.value(x), 2);
    assert_eq!(solver.state(), SolverState::AtSolution);

    assert!(solver.next_solution());
    assert_eq!(solver.value(x), 3);

    assert!(!solver.next_solution());
    assert_eq!(solver.state(), SolverState::NoMoreSolutions);

    // One decision at depth one, branched left (x = 2) and then right
    // (x != 2, which binds x to 3 without a further decision). Driving the
    // enumeration through next_solution never fails: both leaves are
    // accepted and exhaustion unwinds without a failure.
    assert_eq!(solver.branches(), 2);
    assert_eq!(solver.fails(), 0);
    assert_eq!(solver.solutions(), 2);
    assert_eq!(solver.decisions(), 1);

    solver.end_search();
    assert_eq!(solver.state(), SolverState::OutsideSearch);
    // The search is fully unwound: the domain is whole again.
    assert_eq!(solver.lower_bound(x), 1);
    assert_eq!(solver.upper_bound(x), 3);
}

#[test]
fn contradictory_equalities_are_infeasible_at_the_root() {
    let mut solver = Solver::new("root infeasible");
    let x = solver.new_int_var(0, 10);
    let _ = solver.add_constraint(Rc::new(EqualsConstant::new(x, 1)));
    let _ = solver.add_constraint(Rc::new(EqualsConstant::new(x, 2)));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![]);

    assert!(!solver.next_solution());
    assert_eq!(solver.state(), SolverState::ProblemInfeasible);
    assert_eq!(solver.branches(), 0);
    assert_eq!(solver.solutions(), 0);

    solver.end_search();
}

#[test]
fn solve_reports_whether_a_solution_was_found() {
    let mut solver = Solver::new("solve");
    let x = solver.new_int_var(1, 3);
    let _ = solver.add_constraint(Rc::new(GreaterOrEqualConstant::new(x, 2)));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    assert!(solver.solve(builder, vec![]));
    assert_eq!(solver.state(), SolverState::OutsideSearch);
}

#[test]
fn check_constraint_probes_without_disturbing_the_model() {
    let mut solver = Solver::new("check constraint");
    let x = solver.new_int_var(1, 3);
    let _ = solver.add_constraint(Rc::new(GreaterOrEqualConstant::new(x, 2)));

    assert!(solver.check_constraint(Rc::new(EqualsConstant::new(x, 3))));
    assert!(!solver.check_constraint(Rc::new(EqualsConstant::new(x, 1))));

    // The probe left no trace on the domain.
    assert_eq!(solver.lower_bound(x), 1);
    assert_eq!(solver.upper_bound(x), 3);
}

#[test]
fn check_assignment_validates_against_the_constraints() {
    let mut solver = Solver::new("check assignment");
    let x = solver.new_int_var(1, 3);
    let y = solver.new_int_var(1, 3);
    let _ = solver.add_constraint(Rc::new(GreaterOrEqualConstant::new(x, 2)));

    let mut good = kabocha_solver::Assignment::new();
    good.set_value(x, 2);
    good.set_value(y, 1);
    assert!(solver.check_assignment(&good));
    assert_eq!(solver.state(), SolverState::OutsideSearch);

    let mut bad = kabocha_solver::Assignment::new();
    bad.set_value(x, 1);
    assert!(!solver.check_assignment(&bad));
    assert_eq!(solver.state(), SolverState::ProblemInfeasible);
}

/// Requests a restart at the first decision of the search, then lets the
/// search run to completion.
struct RestartOnce {
    restarted: Cell<bool>,
    restarts_seen: Cell<u64>,
}

impl RestartOnce {
    fn new() -> RestartOnce {
        RestartOnce {
            restarted: Cell::new(false),
            restarts_seen: Cell::new(0),
        }
    }
}

impl SearchMonitor for RestartOnce {
    fn begin_next_decision(
        &self,
        solver: &mut Solver,
        _builder: &Rc<dyn kabocha_solver::branching::DecisionBuilder>,
    ) {
        if !self.restarted.get() {
            self.restarted.set(true);
            solver.restart_current_search();
        }
    }

    fn restart_search(&self, _solver: &mut Solver) {
        self.restarts_seen.set(self.restarts_seen.get() + 1);
    }
}

#[test]
fn a_restart_re_enters_the_root_exactly_once() {
    let mut solver = Solver::new("restart");
    let x = solver.new_int_var(1, 3);
    let _ = solver.add_constraint(Rc::new(GreaterOrEqualConstant::new(x, 2)));

    let monitor = Rc::new(RestartOnce::new());
    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![Rc::clone(&monitor) as Rc<dyn SearchMonitor>]);

    assert!(solver.next_solution());
    assert_eq!(monitor.restarts_seen.get(), 1);
    assert_eq!(solver.restarts(), 1);
    // The restart did not lose the first solution.
    assert_eq!(solver.value(x), 2);

    solver.end_search();
    // No trail leak: the domain is restored to its original state.
    assert_eq!(solver.lower_bound(x), 1);
    assert_eq!(solver.upper_bound(x), 3);
}

#[test]
fn finishing_a_search_from_a_monitor_stops_it() {
    struct FinishImmediately;

    impl SearchMonitor for FinishImmediately {
        fn begin_next_decision(
            &self,
            solver: &mut Solver,
            _builder: &Rc<dyn kabocha_solver::branching::DecisionBuilder>,
        ) {
            solver.finish_current_search();
        }
    }

    let mut solver = Solver::new("finish");
    let x = solver.new_int_var(1, 3);

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![Rc::new(FinishImmediately)]);

    assert!(!solver.next_solution());
    assert_eq!(solver.state(), SolverState::NoMoreSolutions);
    assert_eq!(solver.solutions(), 0);

    solver.end_search();
}
