#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::RefCell;
use std::rc::Rc;

use kabocha_solver::branching::Decision;
use kabocha_solver::branching::DecisionBuilder;
use kabocha_solver::branching::InDomainMin;
use kabocha_solver::branching::InputOrder;
use kabocha_solver::branching::InstantiateVariables;
use kabocha_solver::monitors::SearchMonitor;
use kabocha_solver::Solver;

/// Records every event it receives, with a label to tell monitors apart.
struct Recorder {
    label: &'static str,
    events: Rc<RefCell<Vec<String>>>,
    accept_solutions: bool,
}

impl Recorder {
    fn new(
        label: &'static str,
        events: &Rc<RefCell<Vec<String>>>,
        accept_solutions: bool,
    ) -> Recorder {
        Recorder {
            label,
            events: Rc::clone(events),
            accept_solutions,
        }
    }

    fn record(&self, event: &str) {
        self.events.borrow_mut().push(format!("{}:{event}", self.label));
    }
}

impl SearchMonitor for Recorder {
    fn enter_search(&self, _solver: &mut Solver) {
        self.record("enter_search");
    }

    fn restart_search(&self, _solver: &mut Solver) {
        self.record("restart_search");
    }

    fn exit_search(&self, _solver: &mut Solver) {
        self.record("exit_search");
    }

    fn begin_next_decision(&self, _solver: &mut Solver, _builder: &Rc<dyn DecisionBuilder>) {
        self.record("begin_next_decision");
    }

    fn end_next_decision(
        &self,
        _solver: &mut Solver,
        _builder: &Rc<dyn DecisionBuilder>,
        _decision: Option<&Rc<dyn Decision>>,
    ) {
        self.record("end_next_decision");
    }

    fn apply_decision(&self, _solver: &mut Solver, _decision: &Rc<dyn Decision>) {
        self.record("apply_decision");
    }

    fn refute_decision(&self, _solver: &mut Solver, _decision: &Rc<dyn Decision>) {
        self.record("refute_decision");
    }

    fn after_decision(&self, _solver: &mut Solver, _decision: &Rc<dyn Decision>, _apply: bool) {
        self.record("after_decision");
    }

    fn begin_fail(&self, _solver: &mut Solver) {
        self.record("begin_fail");
    }

    fn end_fail(&self, _solver: &mut Solver) {
        self.record("end_fail");
    }

    fn begin_initial_propagation(&self, _solver: &mut Solver) {
        self.record("begin_initial_propagation");
    }

    fn end_initial_propagation(&self, _solver: &mut Solver) {
        self.record("end_initial_propagation");
    }

    fn accept_solution(&self, _solver: &mut Solver) -> bool {
        self.record("accept_solution");
        self.accept_solutions
    }

    fn at_solution(&self, _solver: &mut Solver) -> bool {
        self.record("at_solution");
        false
    }

    fn no_more_solutions(&self, _solver: &mut Solver) {
        self.record("no_more_solutions");
    }
}

fn events_of<'a>(events: &'a [String], label: &str) -> Vec<&'a str> {
    events
        .iter()
        .filter_map(|event| event.strip_prefix(&format!("{label}:")))
        .collect()
}

#[test]
fn every_monitor_sees_the_lifecycle_in_order() {
    let mut solver = Solver::new("lifecycle");
    let x = solver.new_int_var(0, 0);

    let events = Rc::new(RefCell::new(Vec::new()));
    let first = Rc::new(Recorder::new("first", &events, true));
    let second = Rc::new(Recorder::new("second", &events, true));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![first, second]);
    assert!(solver.next_solution());
    assert!(!solver.next_solution());
    solver.end_search();

    let events = events.borrow();
    for label in ["first", "second"] {
        let seen = events_of(&events, label);
        // One solution at the root: no decision is ever produced, and the
        // second call unwinds straight to the sentinel (end_fail without a
        // begin_fail, as the unwind is not triggered by a propagation
        // failure).
        assert_eq!(
            seen,
            vec![
                "enter_search",
                "begin_initial_propagation",
                "end_initial_propagation",
                "begin_next_decision",
                "end_next_decision",
                "accept_solution",
                "at_solution",
                "end_fail",
                "no_more_solutions",
                "exit_search",
            ],
            "{label} saw a different lifecycle"
        );
    }

    // The dispatch order within one event follows installation order.
    let first_index = events.iter().position(|e| e == "first:enter_search");
    let second_index = events.iter().position(|e| e == "second:enter_search");
    assert!(first_index < second_index);
}

#[test]
fn accept_solution_queries_every_monitor_even_after_a_rejection() {
    let mut solver = Solver::new("accept all");
    let x = solver.new_int_var(0, 0);

    let events = Rc::new(RefCell::new(Vec::new()));
    let rejecting = Rc::new(Recorder::new("rejecting", &events, false));
    let observing = Rc::new(Recorder::new("observing", &events, true));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![rejecting, observing]);

    // The only leaf is vetoed, so the search finds nothing.
    assert!(!solver.next_solution());
    solver.end_search();

    let events = events.borrow();
    // The observer after the rejecting monitor was still queried.
    assert!(events.contains(&"observing:accept_solution".to_owned()));
    // A vetoed leaf is not a solution.
    assert_eq!(solver.solutions(), 0);
    assert!(!events.contains(&"rejecting:at_solution".to_owned()));
}
