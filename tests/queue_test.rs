#![cfg(test)] // workaround for https://github.com/rust-lang/rust-clippy/issues/11024

use std::cell::Cell;
use std::cell::RefCell;
use std::rc::Rc;

use kabocha_solver::branching::InDomainMin;
use kabocha_solver::branching::InputOrder;
use kabocha_solver::branching::InstantiateVariables;
use kabocha_solver::constraints::FalseConstraint;
use kabocha_solver::propagation::ClosureAction;
use kabocha_solver::propagation::ClosureDemon;
use kabocha_solver::propagation::DemonPriority;
use kabocha_solver::Solver;
use kabocha_solver::SolverState;

type RunLog = Rc<RefCell<Vec<&'static str>>>;

fn logging_demon(log: &RunLog, label: &'static str, priority: DemonPriority) -> Rc<dyn kabocha_solver::propagation::Demon> {
    let log = Rc::clone(log);
    Rc::new(ClosureDemon::with_priority(
        move |_: &mut Solver| {
            log.borrow_mut().push(label);
            Ok(())
        },
        priority,
    ))
}

#[test]
fn demons_run_in_strict_priority_order() {
    let mut solver = Solver::new("priorities");
    let log: RunLog = Rc::new(RefCell::new(Vec::new()));

    let delayed = solver.register_demon(logging_demon(&log, "delayed", DemonPriority::Delayed));
    let var = solver.register_demon(logging_demon(&log, "var", DemonPriority::Var));
    let normal = solver.register_demon(logging_demon(&log, "normal", DemonPriority::Normal));

    solver.freeze_queue();
    solver.enqueue_demon(delayed).unwrap();
    solver.enqueue_demon(var).unwrap();
    solver.enqueue_demon(normal).unwrap();
    solver.unfreeze_queue().unwrap();

    assert_eq!(*log.borrow(), vec!["normal", "var", "delayed"]);
}

#[test]
fn a_delayed_demon_yields_to_the_normal_work_it_wakes() {
    let mut solver = Solver::new("delayed yields");
    let log: RunLog = Rc::new(RefCell::new(Vec::new()));

    let normal = solver.register_demon(logging_demon(&log, "normal", DemonPriority::Normal));

    let waker_log = Rc::clone(&log);
    let waker = Rc::new(ClosureDemon::with_priority(
        move |solver: &mut Solver| {
            waker_log.borrow_mut().push("delayed-waker");
            solver.enqueue_demon(normal)
        },
        DemonPriority::Delayed,
    ));
    let waker = solver.register_demon(waker);
    let second_delayed =
        solver.register_demon(logging_demon(&log, "delayed-second", DemonPriority::Delayed));

    solver.freeze_queue();
    solver.enqueue_demon(waker).unwrap();
    solver.enqueue_demon(second_delayed).unwrap();
    solver.unfreeze_queue().unwrap();

    // The woken NORMAL demon runs before the second DELAYED demon.
    assert_eq!(
        *log.borrow(),
        vec!["delayed-waker", "normal", "delayed-second"]
    );
}

#[test]
fn a_demon_is_enqueued_at_most_once_per_cycle() {
    let mut solver = Solver::new("idempotent enqueue");
    let log: RunLog = Rc::new(RefCell::new(Vec::new()));

    let demon = solver.register_demon(logging_demon(&log, "ran", DemonPriority::Normal));

    solver.freeze_queue();
    solver.enqueue_demon(demon).unwrap();
    solver.enqueue_demon(demon).unwrap();
    solver.enqueue_demon(demon).unwrap();
    solver.unfreeze_queue().unwrap();

    assert_eq!(log.borrow().len(), 1);

    // The next freeze bumps the stamp and re-opens the enqueue window.
    solver.freeze_queue();
    solver.enqueue_demon(demon).unwrap();
    solver.unfreeze_queue().unwrap();

    assert_eq!(log.borrow().len(), 2);
}

#[test]
fn an_inhibited_demon_is_not_dispatched_until_desinhibited() {
    let mut solver = Solver::new("inhibit");
    let log: RunLog = Rc::new(RefCell::new(Vec::new()));

    let demon = solver.register_demon(logging_demon(&log, "ran", DemonPriority::Normal));
    solver.inhibit_demon(demon);

    solver.freeze_queue();
    solver.enqueue_demon(demon).unwrap();
    solver.unfreeze_queue().unwrap();
    assert!(log.borrow().is_empty());

    solver.desinhibit_demon(demon);
    solver.freeze_queue();
    solver.enqueue_demon(demon).unwrap();
    solver.unfreeze_queue().unwrap();
    assert_eq!(log.borrow().len(), 1);
}

#[test]
fn the_on_failure_action_runs_exactly_once() {
    let mut solver = Solver::new("on failure");
    let x = solver.new_int_var(0, 1);
    let _ = solver.add_constraint(Rc::new(FalseConstraint::new("always fails")));

    let runs = Rc::new(Cell::new(0_u64));
    let counter = Rc::clone(&runs);
    solver.set_queue_action_on_fail(Rc::new(ClosureAction::new(move |_: &mut Solver| {
        counter.set(counter.get() + 1);
    })));

    let builder = Rc::new(InstantiateVariables::new(vec![x], InputOrder, InDomainMin));
    solver.new_search(builder, vec![]);
    assert!(!solver.next_solution());
    assert_eq!(solver.state(), SolverState::ProblemInfeasible);
    solver.end_search();

    // The action was consumed by the first failure; no re-registration, no
    // second run.
    assert_eq!(runs.get(), 1);
}

#[test]
fn demon_run_counters_are_kept_per_priority() {
    let mut solver = Solver::new("counters");
    let log: RunLog = Rc::new(RefCell::new(Vec::new()));

    let normal = solver.register_demon(logging_demon(&log, "normal", DemonPriority::Normal));
    let delayed = solver.register_demon(logging_demon(&log, "delayed", DemonPriority::Delayed));

    solver.freeze_queue();
    solver.enqueue_demon(normal).unwrap();
    solver.enqueue_demon(delayed).unwrap();
    solver.unfreeze_queue().unwrap();

    assert_eq!(solver.demon_runs(DemonPriority::Normal), 1);
    assert_eq!(solver.demon_runs(DemonPriority::Var), 0);
    assert_eq!(solver.demon_runs(DemonPriority::Delayed), 1);
}
