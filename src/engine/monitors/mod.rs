//! Search observers.
//!
//! A [`SearchMonitor`] receives every event of a search and may intervene:
//! veto a solution, ask for more solutions, request that the search finishes
//! or restarts. A [`PropagationMonitor`] additionally receives every domain
//! mutation and demon run; the solver fans those events out to all
//! registered propagation monitors.

mod demon_profiler;
mod limits;
mod print_trace;
mod solution_collector;
mod trace;

use std::rc::Rc;

pub use limits::SearchLimit;
pub use solution_collector::SolutionCollector;

pub(crate) use demon_profiler::DemonProfiler;
pub(crate) use print_trace::PrintTrace;
pub(crate) use trace::TraceFanout;

use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::propagation::Constraint;
use crate::engine::propagation::DemonId;
use crate::engine::variables::IntVar;
use crate::engine::Solver;
use crate::model_visitor::ModelVisitor;

/// Returned by [`SearchMonitor::progress_percent`] when the monitor cannot
/// estimate progress.
pub const NO_PROGRESS: i32 = -1;

/// An observer of search events. Every hook has a default implementation so
/// monitors only override what they react to.
///
/// Monitors run with the solver borrowed mutably and may call back into it,
/// including [`Solver::finish_current_search`] and
/// [`Solver::restart_current_search`]; those requests are honoured by the
/// search loop at its next failure check.
#[allow(unused_variables)]
pub trait SearchMonitor {
    /// The search is about to start.
    fn enter_search(&self, solver: &mut Solver) {}

    /// The search restarted from its root.
    fn restart_search(&self, solver: &mut Solver) {}

    /// The search is being torn down.
    fn exit_search(&self, solver: &mut Solver) {}

    fn begin_next_decision(&self, solver: &mut Solver, builder: &Rc<dyn DecisionBuilder>) {}

    fn end_next_decision(
        &self,
        solver: &mut Solver,
        builder: &Rc<dyn DecisionBuilder>,
        decision: Option<&Rc<dyn Decision>>,
    ) {
    }

    /// The left branch of `decision` is about to be taken.
    fn apply_decision(&self, solver: &mut Solver, decision: &Rc<dyn Decision>) {}

    /// The right branch of `decision` is about to be taken.
    fn refute_decision(&self, solver: &mut Solver, decision: &Rc<dyn Decision>) {}

    /// A branch of `decision` has been taken; `apply` tells which.
    fn after_decision(&self, solver: &mut Solver, decision: &Rc<dyn Decision>, apply: bool) {}

    /// Propagation failed somewhere below this node.
    fn begin_fail(&self, solver: &mut Solver) {}

    /// The engine finished unwinding to the next open right branch.
    fn end_fail(&self, solver: &mut Solver) {}

    fn begin_initial_propagation(&self, solver: &mut Solver) {}

    fn end_initial_propagation(&self, solver: &mut Solver) {}

    /// Whether this monitor accepts the solution at the current leaf. All
    /// monitors are queried even after one rejects.
    fn accept_solution(&self, solver: &mut Solver) -> bool {
        true
    }

    /// Called on an accepted solution; returning true asks the search to
    /// continue looking for further solutions.
    fn at_solution(&self, solver: &mut Solver) -> bool {
        false
    }

    /// The search tree is exhausted.
    fn no_more_solutions(&self, solver: &mut Solver) {}

    /// Local search reached a local optimum; returning true continues.
    fn local_optimum(&self, solver: &mut Solver) -> bool {
        false
    }

    /// Whether local search may take the candidate neighbour.
    fn accept_delta(&self, solver: &mut Solver) -> bool {
        true
    }

    /// Local search committed a neighbour.
    fn accept_neighbor(&self, solver: &mut Solver) {}

    /// Periodic housekeeping, driven by the top-level search.
    fn periodic_check(&self, solver: &mut Solver) {}

    /// Estimated progress in percent, or [`NO_PROGRESS`]; the caller keeps
    /// the maximum over all monitors.
    fn progress_percent(&self, solver: &mut Solver) -> i32 {
        NO_PROGRESS
    }

    /// Model introspection.
    fn accept(&self, visitor: &mut dyn ModelVisitor) {}
}

/// An observer of propagation events, in addition to the search events of
/// [`SearchMonitor`]. Registered with
/// [`Solver::add_propagation_monitor`].
#[allow(unused_variables)]
pub trait PropagationMonitor: SearchMonitor {
    fn begin_constraint_initial_propagation(
        &self,
        solver: &mut Solver,
        constraint: &Rc<dyn Constraint>,
    ) {
    }

    fn end_constraint_initial_propagation(
        &self,
        solver: &mut Solver,
        constraint: &Rc<dyn Constraint>,
    ) {
    }

    fn begin_nested_constraint_initial_propagation(
        &self,
        solver: &mut Solver,
        parent: &Rc<dyn Constraint>,
        nested: &Rc<dyn Constraint>,
    ) {
    }

    fn end_nested_constraint_initial_propagation(
        &self,
        solver: &mut Solver,
        parent: &Rc<dyn Constraint>,
        nested: &Rc<dyn Constraint>,
    ) {
    }

    fn register_demon(&self, solver: &mut Solver, demon: DemonId) {}

    fn begin_demon_run(&self, solver: &mut Solver, demon: DemonId) {}

    fn end_demon_run(&self, solver: &mut Solver, demon: DemonId) {}

    fn push_context(&self, solver: &mut Solver, context: &str) {}

    fn pop_context(&self, solver: &mut Solver) {}

    fn set_min(&self, solver: &mut Solver, var: IntVar, new_min: i64) {}

    fn set_max(&self, solver: &mut Solver, var: IntVar, new_max: i64) {}

    fn set_range(&self, solver: &mut Solver, var: IntVar, new_min: i64, new_max: i64) {}

    fn set_value(&self, solver: &mut Solver, var: IntVar, value: i64) {}

    fn set_values(&self, solver: &mut Solver, var: IntVar, values: &[i64]) {}

    fn remove_value(&self, solver: &mut Solver, var: IntVar, value: i64) {}

    fn remove_values(&self, solver: &mut Solver, var: IntVar, values: &[i64]) {}

    fn remove_interval(
        &self,
        solver: &mut Solver,
        var: IntVar,
        interval_min: i64,
        interval_max: i64,
    ) {
    }
}
