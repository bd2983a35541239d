use std::rc::Rc;

use log::debug;

use super::PropagationMonitor;
use super::SearchMonitor;
use crate::branching::Decision;
use crate::engine::propagation::Constraint;
use crate::engine::propagation::DemonId;
use crate::engine::variables::IntVar;
use crate::engine::Solver;

const PREFIX: &str = "######## ";

/// Logs every propagation event at debug level; installed automatically when
/// the trace level is set to normal.
#[derive(Default)]
pub(crate) struct PrintTrace;

impl SearchMonitor for PrintTrace {
    fn apply_decision(&self, _solver: &mut Solver, decision: &Rc<dyn Decision>) {
        debug!("{PREFIX}apply {}", decision.debug_string());
    }

    fn refute_decision(&self, _solver: &mut Solver, decision: &Rc<dyn Decision>) {
        debug!("{PREFIX}refute {}", decision.debug_string());
    }

    fn begin_fail(&self, _solver: &mut Solver) {
        debug!("{PREFIX}fail");
    }
}

impl PropagationMonitor for PrintTrace {
    fn begin_constraint_initial_propagation(
        &self,
        _solver: &mut Solver,
        constraint: &Rc<dyn Constraint>,
    ) {
        debug!(
            "{PREFIX}initial propagation of {}",
            constraint.debug_string()
        );
    }

    fn begin_demon_run(&self, solver: &mut Solver, demon: DemonId) {
        debug!("{PREFIX}run demon {}", solver.demon_debug_string(demon));
    }

    fn push_context(&self, _solver: &mut Solver, context: &str) {
        debug!("{PREFIX}push context {context}");
    }

    fn pop_context(&self, _solver: &mut Solver) {
        debug!("{PREFIX}pop context");
    }

    fn set_min(&self, _solver: &mut Solver, var: IntVar, new_min: i64) {
        debug!("{PREFIX}{var}.set_min({new_min})");
    }

    fn set_max(&self, _solver: &mut Solver, var: IntVar, new_max: i64) {
        debug!("{PREFIX}{var}.set_max({new_max})");
    }

    fn set_range(&self, _solver: &mut Solver, var: IntVar, new_min: i64, new_max: i64) {
        debug!("{PREFIX}{var}.set_range({new_min}, {new_max})");
    }

    fn set_value(&self, _solver: &mut Solver, var: IntVar, value: i64) {
        debug!("{PREFIX}{var}.set_value({value})");
    }

    fn set_values(&self, _solver: &mut Solver, var: IntVar, values: &[i64]) {
        debug!("{PREFIX}{var}.set_values({values:?})");
    }

    fn remove_value(&self, _solver: &mut Solver, var: IntVar, value: i64) {
        debug!("{PREFIX}{var}.remove_value({value})");
    }

    fn remove_values(&self, _solver: &mut Solver, var: IntVar, values: &[i64]) {
        debug!("{PREFIX}{var}.remove_values({values:?})");
    }

    fn remove_interval(
        &self,
        _solver: &mut Solver,
        var: IntVar,
        interval_min: i64,
        interval_max: i64,
    ) {
        debug!("{PREFIX}{var}.remove_interval({interval_min}, {interval_max})");
    }
}
