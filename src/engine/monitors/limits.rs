use std::cell::Cell;
use std::time::Duration;

use super::SearchMonitor;
use super::NO_PROGRESS;
use crate::basic_types::Stopwatch;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

/// Stops the search once any of the configured caps is hit.
///
/// Limits are checked at decision boundaries and at every failure; a tripped
/// limit asks the active search to finish, which the search loop honours at
/// its next check.
pub struct SearchLimit {
    time: Option<Duration>,
    branches: Option<u64>,
    failures: Option<u64>,
    solutions: Option<u64>,
    stopwatch: Cell<Stopwatch>,
    branches_at_entry: Cell<u64>,
    failures_at_entry: Cell<u64>,
    solutions_at_entry: Cell<u64>,
}

impl SearchLimit {
    pub fn new(
        time: Option<Duration>,
        branches: Option<u64>,
        failures: Option<u64>,
        solutions: Option<u64>,
    ) -> SearchLimit {
        SearchLimit {
            time,
            branches,
            failures,
            solutions,
            stopwatch: Cell::new(Stopwatch::starting_now()),
            branches_at_entry: Cell::new(0),
            failures_at_entry: Cell::new(0),
            solutions_at_entry: Cell::new(0),
        }
    }

    pub fn time_limit(limit: Duration) -> SearchLimit {
        SearchLimit::new(Some(limit), None, None, None)
    }

    pub fn failures_limit(limit: u64) -> SearchLimit {
        SearchLimit::new(None, None, Some(limit), None)
    }

    pub fn solutions_limit(limit: u64) -> SearchLimit {
        SearchLimit::new(None, None, None, Some(limit))
    }

    fn crossed(&self, solver: &Solver) -> bool {
        if let Some(time) = self.time {
            if self.stopwatch.get().elapsed() >= time {
                return true;
            }
        }
        if let Some(branches) = self.branches {
            if solver.branches() - self.branches_at_entry.get() >= branches {
                return true;
            }
        }
        if let Some(failures) = self.failures {
            if solver.fails() - self.failures_at_entry.get() >= failures {
                return true;
            }
        }
        if let Some(solutions) = self.solutions {
            if solver.solutions() - self.solutions_at_entry.get() >= solutions {
                return true;
            }
        }
        false
    }

    fn check(&self, solver: &mut Solver) {
        if self.crossed(solver) {
            solver.finish_current_search();
        }
    }
}

impl SearchMonitor for SearchLimit {
    fn enter_search(&self, solver: &mut Solver) {
        self.stopwatch.set(Stopwatch::starting_now());
        self.branches_at_entry.set(solver.branches());
        self.failures_at_entry.set(solver.fails());
        self.solutions_at_entry.set(solver.solutions());
    }

    fn begin_next_decision(
        &self,
        solver: &mut Solver,
        _builder: &std::rc::Rc<dyn crate::branching::DecisionBuilder>,
    ) {
        self.check(solver);
    }

    fn begin_fail(&self, solver: &mut Solver) {
        self.check(solver);
    }

    fn periodic_check(&self, solver: &mut Solver) {
        self.check(solver);
    }

    fn progress_percent(&self, solver: &mut Solver) -> i32 {
        if let Some(time) = self.time {
            let elapsed = self.stopwatch.get().elapsed().as_millis() as f64;
            let budget = time.as_millis() as f64;
            return ((elapsed / budget) * 100.0).min(100.0) as i32;
        }
        let _ = solver;
        NO_PROGRESS
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_extension(tags::SEARCH_LIMIT_EXTENSION);
        if let Some(time) = self.time {
            visitor.visit_integer_argument(tags::TIME_LIMIT_ARGUMENT, time.as_millis() as i64);
        }
        if let Some(branches) = self.branches {
            visitor.visit_integer_argument(tags::BRANCHES_LIMIT_ARGUMENT, branches as i64);
        }
        if let Some(failures) = self.failures {
            visitor.visit_integer_argument(tags::FAILURES_LIMIT_ARGUMENT, failures as i64);
        }
        if let Some(solutions) = self.solutions {
            visitor.visit_integer_argument(tags::SOLUTION_LIMIT_ARGUMENT, solutions as i64);
        }
        visitor.end_visit_extension(tags::SEARCH_LIMIT_EXTENSION);
    }
}
