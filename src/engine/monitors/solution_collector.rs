use std::cell::RefCell;

use super::SearchMonitor;
use crate::basic_types::Assignment;
use crate::engine::variables::IntVar;
use crate::engine::Solver;

/// Snapshots the watched variables at every accepted solution.
pub struct SolutionCollector {
    vars: Vec<IntVar>,
    solutions: RefCell<Vec<Assignment>>,
}

impl SolutionCollector {
    pub fn new(vars: Vec<IntVar>) -> SolutionCollector {
        SolutionCollector {
            vars,
            solutions: RefCell::new(Vec::new()),
        }
    }

    pub fn solution_count(&self) -> usize {
        self.solutions.borrow().len()
    }

    pub fn solution(&self, index: usize) -> Assignment {
        self.solutions.borrow()[index].clone()
    }

    pub fn solutions(&self) -> Vec<Assignment> {
        self.solutions.borrow().clone()
    }
}

impl SearchMonitor for SolutionCollector {
    fn enter_search(&self, _solver: &mut Solver) {
        self.solutions.borrow_mut().clear();
    }

    fn at_solution(&self, solver: &mut Solver) -> bool {
        let mut assignment = Assignment::new();
        for &var in &self.vars {
            assignment.set_value(var, solver.value(var));
        }
        self.solutions.borrow_mut().push(assignment);
        // Ask for the next solution so that `solve` enumerates the tree.
        true
    }
}
