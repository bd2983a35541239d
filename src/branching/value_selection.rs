use crate::engine::variables::IntVar;
use crate::engine::Solver;

/// Picks the value to try first for a chosen variable.
pub trait ValueSelector {
    fn select(&self, solver: &Solver, var: IntVar) -> i64;
}

/// The smallest value in the domain.
#[derive(Debug, Default)]
pub struct InDomainMin;

impl ValueSelector for InDomainMin {
    fn select(&self, solver: &Solver, var: IntVar) -> i64 {
        solver.lower_bound(var)
    }
}

/// The largest value in the domain.
#[derive(Debug, Default)]
pub struct InDomainMax;

impl ValueSelector for InDomainMax {
    fn select(&self, solver: &Solver, var: IntVar) -> i64 {
        solver.upper_bound(var)
    }
}
