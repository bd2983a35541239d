use crate::engine::variables::IntVar;
use crate::engine::Solver;

/// Picks the next variable to branch on from the unbound ones, or `None`
/// when every candidate is assigned.
pub trait VariableSelector {
    fn select(&self, solver: &Solver, candidates: &[IntVar]) -> Option<IntVar>;
}

/// The first unbound variable in the order the candidates were given.
#[derive(Debug, Default)]
pub struct InputOrder;

impl VariableSelector for InputOrder {
    fn select(&self, solver: &Solver, candidates: &[IntVar]) -> Option<IntVar> {
        candidates.iter().copied().find(|&var| !solver.is_bound(var))
    }
}

/// The unbound variable with the smallest domain, ties broken by input
/// order. Small domains first keeps the tree shallow where it is cheapest.
#[derive(Debug, Default)]
pub struct FirstFail;

impl VariableSelector for FirstFail {
    fn select(&self, solver: &Solver, candidates: &[IntVar]) -> Option<IntVar> {
        candidates
            .iter()
            .copied()
            .filter(|&var| !solver.is_bound(var))
            .min_by_key(|&var| solver.domain_size(var))
    }
}
