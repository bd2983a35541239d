use std::rc::Rc;

use crate::basic_types::Failure;
use crate::engine::propagation::Action;
use crate::engine::Solver;

use super::Decision;
use super::DecisionBuilder;

/// How the active search rewrites a decision before branching on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DecisionModification {
    /// Branch left, keep a right branch open.
    #[default]
    NoChange,
    /// Wrap the decision so apply and refute swap.
    SwitchBranches,
    /// Commit the left branch without opening a right branch.
    KeepLeft,
    /// Commit the right branch without opening a left branch.
    KeepRight,
    /// Fail immediately.
    KillBoth,
}

/// Maps each decision the builder produces to a [`DecisionModification`];
/// installed on the active search via
/// [`Solver::make_apply_branch_selector`].
pub trait BranchSelector {
    fn select(&self, solver: &mut Solver, decision: &Rc<dyn Decision>) -> DecisionModification;
}

/// A [`BranchSelector`] defined by a closure.
pub struct ClosureBranchSelector<F> {
    function: F,
}

impl<F: Fn(&mut Solver, &Rc<dyn Decision>) -> DecisionModification> ClosureBranchSelector<F> {
    pub fn new(function: F) -> ClosureBranchSelector<F> {
        ClosureBranchSelector { function }
    }
}

impl<F: Fn(&mut Solver, &Rc<dyn Decision>) -> DecisionModification> BranchSelector
    for ClosureBranchSelector<F>
{
    fn select(&self, solver: &mut Solver, decision: &Rc<dyn Decision>) -> DecisionModification {
        (self.function)(solver, decision)
    }
}

/// Installs a branch selector on the active search, then stops. The
/// installation registers a backtrack action that removes the selector again
/// when the search unwinds out of the installing solve level.
pub(crate) struct ApplyBranchSelector {
    selector: Rc<dyn BranchSelector>,
}

impl ApplyBranchSelector {
    pub(crate) fn new(selector: Rc<dyn BranchSelector>) -> ApplyBranchSelector {
        ApplyBranchSelector { selector }
    }
}

impl DecisionBuilder for ApplyBranchSelector {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        solver.set_branch_selector(Rc::clone(&self.selector));
        Ok(None)
    }

    fn debug_string(&self) -> String {
        "Apply(BranchSelector)".to_owned()
    }
}

/// Clears the branch selector when the search unwinds back to the solve
/// level it was installed at. Guarded by the depth because nested searches
/// are destroyed on backtrack, so the selector cannot be trailed directly.
pub(crate) struct UndoBranchSelector {
    solve_depth: usize,
}

impl UndoBranchSelector {
    pub(crate) fn new(solve_depth: usize) -> UndoBranchSelector {
        UndoBranchSelector { solve_depth }
    }
}

impl Action for UndoBranchSelector {
    fn run(&self, solver: &mut Solver) {
        if solver.solve_depth() == self.solve_depth {
            solver.clear_branch_selector();
        }
    }

    fn debug_string(&self) -> String {
        format!("UndoBranchSelector({})", self.solve_depth)
    }
}
