use thiserror::Error;

#[cfg(doc)]
use crate::Solver;

/// Errors related to adding constraints to the [`Solver`].
#[derive(Error, Debug, Copy, Clone)]
pub enum ConstraintOperationError {
    /// The constraint was rejected because the model is already known to be
    /// infeasible at the root.
    #[error("Adding the constraint failed because the model is infeasible at the root")]
    InfeasibleAtRoot,
    /// The constraint was added during search and its initial propagation
    /// failed; the failure has been handed to the running search.
    #[error("Posting the constraint failed during search")]
    FailedDuringSearch,
}
