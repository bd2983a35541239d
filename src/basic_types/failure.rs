#[cfg(doc)]
use crate::Solver;

/// The token signalling that propagation discovered an infeasibility.
///
/// A failure is expected control flow in a constraint solver, not an error:
/// every propagation entry point returns [`PropagationStatus`] and bubbles
/// the token to the search loop with `?`, where it triggers backtracking.
/// The token is only ever constructed by [`Solver::fail`], which performs the
/// failure bookkeeping (counters and monitor notification) before returning
/// it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Failure;

/// The result of a propagation step: either the store is still consistent, or
/// the step failed and the search loop must backtrack.
pub type PropagationStatus = Result<(), Failure>;
