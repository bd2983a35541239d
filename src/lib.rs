//! # Kabocha
//! Kabocha is the core runtime of a finite-domain constraint programming
//! solver: a reversible trail, a prioritised propagation queue, and a
//! monitorable depth-first branch-and-refute search. Constraint libraries,
//! modelling layers and front-ends are clients of this crate; the engine
//! itself stays small and synchronous.
//!
//! The three moving parts:
//! * every state change goes through the **trail**, so failing a branch
//!   rewinds the solver to the last open choice point at memcpy speed;
//! * constraints react to variable events through **demons**, drained to a
//!   fixpoint in strict priority order by the queue;
//! * a **search** walks the tree that a [`branching::DecisionBuilder`]
//!   describes, with [`monitors::SearchMonitor`]s observing (and steering)
//!   every event.
//!
//! # Example
//! ```rust
//! use std::rc::Rc;
//!
//! use kabocha_solver::branching::InDomainMin;
//! use kabocha_solver::branching::InputOrder;
//! use kabocha_solver::branching::InstantiateVariables;
//! use kabocha_solver::constraints::NotEqualWithOffset;
//! use kabocha_solver::Solver;
//!
//! let mut solver = Solver::new("example");
//!
//! // Two variables in [0, 1] which may not be equal.
//! let x = solver.new_int_var(0, 1);
//! let y = solver.new_int_var(0, 1);
//! let _ = solver.add_constraint(Rc::new(NotEqualWithOffset::new(x, y, 0)));
//!
//! let builder = Rc::new(InstantiateVariables::new(
//!     vec![x, y],
//!     InputOrder,
//!     InDomainMin,
//! ));
//!
//! solver.new_search(builder, vec![]);
//! let mut solutions = 0;
//! while solver.next_solution() {
//!     assert_ne!(solver.value(x), solver.value(y));
//!     solutions += 1;
//! }
//! solver.end_search();
//!
//! assert_eq!(solutions, 2);
//! ```
pub mod asserts;
pub mod branching;
pub mod constraints;
pub mod model_visitor;
pub mod statistics;

pub(crate) mod basic_types;
pub(crate) mod containers;
pub(crate) mod engine;
pub(crate) mod options;
pub(crate) mod variable_names;

pub use basic_types::Assignment;
pub use basic_types::ConstraintOperationError;
pub use basic_types::Failure;
pub use basic_types::PropagationStatus;
pub use basic_types::Random;
pub use basic_types::Stopwatch;
pub use containers::HashMap;
pub use containers::HashSet;
pub use containers::KeyedVec;
pub use containers::StorageKey;
pub use engine::Solver;
pub use engine::SolverState;
pub use options::ProfileLevel;
pub use options::SolverOptions;
pub use options::TraceLevel;
pub use options::TrailCompression;
pub use variable_names::PropagationObject;

/// The reactive interfaces constraints are built from.
pub mod propagation {
    pub use crate::engine::propagation::Action;
    pub use crate::engine::propagation::ClosureAction;
    pub use crate::engine::propagation::ClosureDemon;
    pub use crate::engine::propagation::Constraint;
    pub use crate::engine::propagation::Demon;
    pub use crate::engine::propagation::DemonId;
    pub use crate::engine::propagation::DemonPriority;
}

/// Search observers.
pub mod monitors {
    pub use crate::engine::monitors::PropagationMonitor;
    pub use crate::engine::monitors::SearchLimit;
    pub use crate::engine::monitors::SearchMonitor;
    pub use crate::engine::monitors::SolutionCollector;
    pub use crate::engine::monitors::NO_PROGRESS;
}

/// Integer variables and their events.
pub mod variables {
    pub use crate::engine::variables::IntVar;
    pub use crate::engine::variables::VarEvent;
}

/// Reversible-value keys for client data structures.
pub mod state {
    pub use crate::engine::state::RevBool;
    pub use crate::engine::state::RevInt;
    pub use crate::engine::state::RevInt64;
    pub use crate::engine::state::RevPtr;
    pub use crate::engine::state::RevU64;
}
