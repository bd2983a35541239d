//! Per-search state: the marker stack, the installed monitors and the tree
//! position counters.
//!
//! The solver owns a stack of these: a dummy base search, the top-level
//! search, and one more per open nested solve. All event dispatch lives on
//! the solver because monitors call back into it.

use std::rc::Rc;

use crate::branching::BranchSelector;
use crate::branching::Decision;
use crate::branching::DecisionBuilder;
use crate::engine::monitors::SearchMonitor;
use crate::engine::propagation::Action;
use crate::engine::trail::TrailMark;

/// Magic codes carried by sentinel markers so that unwinding can verify it
/// pops the sentinel it aimed for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SentinelCode {
    /// The base sentinel pushed by the solver constructor.
    SolverCtor = 40_000_000,
    /// Pushed when a (top-level or nested) search opens.
    InitialSearch = 10_000_000,
    /// Pushed after initial propagation succeeds, so in-search backtracking
    /// stops at the root instead of undoing root propagation.
    RootNode = 20_000_000,
}

/// What a marker on the search stack stands for.
pub(crate) enum MarkerKind {
    /// A plain push/pop bracket.
    Simple,
    /// A binary decision point. `right_branch` is false while the decision
    /// still owes its refutation.
    ChoicePoint {
        decision: Rc<dyn Decision>,
        right_branch: bool,
        depth: i32,
        left_depth: i32,
    },
    /// An unwind barrier.
    Sentinel(SentinelCode),
    /// A deferred action run when the marker is popped. When `fast` is set
    /// nothing between the push and the pop can touch the trail, so the
    /// trail snapshot is elided.
    ReversibleAction { action: Rc<dyn Action>, fast: bool },
}

/// A snapshot of all trail sizes together with what the marker stands for.
pub(crate) struct StateMarker {
    pub(crate) kind: MarkerKind,
    pub(crate) mark: TrailMark,
}

impl StateMarker {
    /// Whether popping this marker restores the trail to its snapshot.
    pub(crate) fn restores_trail(&self) -> bool {
        !matches!(self.kind, MarkerKind::ReversibleAction { fast: true, .. })
    }
}

/// One search tree: its markers, monitors and position.
pub(crate) struct Search {
    pub(crate) marker_stack: Vec<StateMarker>,
    pub(crate) monitors: Vec<Rc<dyn SearchMonitor>>,
    pub(crate) solution_counter: u64,
    pub(crate) decision_builder: Option<Rc<dyn DecisionBuilder>>,
    pub(crate) created_by_solve: bool,
    pub(crate) branch_selector: Option<Rc<dyn BranchSelector>>,
    pub(crate) search_depth: i32,
    pub(crate) left_search_depth: i32,
    pub(crate) should_restart: bool,
    pub(crate) should_finish: bool,
    pub(crate) sentinel_pushed: i32,
}

impl Search {
    pub(crate) fn new() -> Search {
        Search {
            marker_stack: Vec::new(),
            monitors: Vec::new(),
            solution_counter: 0,
            decision_builder: None,
            created_by_solve: false,
            branch_selector: None,
            search_depth: 0,
            left_search_depth: 0,
            should_restart: false,
            should_finish: false,
            sentinel_pushed: 0,
        }
    }

    /// The base search at the bottom of the stack; only distinguished by its
    /// depth counters starting at -1.
    pub(crate) fn dummy() -> Search {
        Search {
            search_depth: -1,
            left_search_depth: -1,
            ..Search::new()
        }
    }

    /// Taking the left branch deepens both counters, taking the right branch
    /// only the total depth.
    pub(crate) fn left_move(&mut self) {
        self.search_depth += 1;
        self.left_search_depth += 1;
    }

    pub(crate) fn right_move(&mut self) {
        self.search_depth += 1;
    }

    /// Reset everything that belongs to one search activation.
    pub(crate) fn clear(&mut self) {
        self.monitors.clear();
        self.search_depth = 0;
        self.left_search_depth = 0;
        self.branch_selector = None;
    }
}
