use crate::basic_types::PropagationStatus;
use crate::containers::StorageKey;
use crate::engine::state::RevU64;
use crate::engine::Solver;

/// The priority at which a demon is dispatched.
///
/// The queue drains NORMAL demons before VAR demons and VAR demons before
/// DELAYED demons; DELAYED demons run one at a time so that higher-priority
/// work they generate is picked up first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DemonPriority {
    Delayed = 0,
    Var = 1,
    Normal = 2,
}

pub(crate) const NUM_PRIORITIES: usize = 3;

impl DemonPriority {
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// A reactive callback attached to variable events; it re-runs (part of) a
/// constraint's propagation when the variable changes.
///
/// Demons are registered once with [`Solver::register_demon`] and then
/// attached to the events that should wake them. A demon is enqueued at most
/// once per propagation cycle: the queue stamps the demon on enqueue and
/// rejects re-enqueues until the stamp moves on.
pub trait Demon {
    fn run(&self, solver: &mut Solver) -> PropagationStatus;

    fn priority(&self) -> DemonPriority {
        DemonPriority::Normal
    }

    fn debug_string(&self) -> String {
        "Demon".to_owned()
    }
}

/// The key of a registered demon.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DemonId {
    id: u32,
}

impl StorageKey for DemonId {
    fn index(&self) -> usize {
        self.id as usize
    }

    fn create_from_index(index: usize) -> Self {
        DemonId { id: index as u32 }
    }
}

/// Solver-side bookkeeping of a registered demon.
pub(crate) struct DemonEntry {
    pub(crate) demon: std::rc::Rc<dyn Demon>,
    pub(crate) priority: DemonPriority,
    /// The enqueue stamp. Reversible because [`Solver::inhibit_demon`]
    /// saturates it through the trail.
    pub(crate) stamp: RevU64,
}

/// A [`Demon`] defined by a closure, for propagation steps too small to
/// deserve their own type.
pub struct ClosureDemon<F> {
    function: F,
    priority: DemonPriority,
}

impl<F: Fn(&mut Solver) -> PropagationStatus> ClosureDemon<F> {
    pub fn new(function: F) -> ClosureDemon<F> {
        ClosureDemon {
            function,
            priority: DemonPriority::Normal,
        }
    }

    pub fn with_priority(function: F, priority: DemonPriority) -> ClosureDemon<F> {
        ClosureDemon { function, priority }
    }
}

impl<F: Fn(&mut Solver) -> PropagationStatus> Demon for ClosureDemon<F> {
    fn run(&self, solver: &mut Solver) -> PropagationStatus {
        (self.function)(solver)
    }

    fn priority(&self) -> DemonPriority {
        self.priority
    }
}
