//! The propagation queue: pending demons bucketed by priority, plus the
//! bookkeeping that gives propagation its fixpoint semantics.
//!
//! The queue itself is passive data; the drain loop lives on the solver
//! because running a demon requires the whole solver. See
//! `Solver::process_queue` for the dispatch discipline.

use std::collections::VecDeque;
use std::rc::Rc;

use crate::engine::propagation::Action;
use crate::engine::propagation::Constraint;
use crate::engine::propagation::DemonId;
use crate::engine::propagation::DemonPriority;
use crate::engine::propagation::NUM_PRIORITIES;

pub(crate) struct DemonQueue {
    /// One FIFO per priority.
    queues: [VecDeque<DemonId>; NUM_PRIORITIES],
    /// Monotonically increasing; every freeze and every marker push/pop bumps
    /// it, re-opening the enqueue window for all demons.
    pub(crate) stamp: u64,
    /// The number of nested freeze levels. The queue is frozen iff positive.
    pub(crate) freeze_level: u32,
    /// Re-entrancy guard around the drain loop.
    pub(crate) in_process: bool,
    /// Re-entrancy guard around pending-constraint posting.
    pub(crate) in_add: bool,
    /// Constraints added during search, posted FIFO; posting may append more.
    pub(crate) to_add: Vec<Rc<dyn Constraint>>,
    /// A one-shot action run on the next failure.
    on_failure: Option<Rc<dyn Action>>,
}

impl DemonQueue {
    pub(crate) fn new() -> DemonQueue {
        DemonQueue {
            queues: Default::default(),
            stamp: 1,
            freeze_level: 0,
            in_process: false,
            in_add: false,
            to_add: Vec::new(),
            on_failure: None,
        }
    }

    pub(crate) fn freeze(&mut self) {
        self.freeze_level += 1;
        self.stamp += 1;
    }

    /// Returns true when this unfreeze removed the last freeze level and the
    /// caller should drain the queue.
    pub(crate) fn unfreeze(&mut self) -> bool {
        self.freeze_level -= 1;
        self.freeze_level == 0
    }

    pub(crate) fn increase_stamp(&mut self) {
        self.stamp += 1;
    }

    pub(crate) fn push(&mut self, priority: DemonPriority, demon: DemonId) {
        self.queues[priority.index()].push_back(demon);
    }

    pub(crate) fn pop(&mut self, priority: DemonPriority) -> Option<DemonId> {
        self.queues[priority.index()].pop_front()
    }

    pub(crate) fn has_pending(&self, priority: DemonPriority) -> bool {
        !self.queues[priority.index()].is_empty()
    }

    /// Discard all pending demons. Demon stamps are left untouched: a
    /// discarded demon stays un-enqueueable until the stamp moves on.
    pub(crate) fn discard_pending_demons(&mut self) {
        for queue in self.queues.iter_mut() {
            queue.clear();
        }
    }

    /// Take the one-shot on-failure action; a second failure without a
    /// re-registration will not re-run it.
    pub(crate) fn take_action_on_fail(&mut self) -> Option<Rc<dyn Action>> {
        self.on_failure.take()
    }

    pub(crate) fn set_action_on_fail(&mut self, action: Rc<dyn Action>) {
        self.on_failure = Some(action);
    }

    pub(crate) fn clear_action_on_fail(&mut self) {
        self.on_failure = None;
    }

    /// Reset the control flags after a failure has been fully handled.
    pub(crate) fn reset_after_failure(&mut self) {
        self.freeze_level = 0;
        self.in_process = false;
        self.in_add = false;
        self.to_add.clear();
    }
}
