use std::cell::RefCell;
use std::rc::Rc;

use super::PropagationMonitor;

/// The fan-out of propagation events: the solver owns exactly one of these
/// and dispatches each event to every attached downstream monitor.
///
/// The list is behind a `RefCell` because monitors are attached while the
/// solver is borrowed (installation happens inside `new_search`). Dispatch
/// never holds the borrow across a monitor call.
#[derive(Default)]
pub(crate) struct TraceFanout {
    monitors: RefCell<Vec<Rc<dyn PropagationMonitor>>>,
}

impl TraceFanout {
    pub(crate) fn add(&self, monitor: Rc<dyn PropagationMonitor>) {
        self.monitors.borrow_mut().push(monitor);
    }

    pub(crate) fn len(&self) -> usize {
        self.monitors.borrow().len()
    }

    pub(crate) fn get(&self, index: usize) -> Rc<dyn PropagationMonitor> {
        Rc::clone(&self.monitors.borrow()[index])
    }
}
