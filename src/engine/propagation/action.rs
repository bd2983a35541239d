use crate::engine::Solver;

/// A deferred operation, run when the trail unwinds past its registration
/// point or when the queue recovers from a failure.
///
/// Unlike demons, actions carry no priority and must not fail: they run while
/// the engine is already undoing state.
pub trait Action {
    fn run(&self, solver: &mut Solver);

    fn debug_string(&self) -> String {
        "Action".to_owned()
    }
}

/// An [`Action`] defined by a closure.
pub struct ClosureAction<F> {
    function: F,
}

impl<F: Fn(&mut Solver)> ClosureAction<F> {
    pub fn new(function: F) -> ClosureAction<F> {
        ClosureAction { function }
    }
}

impl<F: Fn(&mut Solver)> Action for ClosureAction<F> {
    fn run(&self, solver: &mut Solver) {
        (self.function)(solver)
    }
}
