use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

#[cfg(doc)]
use crate::engine::propagation::Demon;

/// A constraint over solver variables.
///
/// `post` attaches the constraint's [`Demon`]s to the variable events it
/// reacts to; `initial_propagate` performs the first domain reduction.
/// [`Solver::post_and_propagate`] brackets both with a queue freeze so that
/// demons woken during posting only fire once the constraint is fully set
/// up.
pub trait Constraint {
    fn post(self: Rc<Self>, solver: &mut Solver) -> PropagationStatus;

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus;

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::UNKNOWN);
        visitor.end_visit_constraint(tags::UNKNOWN);
    }

    fn debug_string(&self) -> String {
        "Constraint".to_owned()
    }
}
