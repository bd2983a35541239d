use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::ClosureDemon;
use crate::engine::propagation::Constraint;
use crate::engine::variables::IntVar;
use crate::engine::variables::VarEvent;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

/// `left != right + offset`.
///
/// Propagates once either side is bound; with `offset = 0` this is plain
/// disequality, and with the row distance as offset it expresses the
/// diagonal constraints of n-queens models.
#[derive(Debug)]
pub struct NotEqualWithOffset {
    left: IntVar,
    right: IntVar,
    offset: i64,
}

impl NotEqualWithOffset {
    pub fn new(left: IntVar, right: IntVar, offset: i64) -> NotEqualWithOffset {
        NotEqualWithOffset {
            left,
            right,
            offset,
        }
    }

    fn propagate(&self, solver: &mut Solver) -> PropagationStatus {
        if solver.is_bound(self.left) {
            solver.remove_value(self.right, solver.value(self.left) - self.offset)?;
        }
        if solver.is_bound(self.right) {
            solver.remove_value(self.left, solver.value(self.right) + self.offset)?;
        }
        Ok(())
    }
}

impl Constraint for NotEqualWithOffset {
    fn post(self: Rc<Self>, solver: &mut Solver) -> PropagationStatus {
        let constraint = Rc::clone(&self);
        let demon = solver.register_demon(Rc::new(ClosureDemon::new(move |solver: &mut Solver| {
            constraint.propagate(solver)
        })));
        solver.attach_demon(self.left, VarEvent::Bound.into(), demon);
        solver.attach_demon(self.right, VarEvent::Bound.into(), demon);
        Ok(())
    }

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus {
        self.propagate(solver)
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::NON_EQUAL);
        visitor.visit_integer_variable_argument(tags::LEFT_ARGUMENT, self.left);
        visitor.visit_integer_variable_argument(tags::RIGHT_ARGUMENT, self.right);
        visitor.visit_integer_argument(tags::OFFSET_ARGUMENT, self.offset);
        visitor.end_visit_constraint(tags::NON_EQUAL);
    }

    fn debug_string(&self) -> String {
        format!("{} != {} + {}", self.left, self.right, self.offset)
    }
}
