use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::Constraint;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

/// The constraint that always holds.
#[derive(Debug, Default)]
pub struct TrueConstraint;

impl Constraint for TrueConstraint {
    fn post(self: Rc<Self>, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn initial_propagate(&self, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::TRUE_CONSTRAINT);
        visitor.end_visit_constraint(tags::TRUE_CONSTRAINT);
    }

    fn debug_string(&self) -> String {
        "TrueConstraint()".to_owned()
    }
}

/// The constraint that never holds. The engine posts it to poison a model
/// after a failure escaped the search machinery, so the next solve reports
/// infeasibility instead of crashing.
#[derive(Debug, Default)]
pub struct FalseConstraint {
    explanation: String,
}

impl FalseConstraint {
    pub fn new(explanation: impl Into<String>) -> FalseConstraint {
        FalseConstraint {
            explanation: explanation.into(),
        }
    }
}

impl Constraint for FalseConstraint {
    fn post(self: Rc<Self>, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus {
        Err(solver.fail())
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::FALSE_CONSTRAINT);
        visitor.end_visit_constraint(tags::FALSE_CONSTRAINT);
    }

    fn debug_string(&self) -> String {
        if self.explanation.is_empty() {
            "FalseConstraint()".to_owned()
        } else {
            format!("FalseConstraint({})", self.explanation)
        }
    }
}
