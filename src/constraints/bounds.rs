use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::engine::propagation::Constraint;
use crate::engine::variables::IntVar;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

/// `var >= value`. A constant cut needs no demons: the whole constraint is
/// its initial propagation.
#[derive(Debug)]
pub struct GreaterOrEqualConstant {
    var: IntVar,
    value: i64,
}

impl GreaterOrEqualConstant {
    pub fn new(var: IntVar, value: i64) -> GreaterOrEqualConstant {
        GreaterOrEqualConstant { var, value }
    }
}

impl Constraint for GreaterOrEqualConstant {
    fn post(self: Rc<Self>, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus {
        solver.set_min(self.var, self.value)
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::GREATER_OR_EQUAL);
        visitor.visit_integer_variable_argument(tags::EXPRESSION_ARGUMENT, self.var);
        visitor.visit_integer_argument(tags::VALUE_ARGUMENT, self.value);
        visitor.end_visit_constraint(tags::GREATER_OR_EQUAL);
    }

    fn debug_string(&self) -> String {
        format!("{} >= {}", self.var, self.value)
    }
}

/// `var <= value`.
#[derive(Debug)]
pub struct LessOrEqualConstant {
    var: IntVar,
    value: i64,
}

impl LessOrEqualConstant {
    pub fn new(var: IntVar, value: i64) -> LessOrEqualConstant {
        LessOrEqualConstant { var, value }
    }
}

impl Constraint for LessOrEqualConstant {
    fn post(self: Rc<Self>, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus {
        solver.set_max(self.var, self.value)
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::LESS_OR_EQUAL);
        visitor.visit_integer_variable_argument(tags::EXPRESSION_ARGUMENT, self.var);
        visitor.visit_integer_argument(tags::VALUE_ARGUMENT, self.value);
        visitor.end_visit_constraint(tags::LESS_OR_EQUAL);
    }

    fn debug_string(&self) -> String {
        format!("{} <= {}", self.var, self.value)
    }
}

/// `var == value`.
#[derive(Debug)]
pub struct EqualsConstant {
    var: IntVar,
    value: i64,
}

impl EqualsConstant {
    pub fn new(var: IntVar, value: i64) -> EqualsConstant {
        EqualsConstant { var, value }
    }
}

impl Constraint for EqualsConstant {
    fn post(self: Rc<Self>, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn initial_propagate(&self, solver: &mut Solver) -> PropagationStatus {
        solver.set_value(self.var, self.value)
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_constraint(tags::EQUALITY);
        visitor.visit_integer_variable_argument(tags::EXPRESSION_ARGUMENT, self.var);
        visitor.visit_integer_argument(tags::VALUE_ARGUMENT, self.value);
        visitor.end_visit_constraint(tags::EQUALITY);
    }

    fn debug_string(&self) -> String {
        format!("{} == {}", self.var, self.value)
    }
}
