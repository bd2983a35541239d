use std::rc::Rc;

use crate::basic_types::PropagationStatus;
use crate::engine::variables::IntVar;
use crate::engine::Solver;
use crate::model_visitor::DecisionVisitor;

/// A binary decision: a node of the search tree.
///
/// `apply` commits the left branch; `refute` commits the right branch after
/// the left branch has been fully explored.
pub trait Decision {
    fn apply(&self, solver: &mut Solver) -> PropagationStatus;

    fn refute(&self, solver: &mut Solver) -> PropagationStatus;

    fn accept(&self, visitor: &mut dyn DecisionVisitor) {
        visitor.visit_unknown_decision();
    }

    fn debug_string(&self) -> String {
        "Decision".to_owned()
    }
}

/// The decision `var = value` with refutation `var != value`.
pub struct AssignVariableValue {
    var: IntVar,
    value: i64,
}

impl AssignVariableValue {
    pub fn new(var: IntVar, value: i64) -> AssignVariableValue {
        AssignVariableValue { var, value }
    }
}

impl Decision for AssignVariableValue {
    fn apply(&self, solver: &mut Solver) -> PropagationStatus {
        solver.set_value(self.var, self.value)
    }

    fn refute(&self, solver: &mut Solver) -> PropagationStatus {
        solver.remove_value(self.var, self.value)
    }

    fn accept(&self, visitor: &mut dyn DecisionVisitor) {
        visitor.visit_set_variable_value(self.var, self.value);
    }

    fn debug_string(&self) -> String {
        format!("{} == {}", self.var, self.value)
    }
}

/// Wraps a decision so that its branches swap: applying refutes and refuting
/// applies. Produced by the SWITCH_BRANCHES decision modification.
pub struct ReverseDecision {
    decision: Rc<dyn Decision>,
}

impl ReverseDecision {
    pub fn new(decision: Rc<dyn Decision>) -> ReverseDecision {
        ReverseDecision { decision }
    }
}

impl Decision for ReverseDecision {
    fn apply(&self, solver: &mut Solver) -> PropagationStatus {
        self.decision.refute(solver)
    }

    fn refute(&self, solver: &mut Solver) -> PropagationStatus {
        self.decision.apply(solver)
    }

    fn accept(&self, visitor: &mut dyn DecisionVisitor) {
        self.decision.accept(visitor);
    }

    fn debug_string(&self) -> String {
        format!("Reverse({})", self.decision.debug_string())
    }
}

/// A decision with no effect on either branch; composition builders use it to
/// rebalance trees without touching domains.
pub struct BalancingDecision;

impl Decision for BalancingDecision {
    fn apply(&self, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn refute(&self, _solver: &mut Solver) -> PropagationStatus {
        Ok(())
    }

    fn debug_string(&self) -> String {
        "BalancingDecision".to_owned()
    }
}
