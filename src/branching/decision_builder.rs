use std::rc::Rc;

use crate::basic_types::Assignment;
use crate::basic_types::Failure;
use crate::engine::monitors::SearchMonitor;
use crate::engine::propagation::Constraint;
use crate::engine::Solver;
use crate::model_visitor::ModelVisitor;

use super::Decision;

/// Supplies the next decision of the search tree, or `None` at a leaf.
///
/// `next` may itself reduce domains (and therefore fail); the search loop
/// treats such a failure like any propagation failure.
pub trait DecisionBuilder {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure>;

    /// Extra monitors this builder wants installed when a search starts with
    /// it (an objective, for example).
    fn append_monitors(&self, _solver: &Solver, _extras: &mut Vec<Rc<dyn SearchMonitor>>) {}

    fn accept(&self, _visitor: &mut dyn ModelVisitor) {}

    fn debug_string(&self) -> String {
        "DecisionBuilder".to_owned()
    }
}

/// A [`DecisionBuilder`] defined by a closure.
pub struct ClosureDecisionBuilder<F> {
    function: F,
}

impl<F: Fn(&mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure>> ClosureDecisionBuilder<F> {
    pub fn new(function: F) -> ClosureDecisionBuilder<F> {
        ClosureDecisionBuilder { function }
    }
}

impl<F: Fn(&mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure>> DecisionBuilder
    for ClosureDecisionBuilder<F>
{
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        (self.function)(solver)
    }
}

/// Runs each sub-builder in turn until it is exhausted, then moves to the
/// next one.
pub struct Compose {
    builders: Vec<Rc<dyn DecisionBuilder>>,
}

impl Compose {
    pub fn new(builders: Vec<Rc<dyn DecisionBuilder>>) -> Compose {
        Compose { builders }
    }
}

impl DecisionBuilder for Compose {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        for builder in &self.builders {
            if let Some(decision) = builder.next(solver)? {
                return Ok(Some(decision));
            }
        }
        Ok(None)
    }

    fn append_monitors(&self, solver: &Solver, extras: &mut Vec<Rc<dyn SearchMonitor>>) {
        for builder in &self.builders {
            builder.append_monitors(solver, extras);
        }
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        for builder in &self.builders {
            builder.accept(visitor);
        }
    }

    fn debug_string(&self) -> String {
        format!(
            "Compose({})",
            self.builders
                .iter()
                .map(|builder| builder.debug_string())
                .collect::<Vec<_>>()
                .join(", ")
        )
    }
}

/// Posts a constraint as its only step; used to check a constraint against
/// the current model by solving with this builder.
pub struct ConstraintAdder {
    constraint: Rc<dyn Constraint>,
}

impl ConstraintAdder {
    pub fn new(constraint: Rc<dyn Constraint>) -> ConstraintAdder {
        ConstraintAdder { constraint }
    }
}

impl DecisionBuilder for ConstraintAdder {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        solver.add_constraint(Rc::clone(&self.constraint))?;
        Ok(None)
    }

    fn debug_string(&self) -> String {
        format!("ConstraintAdder({})", self.constraint.debug_string())
    }
}

/// Re-applies a stored assignment, then stops.
pub struct RestoreAssignment {
    assignment: Assignment,
}

impl RestoreAssignment {
    pub fn new(assignment: Assignment) -> RestoreAssignment {
        RestoreAssignment { assignment }
    }
}

impl DecisionBuilder for RestoreAssignment {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        for (var, value) in self.assignment.iter() {
            solver.set_value(var, value)?;
        }
        Ok(None)
    }

    fn debug_string(&self) -> String {
        "RestoreAssignment".to_owned()
    }
}
