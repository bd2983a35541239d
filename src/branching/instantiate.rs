use std::rc::Rc;

use crate::basic_types::Failure;
use crate::engine::variables::IntVar;
use crate::engine::Solver;
use crate::model_visitor::tags;
use crate::model_visitor::ModelVisitor;

use super::AssignVariableValue;
use super::Decision;
use super::DecisionBuilder;
use super::ValueSelector;
use super::VariableSelector;

/// The standard labelling builder: pick an unbound variable with the
/// variable selector, pick a value with the value selector, and branch on
/// `var = value` versus `var != value`. Returns no decision once every
/// candidate is assigned.
pub struct InstantiateVariables {
    vars: Vec<IntVar>,
    variable_selector: Box<dyn VariableSelector>,
    value_selector: Box<dyn ValueSelector>,
}

impl InstantiateVariables {
    pub fn new(
        vars: Vec<IntVar>,
        variable_selector: impl VariableSelector + 'static,
        value_selector: impl ValueSelector + 'static,
    ) -> InstantiateVariables {
        InstantiateVariables {
            vars,
            variable_selector: Box::new(variable_selector),
            value_selector: Box::new(value_selector),
        }
    }
}

impl DecisionBuilder for InstantiateVariables {
    fn next(&self, solver: &mut Solver) -> Result<Option<Rc<dyn Decision>>, Failure> {
        let var = match self.variable_selector.select(solver, &self.vars) {
            Some(var) => var,
            None => return Ok(None),
        };
        let value = self.value_selector.select(solver, var);
        Ok(Some(Rc::new(AssignVariableValue::new(var, value))))
    }

    fn accept(&self, visitor: &mut dyn ModelVisitor) {
        visitor.begin_visit_extension(tags::VARIABLE_GROUP_EXTENSION);
        visitor.visit_integer_variable_array_argument(tags::VARS_ARGUMENT, &self.vars);
        visitor.end_visit_extension(tags::VARIABLE_GROUP_EXTENSION);
    }

    fn debug_string(&self) -> String {
        "InstantiateVariables".to_owned()
    }
}
