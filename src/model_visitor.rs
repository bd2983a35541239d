//! Model introspection: a visitor that walks the constraints and search
//! objects of a model.
//!
//! Exporters (textual printers, statistics collectors, serialisers) are
//! clients of this interface. The tag strings in [`tags`] identify
//! constraint types and argument names in exported models and must be kept
//! bit-exact for compatibility with previously exported models.

use crate::engine::variables::IntVar;

/// Tags for constraints, arguments and extensions.
pub mod tags {
    pub const UNKNOWN: &str = "unknown";

    // Constraint and expression type names.
    pub const ABS: &str = "Abs";
    pub const ALL_DIFFERENT: &str = "AllDifferent";
    pub const ALLOWED_ASSIGNMENTS: &str = "AllowedAssignments";
    pub const BETWEEN: &str = "Between";
    pub const CONVEX_PIECEWISE: &str = "ConvexPiecewise";
    pub const COUNT_EQUAL: &str = "CountEqual";
    pub const CUMULATIVE: &str = "Cumulative";
    pub const DIFFERENCE: &str = "Difference";
    pub const DISJUNCTIVE: &str = "Disjunctive";
    pub const DISTRIBUTE: &str = "Distribute";
    pub const DIVIDE: &str = "Divide";
    pub const ELEMENT: &str = "Element";
    pub const ELEMENT_EQUAL: &str = "ElementEqual";
    pub const EQUALITY: &str = "Equal";
    pub const FALSE_CONSTRAINT: &str = "FalseConstraint";
    pub const GREATER: &str = "Greater";
    pub const GREATER_OR_EQUAL: &str = "GreaterOrEqual";
    pub const INTEGER_VARIABLE: &str = "IntegerVariable";
    pub const LESS: &str = "Less";
    pub const LESS_OR_EQUAL: &str = "LessOrEqual";
    pub const LINK_EXPR_VAR: &str = "CastExpressionIntoVariable";
    pub const MAP_DOMAIN: &str = "MapDomain";
    pub const MAX: &str = "Max";
    pub const MAX_EQUAL: &str = "MaxEqual";
    pub const MEMBER: &str = "Member";
    pub const MIN: &str = "Min";
    pub const MIN_EQUAL: &str = "MinEqual";
    pub const NO_CYCLE: &str = "NoCycle";
    pub const NON_EQUAL: &str = "NonEqual";
    pub const OPPOSITE: &str = "Opposite";
    pub const PACK: &str = "Pack";
    pub const PRODUCT: &str = "Product";
    pub const SCAL_PROD: &str = "ScalarProduct";
    pub const SCAL_PROD_EQUAL: &str = "ScalarProductEqual";
    pub const SCAL_PROD_GREATER_OR_EQUAL: &str = "ScalarProductGreaterOrEqual";
    pub const SCAL_PROD_LESS_OR_EQUAL: &str = "ScalarProductLessOrEqual";
    pub const SORT: &str = "Sort";
    pub const SQUARE: &str = "Square";
    pub const SUM: &str = "Sum";
    pub const SUM_EQUAL: &str = "SumEqual";
    pub const SUM_GREATER_OR_EQUAL: &str = "SumGreaterOrEqual";
    pub const SUM_LESS_OR_EQUAL: &str = "SumLessOrEqual";
    pub const TRANSITION: &str = "Transition";
    pub const TRUE_CONSTRAINT: &str = "TrueConstraint";

    // Extension names.
    pub const OBJECTIVE_EXTENSION: &str = "Objective";
    pub const SEARCH_LIMIT_EXTENSION: &str = "SearchLimit";
    pub const VARIABLE_GROUP_EXTENSION: &str = "VariableGroup";

    // Argument names.
    pub const ACTIVE_ARGUMENT: &str = "active";
    pub const BRANCHES_LIMIT_ARGUMENT: &str = "branches_limit";
    pub const CAPACITY_ARGUMENT: &str = "capacity";
    pub const CARDS_ARGUMENT: &str = "cardinalities";
    pub const COEFFICIENTS_ARGUMENT: &str = "coefficients";
    pub const COUNT_ARGUMENT: &str = "count";
    pub const EXPRESSION_ARGUMENT: &str = "expression";
    pub const FAILURES_LIMIT_ARGUMENT: &str = "failures_limit";
    pub const INDEX_ARGUMENT: &str = "index";
    pub const INDEX2_ARGUMENT: &str = "index2";
    pub const LEFT_ARGUMENT: &str = "left";
    pub const MAX_ARGUMENT: &str = "max_value";
    pub const MAXIMIZE_ARGUMENT: &str = "maximize";
    pub const MIN_ARGUMENT: &str = "min_value";
    pub const OFFSET_ARGUMENT: &str = "offset";
    pub const RANGE_ARGUMENT: &str = "range";
    pub const RELATION_ARGUMENT: &str = "relation";
    pub const RIGHT_ARGUMENT: &str = "right";
    pub const SIZE_ARGUMENT: &str = "size";
    pub const SMART_TIME_CHECK_ARGUMENT: &str = "smart_time_check";
    pub const SOLUTION_LIMIT_ARGUMENT: &str = "solutions_limit";
    pub const STEP_ARGUMENT: &str = "step";
    pub const TARGET_ARGUMENT: &str = "target_variable";
    pub const TIME_LIMIT_ARGUMENT: &str = "time_limit";
    pub const VALUE_ARGUMENT: &str = "value";
    pub const VALUES_ARGUMENT: &str = "values";
    pub const VARS_ARGUMENT: &str = "variables";
    pub const VARIABLE_ARGUMENT: &str = "variable";
}

/// A visitor over the model; every hook has a default empty implementation so
/// visitors only override what they consume.
pub trait ModelVisitor {
    fn begin_visit_model(&mut self, _model_name: &str) {}
    fn end_visit_model(&mut self, _model_name: &str) {}

    fn begin_visit_constraint(&mut self, _type_name: &str) {}
    fn end_visit_constraint(&mut self, _type_name: &str) {}

    fn begin_visit_extension(&mut self, _type_name: &str) {}
    fn end_visit_extension(&mut self, _type_name: &str) {}

    fn visit_integer_variable(&mut self, _variable: IntVar, _name: &str) {}

    fn visit_integer_argument(&mut self, _arg_name: &str, _value: i64) {}
    fn visit_integer_array_argument(&mut self, _arg_name: &str, _values: &[i64]) {}
    fn visit_integer_variable_argument(&mut self, _arg_name: &str, _variable: IntVar) {}
    fn visit_integer_variable_array_argument(&mut self, _arg_name: &str, _variables: &[IntVar]) {}
}

/// A visitor over decisions, used by tracing monitors to render the shape of
/// a decision without knowing its concrete type.
pub trait DecisionVisitor {
    fn visit_set_variable_value(&mut self, _variable: IntVar, _value: i64) {}
    fn visit_split_variable_domain(&mut self, _variable: IntVar, _value: i64, _lower: bool) {}
    fn visit_unknown_decision(&mut self) {}
}
