//! Search strategies: decisions, the builders that produce them, and the
//! selectors they are composed from.

mod branch_selector;
mod decision;
mod decision_builder;
mod instantiate;
mod value_selection;
mod variable_selection;

pub use branch_selector::BranchSelector;
pub use branch_selector::ClosureBranchSelector;
pub use branch_selector::DecisionModification;
pub use decision::AssignVariableValue;
pub use decision::BalancingDecision;
pub use decision::Decision;
pub use decision::ReverseDecision;
pub use decision_builder::ClosureDecisionBuilder;
pub use decision_builder::Compose;
pub use decision_builder::ConstraintAdder;
pub use decision_builder::DecisionBuilder;
pub use decision_builder::RestoreAssignment;
pub use instantiate::InstantiateVariables;
pub use value_selection::InDomainMax;
pub use value_selection::InDomainMin;
pub use value_selection::ValueSelector;
pub use variable_selection::FirstFail;
pub use variable_selection::InputOrder;
pub use variable_selection::VariableSelector;

pub(crate) use branch_selector::ApplyBranchSelector;
pub(crate) use branch_selector::UndoBranchSelector;
