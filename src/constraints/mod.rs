//! The built-in constraints the core itself relies on.
//!
//! This is deliberately a small set: the always-true and always-false
//! constraints the engine posts internally, constant bound cuts, and binary
//! disequality. Richer global constraints live in client crates built on
//! the same [`crate::engine::propagation::Constraint`] interface.

mod bounds;
mod logical;
mod not_equal;

pub use bounds::EqualsConstant;
pub use bounds::GreaterOrEqualConstant;
pub use bounds::LessOrEqualConstant;
pub use logical::FalseConstraint;
pub use logical::TrueConstraint;
pub use not_equal::NotEqualWithOffset;
