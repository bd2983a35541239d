mod assignment;
mod constraint_operation_error;
mod failure;
mod random;
mod stopwatch;

pub use assignment::Assignment;
pub use constraint_operation_error::ConstraintOperationError;
pub use failure::Failure;
pub use failure::PropagationStatus;
pub use random::Random;
pub use stopwatch::Stopwatch;
