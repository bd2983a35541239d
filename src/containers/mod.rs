//! Containers used throughout the solver.
mod hash_structures;
mod keyed_vec;

pub use hash_structures::*;
pub use keyed_vec::*;
