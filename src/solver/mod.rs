//! The conjugate gradient engine.

pub mod cg;

pub use cg::{CgEngine, SolveReport};
