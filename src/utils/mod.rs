//! Support utilities: convergence tracking and kernel timing.

pub mod convergence;
pub mod timing;

pub use convergence::{Convergence, SolveStats};
pub use timing::{ScopedTimer, TimeCategory, Timings};
