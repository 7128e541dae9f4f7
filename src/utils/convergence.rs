//! Convergence tracking & tolerance checks for the iteration loop.

/// Stopping criteria.
///
/// The tolerance is an absolute threshold on the residual 2-norm. Running
/// out of iterations stops the loop but does not count as convergence; the
/// two outcomes are distinguished by [`SolveStats::converged`].
pub struct Convergence<T> {
    pub tolerance: T,
    pub max_iterations: usize,
}

#[derive(Clone, Debug)]
pub struct SolveStats<T> {
    pub iterations: usize,
    pub final_residual: T,
    pub converged: bool,
}

impl<T: Copy + num_traits::Float> Convergence<T> {
    /// Returns (should_stop, stats) given the residual norm after iteration `i`.
    pub fn check(&self, res_norm: T, i: usize) -> (bool, SolveStats<T>) {
        let converged = res_norm < self.tolerance;
        (
            converged || i >= self.max_iterations,
            SolveStats {
                iterations: i,
                final_residual: res_norm,
                converged,
            },
        )
    }
}
