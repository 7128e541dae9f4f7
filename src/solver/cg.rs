//! Conjugate gradient iteration over backend-provided kernels.
//!
//! The engine owns the dense vectors (k, x, p, q, r, z) and the iteration;
//! every numeric kernel — matrix-vector product, axpy, xpay, dot product
//! and preconditioner application — is deferred to a [`CgBackend`] and
//! wrapped in a scoped timer, so a solve produces both a result and a
//! per-kernel time breakdown.
//!
//! Recurrence (Hestenes–Stiefel, preconditioned form):
//!
//! ```text
//! r = k - A*x          (= k for the zero initial guess)
//! z = B*r              (z = r when unpreconditioned)
//! p = z
//! loop:
//!     q     = A*p
//!     alpha = (r.z) / (p.q)
//!     x     = x + alpha*p
//!     r     = r - alpha*q
//!     stop when ||r|| < tolerance
//!     z     = B*r
//!     beta  = (r.z) / previous (r.z)
//!     p     = z + beta*p
//! ```

use std::path::Path;
use std::time::Instant;

use num_traits::Float;
use tracing::{debug, trace};

use crate::backend;
use crate::config::SolverOptions;
use crate::core::CgBackend;
use crate::error::CgError;
use crate::io::market;
use crate::matrix::{CooMatrix, SparseFormat};
use crate::preconditioner::PcKind;
use crate::utils::convergence::{Convergence, SolveStats};
use crate::utils::timing::{TimeCategory, Timings};

/// What a finished solve hands back: iteration stats plus the per-kernel
/// time breakdown. Hitting the iteration ceiling is a normal outcome with
/// `stats.converged == false`, not an error.
#[derive(Clone, Debug)]
pub struct SolveReport<T> {
    pub stats: SolveStats<T>,
    pub timing: Timings,
}

pub struct CgEngine<T> {
    backend: Box<dyn CgBackend<T>>,
    format: SparseFormat,
    pc: PcKind,
    conv: Convergence<T>,
    n: usize,
    k: Vec<T>,
    x: Vec<T>,
    p: Vec<T>,
    q: Vec<T>,
    r: Vec<T>,
    z: Vec<T>,
    timing: Timings,
}

impl<T> CgEngine<T>
where
    T: Float + std::fmt::Debug + Send + Sync + 'static,
{
    /// Select a backend per `options` and validate the requested
    /// format/preconditioner combination before any numeric work.
    pub fn from_options(options: &SolverOptions) -> Result<Self, CgError> {
        let backend = backend::create(options)?;
        let tolerance = T::from(options.tolerance).ok_or(CgError::InvalidOption {
            name: "tolerance",
            value: options.tolerance.to_string(),
        })?;
        Ok(Self {
            backend,
            format: options.format,
            pc: options.preconditioner,
            conv: Convergence { tolerance, max_iterations: options.max_iterations },
            n: 0,
            k: Vec::new(),
            x: Vec::new(),
            p: Vec::new(),
            q: Vec::new(),
            r: Vec::new(),
            z: Vec::new(),
            timing: Timings::default(),
        })
    }

    /// Read a Matrix Market file and set the engine up for solving.
    /// File reading and format conversion are timed separately.
    pub fn load(&mut self, path: &Path) -> Result<(), CgError> {
        let coo = {
            let _t = self.timing.scoped(TimeCategory::Io);
            market::read_file(path)?
        };
        self.load_coo(coo)
    }

    /// Set the engine up from an already-built triplet matrix.
    ///
    /// Allocates the solve vectors once; the right-hand side defaults to
    /// all ones until [`set_rhs`](Self::set_rhs) replaces it.
    pub fn load_coo(&mut self, coo: CooMatrix<T>) -> Result<(), CgError> {
        self.n = coo.n;
        self.k = vec![T::one(); self.n];
        self.x = vec![T::zero(); self.n];
        self.p = vec![T::zero(); self.n];
        self.q = vec![T::zero(); self.n];
        self.r = vec![T::zero(); self.n];
        self.z = vec![T::zero(); self.n];
        let _t = self.timing.scoped(TimeCategory::Converting);
        self.backend.prepare(coo, self.format, self.pc)
    }

    /// Replace the right-hand side.
    pub fn set_rhs(&mut self, b: &[T]) -> Result<(), CgError> {
        if b.len() != self.n {
            return Err(CgError::RhsLength { got: b.len(), expected: self.n });
        }
        self.k.copy_from_slice(b);
        Ok(())
    }

    pub fn dimension(&self) -> usize {
        self.n
    }

    /// Computed solution of the last solve.
    pub fn solution(&self) -> &[T] {
        &self.x
    }

    /// Accumulated timings, including load and conversion.
    pub fn timings(&self) -> &Timings {
        &self.timing
    }

    /// Run the iteration from the zero initial guess until the residual
    /// norm drops under the tolerance or the iteration ceiling is hit.
    pub fn solve(&mut self) -> Result<SolveReport<T>, CgError> {
        debug_assert!(self.n > 0, "solve before load");
        let solve_start = Instant::now();
        let preconditioned = self.pc != PcKind::None;

        self.x.fill(T::zero());
        self.r.copy_from_slice(&self.k);
        if preconditioned {
            let _t = self.timing.scoped(TimeCategory::Preconditioner);
            self.backend.apply_preconditioner(&self.r, &mut self.z);
        } else {
            self.z.copy_from_slice(&self.r);
        }
        self.p.copy_from_slice(&self.z);

        let rr = {
            let _t = self.timing.scoped(TimeCategory::Dot);
            self.backend.dot(&self.r, &self.r)
        };
        let mut rz = if preconditioned {
            let _t = self.timing.scoped(TimeCategory::Dot);
            self.backend.dot(&self.r, &self.z)
        } else {
            rr
        };

        let residual = rr.sqrt();
        let (stop, mut stats) = self.conv.check(residual, 0);
        if stop {
            self.timing.solve += solve_start.elapsed();
            return Ok(SolveReport { stats, timing: self.timing.clone() });
        }

        for iteration in 1..=self.conv.max_iterations {
            {
                let _t = self.timing.scoped(TimeCategory::MatVec);
                self.backend.matvec(&self.p, &mut self.q);
            }
            let pq = {
                let _t = self.timing.scoped(TimeCategory::Dot);
                self.backend.dot(&self.p, &self.q)
            };
            if pq <= T::zero() {
                self.timing.solve += solve_start.elapsed();
                return Err(CgError::IndefiniteMatrix);
            }
            let alpha = rz / pq;
            {
                let _t = self.timing.scoped(TimeCategory::Axpy);
                self.backend.axpy(alpha, &self.p, &mut self.x);
            }
            {
                let _t = self.timing.scoped(TimeCategory::Axpy);
                self.backend.axpy(-alpha, &self.q, &mut self.r);
            }

            let rr = {
                let _t = self.timing.scoped(TimeCategory::Dot);
                self.backend.dot(&self.r, &self.r)
            };
            let residual = rr.sqrt();
            trace!(iteration, residual = ?residual, "cg iteration");
            let (stop, s) = self.conv.check(residual, iteration);
            stats = s;
            if stop {
                break;
            }

            if preconditioned {
                let _t = self.timing.scoped(TimeCategory::Preconditioner);
                self.backend.apply_preconditioner(&self.r, &mut self.z);
            }
            // beta divides by the previous iteration's dot, cached in rz.
            let rz_new = if preconditioned {
                let _t = self.timing.scoped(TimeCategory::Dot);
                self.backend.dot(&self.r, &self.z)
            } else {
                rr
            };
            let beta = rz_new / rz;
            {
                let _t = self.timing.scoped(TimeCategory::Xpay);
                if preconditioned {
                    self.backend.xpay(&self.z, beta, &mut self.p);
                } else {
                    self.backend.xpay(&self.r, beta, &mut self.p);
                }
            }
            rz = rz_new;
        }

        self.timing.solve += solve_start.elapsed();
        debug!(
            iterations = stats.iterations,
            residual = ?stats.final_residual,
            converged = stats.converged,
            "solve finished"
        );
        Ok(SolveReport { stats, timing: self.timing.clone() })
    }
}
