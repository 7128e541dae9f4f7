//! Solver options and the environment-variable configuration surface.
//!
//! Recognized variables: `CG_FORMAT` (coo|csr|ell), `CG_PRECONDITIONER`
//! (none|jacobi), `CG_BACKEND` (serial|chunked), `CG_MAX_ITERATIONS`,
//! `CG_TOLERANCE` and `CG_CHUNKS`.

use std::env;

use crate::backend::BackendKind;
use crate::error::CgError;
use crate::matrix::SparseFormat;
use crate::preconditioner::PcKind;

/// Everything the engine needs to know before it touches a matrix.
#[derive(Debug)]
pub struct SolverOptions {
    /// Storage layout to convert the loaded matrix into.
    pub format: SparseFormat,
    pub preconditioner: PcKind,
    pub backend: BackendKind,
    pub max_iterations: usize,
    /// Absolute threshold on the residual 2-norm.
    pub tolerance: f64,
    /// Chunk count for the chunked backend; defaults to the core count.
    pub chunks: Option<usize>,
}

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            format: SparseFormat::Csr,
            preconditioner: PcKind::None,
            backend: BackendKind::default(),
            max_iterations: 1000,
            tolerance: 1e-9,
            chunks: None,
        }
    }
}

impl SolverOptions {
    /// Defaults overridden by whatever `CG_*` variables are set.
    pub fn from_env() -> Result<Self, CgError> {
        let mut options = Self::default();
        if let Ok(value) = env::var("CG_FORMAT") {
            options.format = value.parse()?;
        }
        if let Ok(value) = env::var("CG_PRECONDITIONER") {
            options.preconditioner = value.parse()?;
        }
        if let Ok(value) = env::var("CG_BACKEND") {
            options.backend = value.parse()?;
        }
        if let Ok(value) = env::var("CG_MAX_ITERATIONS") {
            options.max_iterations = value
                .parse()
                .map_err(|_| CgError::InvalidOption { name: "max_iterations", value })?;
        }
        if let Ok(value) = env::var("CG_TOLERANCE") {
            options.tolerance = value
                .parse()
                .map_err(|_| CgError::InvalidOption { name: "tolerance", value })?;
        }
        if let Ok(value) = env::var("CG_CHUNKS") {
            let chunks = value
                .parse()
                .map_err(|_| CgError::InvalidOption { name: "chunks", value })?;
            options.chunks = Some(chunks);
        }
        Ok(options)
    }
}
