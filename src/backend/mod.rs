//! Concrete kernel backends and the selection factory.

use std::fmt;
use std::str::FromStr;

use bitflags::bitflags;
use num_traits::Float;

use crate::config::SolverOptions;
use crate::core::CgBackend;
use crate::error::CgError;
use crate::matrix::SparseFormat;
use crate::preconditioner::PcKind;

pub mod serial;
pub use serial::SerialBackend;

#[cfg(feature = "rayon")]
pub mod chunked;
#[cfg(feature = "rayon")]
pub use chunked::ChunkedBackend;

bitflags! {
    /// Capability flags a backend advertises: which storage layouts it can
    /// run kernels on and which preconditioners it can apply.
    #[derive(Copy, Clone, Debug)]
    pub struct Caps: u8 {
        const COO    = 0b0001;
        const CSR    = 0b0010;
        const ELL    = 0b0100;
        const JACOBI = 0b1000;
    }
}

impl From<SparseFormat> for Caps {
    fn from(format: SparseFormat) -> Self {
        match format {
            SparseFormat::Coo => Caps::COO,
            SparseFormat::Csr => Caps::CSR,
            SparseFormat::Ell => Caps::ELL,
        }
    }
}

impl From<PcKind> for Caps {
    fn from(pc: PcKind) -> Self {
        match pc {
            PcKind::None => Caps::empty(),
            PcKind::Jacobi => Caps::JACOBI,
        }
    }
}

/// Backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackendKind {
    /// Sequential reference kernels.
    Serial,
    /// One rayon worker per chunk of rows.
    Chunked,
}

impl Default for BackendKind {
    fn default() -> Self {
        #[cfg(feature = "rayon")]
        {
            BackendKind::Chunked
        }
        #[cfg(not(feature = "rayon"))]
        {
            BackendKind::Serial
        }
    }
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            BackendKind::Serial => "serial",
            BackendKind::Chunked => "chunked",
        })
    }
}

impl FromStr for BackendKind {
    type Err = CgError;

    fn from_str(s: &str) -> Result<Self, CgError> {
        match s.to_ascii_lowercase().as_str() {
            "serial" => Ok(BackendKind::Serial),
            "chunked" => Ok(BackendKind::Chunked),
            _ => Err(CgError::InvalidOption { name: "backend", value: s.to_string() }),
        }
    }
}

/// Build the backend selected by `options`, validating the requested
/// format/preconditioner combination before any numeric work begins.
pub fn create<T>(options: &SolverOptions) -> Result<Box<dyn CgBackend<T>>, CgError>
where
    T: Float + Send + Sync + 'static,
{
    let backend: Box<dyn CgBackend<T>> = match options.backend {
        BackendKind::Serial => Box::new(SerialBackend::new()),
        #[cfg(feature = "rayon")]
        BackendKind::Chunked => {
            let chunks = options.chunks.unwrap_or_else(num_cpus::get);
            Box::new(ChunkedBackend::new(chunks))
        }
        #[cfg(not(feature = "rayon"))]
        BackendKind::Chunked => return Err(CgError::UnavailableBackend(options.backend)),
    };
    if !backend.supports_format(options.format) {
        return Err(CgError::UnsupportedFormat(options.format, backend.name()));
    }
    if !backend.supports_preconditioner(options.preconditioner) {
        return Err(CgError::UnsupportedPreconditioner(options.preconditioner, backend.name()));
    }
    Ok(backend)
}
