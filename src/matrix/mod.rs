//! Sparse matrix storage layouts: triplet (COO), compressed-row (CSR) and
//! padded fixed-width (ELLPACK), plus their per-chunk split variants.

use std::fmt;
use std::str::FromStr;

use crate::error::CgError;

pub mod coo;
pub mod csr;
pub mod ell;

pub use coo::CooMatrix;
pub use csr::{CsrData, CsrMatrix, SplitCsrMatrix};
pub use ell::{EllData, EllMatrix, SplitEllMatrix};

/// Storage layouts the engine can hold its matrix in.
///
/// Exactly one layout is active per solve; the backend keeps it in a tagged
/// union so the other two are never allocated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SparseFormat {
    /// Triplet (coordinate) storage, the unconverted load-time layout.
    Coo,
    /// Compressed-row storage.
    Csr,
    /// Padded fixed-width (ELLPACK) storage.
    Ell,
}

impl fmt::Display for SparseFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SparseFormat::Coo => "coo",
            SparseFormat::Csr => "csr",
            SparseFormat::Ell => "ell",
        })
    }
}

impl FromStr for SparseFormat {
    type Err = CgError;

    fn from_str(s: &str) -> Result<Self, CgError> {
        match s.to_ascii_lowercase().as_str() {
            "coo" => Ok(SparseFormat::Coo),
            "csr" | "crs" => Ok(SparseFormat::Csr),
            "ell" | "ellpack" => Ok(SparseFormat::Ell),
            _ => Err(CgError::InvalidOption { name: "format", value: s.to_string() }),
        }
    }
}
