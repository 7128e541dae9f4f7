//! Preconditioners for the CG engine.

use std::fmt;
use std::str::FromStr;

use crate::error::CgError;

/// A preconditioner B ≈ A⁻¹ applied as z = B·r.
///
/// Construction validates the matrix; application is infallible.
pub trait Preconditioner<T> {
    fn apply(&self, r: &[T], z: &mut [T]);
}

/// Preconditioner kinds understood by the configuration surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PcKind {
    #[default]
    None,
    Jacobi,
}

impl fmt::Display for PcKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PcKind::None => "none",
            PcKind::Jacobi => "jacobi",
        })
    }
}

impl FromStr for PcKind {
    type Err = CgError;

    fn from_str(s: &str) -> Result<Self, CgError> {
        match s.to_ascii_lowercase().as_str() {
            "none" => Ok(PcKind::None),
            "jacobi" => Ok(PcKind::Jacobi),
            _ => Err(CgError::InvalidOption { name: "preconditioner", value: s.to_string() }),
        }
    }
}

pub mod jacobi;
pub use jacobi::Jacobi;
