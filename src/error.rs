use thiserror::Error;

use crate::backend::BackendKind;
use crate::matrix::SparseFormat;
use crate::preconditioner::PcKind;

// Unified error type for cgbench

#[derive(Error, Debug)]
pub enum CgError {
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed matrix file (line {line}): {msg}")]
    Parse { line: usize, msg: String },
    #[error("unsupported matrix type: {0}")]
    UnsupportedMatrixType(String),
    #[error("matrix must be square, got {rows}x{cols}")]
    NonSquare { rows: usize, cols: usize },
    #[error("matrix format {0} not supported by the {1} backend")]
    UnsupportedFormat(SparseFormat, &'static str),
    #[error("preconditioner {0} not supported by the {1} backend")]
    UnsupportedPreconditioner(PcKind, &'static str),
    #[error("backend {0} is not available in this build")]
    UnavailableBackend(BackendKind),
    #[error("invalid value for option {name}: {value}")]
    InvalidOption { name: &'static str, value: String },
    #[error("missing diagonal entry in row {0}")]
    MissingDiagonal(usize),
    #[error("zero diagonal entry in row {0}")]
    ZeroDiagonal(usize),
    #[error("right-hand side has length {got}, matrix dimension is {expected}")]
    RhsLength { got: usize, expected: usize },
    #[error("indefinite matrix detected (p^T A p <= 0)")]
    IndefiniteMatrix,
}
