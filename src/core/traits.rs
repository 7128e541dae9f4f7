//! Kernel dispatch trait for the CG engine.

use crate::error::CgError;
use crate::matrix::{CooMatrix, SparseFormat};
use crate::preconditioner::PcKind;

/// The numeric kernels a concrete backend must provide.
///
/// The engine owns the dense vectors and the iteration; a backend owns the
/// matrix (in exactly one storage layout) and the preconditioner data, and
/// supplies the five kernels the iteration is built from. The engine never
/// branches on the concrete backend type.
pub trait CgBackend<T>: Send {
    /// Backend name used in error reports and summaries.
    fn name(&self) -> &'static str;

    /// Storage layouts this backend can run kernels on.
    fn supports_format(&self, format: SparseFormat) -> bool;

    /// Preconditioners this backend can apply.
    fn supports_preconditioner(&self, pc: PcKind) -> bool;

    /// Convert the triplet matrix into the backend's storage layout and set
    /// up the preconditioner. Called once, before any kernel.
    fn prepare(&mut self, coo: CooMatrix<T>, format: SparseFormat, pc: PcKind)
    -> Result<(), CgError>;

    /// y := A·x
    fn matvec(&self, x: &[T], y: &mut [T]);

    /// y := a·x + y
    fn axpy(&self, a: T, x: &[T], y: &mut [T]);

    /// y := x + a·y
    fn xpay(&self, x: &[T], a: T, y: &mut [T]);

    /// ⟨x, y⟩
    fn dot(&self, x: &[T], y: &[T]) -> T;

    /// z := B·r. Identity when no preconditioner was prepared.
    fn apply_preconditioner(&self, r: &[T], z: &mut [T]);
}
