//! Sequential reference backend.

use num_traits::Float;

use crate::backend::Caps;
use crate::core::CgBackend;
use crate::error::CgError;
use crate::matrix::{CooMatrix, CsrMatrix, EllMatrix, SparseFormat};
use crate::preconditioner::{Jacobi, PcKind, Preconditioner};

/// The one active matrix representation of a solve.
pub enum SparseStorage<T> {
    Coo(CooMatrix<T>),
    Csr(CsrMatrix<T>),
    Ell(EllMatrix<T>),
}

/// Runs every kernel on the calling thread. The baseline all other
/// backends are measured against.
pub struct SerialBackend<T> {
    storage: Option<SparseStorage<T>>,
    jacobi: Option<Jacobi<T>>,
}

impl<T> SerialBackend<T> {
    const CAPS: Caps = Caps::COO.union(Caps::CSR).union(Caps::ELL).union(Caps::JACOBI);

    pub fn new() -> Self {
        Self { storage: None, jacobi: None }
    }
}

impl<T> Default for SerialBackend<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float + Send + Sync> CgBackend<T> for SerialBackend<T> {
    fn name(&self) -> &'static str {
        "serial"
    }

    fn supports_format(&self, format: SparseFormat) -> bool {
        Self::CAPS.contains(format.into())
    }

    fn supports_preconditioner(&self, pc: PcKind) -> bool {
        Self::CAPS.contains(pc.into())
    }

    fn prepare(
        &mut self,
        coo: CooMatrix<T>,
        format: SparseFormat,
        pc: PcKind,
    ) -> Result<(), CgError> {
        self.jacobi = match pc {
            PcKind::Jacobi => Some(Jacobi::from_coo(&coo)?),
            PcKind::None => None,
        };
        // The triplet form is dropped here unless it is the active layout.
        self.storage = Some(match format {
            SparseFormat::Coo => SparseStorage::Coo(coo),
            SparseFormat::Csr => SparseStorage::Csr(CsrMatrix::from_coo(&coo)),
            SparseFormat::Ell => SparseStorage::Ell(EllMatrix::from_coo(&coo)),
        });
        Ok(())
    }

    fn matvec(&self, x: &[T], y: &mut [T]) {
        match self.storage.as_ref() {
            Some(SparseStorage::Coo(m)) => m.spmv(x, y),
            Some(SparseStorage::Csr(m)) => m.spmv(x, y),
            Some(SparseStorage::Ell(m)) => m.spmv(x, y),
            None => unreachable!("matvec before prepare"),
        }
    }

    fn axpy(&self, a: T, x: &[T], y: &mut [T]) {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = a * *xi + *yi;
        }
    }

    fn xpay(&self, x: &[T], a: T, y: &mut [T]) {
        for (yi, xi) in y.iter_mut().zip(x) {
            *yi = *xi + a * *yi;
        }
    }

    fn dot(&self, x: &[T], y: &[T]) -> T {
        x.iter().zip(y).map(|(xi, yi)| *xi * *yi).fold(T::zero(), |acc, v| acc + v)
    }

    fn apply_preconditioner(&self, r: &[T], z: &mut [T]) {
        match &self.jacobi {
            Some(jacobi) => jacobi.apply(r, z),
            None => z.copy_from_slice(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prepared(format: SparseFormat, pc: PcKind) -> SerialBackend<f64> {
        // [[2, 1, 0], [1, 3, 0], [0, 0, 4]]
        let mut coo = CooMatrix::new(3);
        coo.push(0, 0, 2.0);
        coo.push(0, 1, 1.0);
        coo.push(1, 0, 1.0);
        coo.push(1, 1, 3.0);
        coo.push(2, 2, 4.0);
        let mut backend = SerialBackend::new();
        backend.prepare(coo, format, pc).unwrap();
        backend
    }

    #[test]
    fn matvec_agrees_across_formats() {
        let x = [1.0, -1.0, 0.5];
        let mut reference = vec![0.0; 3];
        prepared(SparseFormat::Coo, PcKind::None).matvec(&x, &mut reference);
        for format in [SparseFormat::Csr, SparseFormat::Ell] {
            let mut y = vec![0.0; 3];
            prepared(format, PcKind::None).matvec(&x, &mut y);
            assert_eq!(y, reference, "format {format}");
        }
    }

    #[test]
    fn vector_kernels() {
        let backend = prepared(SparseFormat::Csr, PcKind::None);
        let mut y = vec![1.0, 2.0, 3.0];
        backend.axpy(2.0, &[1.0, 1.0, 1.0], &mut y);
        assert_eq!(y, vec![3.0, 4.0, 5.0]);
        backend.xpay(&[1.0, 1.0, 1.0], 2.0, &mut y);
        assert_eq!(y, vec![7.0, 9.0, 11.0]);
        assert_eq!(backend.dot(&[1.0, 2.0, 3.0], &[4.0, 5.0, 6.0]), 32.0);
    }

    #[test]
    fn preconditioner_defaults_to_identity() {
        let backend = prepared(SparseFormat::Csr, PcKind::None);
        let mut z = vec![0.0; 3];
        backend.apply_preconditioner(&[1.0, 2.0, 3.0], &mut z);
        assert_eq!(z, vec![1.0, 2.0, 3.0]);

        let backend = prepared(SparseFormat::Csr, PcKind::Jacobi);
        backend.apply_preconditioner(&[2.0, 3.0, 4.0], &mut z);
        assert_eq!(z, vec![1.0, 1.0, 1.0]);
    }
}
