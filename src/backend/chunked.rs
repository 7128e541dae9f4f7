//! Chunk-parallel backend: one rayon worker per contiguous row chunk.
//!
//! The matrix is split at prepare time according to a [`WorkDistribution`];
//! each kernel then maps chunks to rayon tasks. Output vectors are split
//! into disjoint per-chunk slices, so chunk workers never share mutable
//! state. Dot products reduce chunk-partial sums before the scalar result
//! is used.

use num_traits::Float;
use rayon::prelude::*;

use crate::backend::Caps;
use crate::core::CgBackend;
use crate::error::CgError;
use crate::matrix::{CooMatrix, SparseFormat, SplitCsrMatrix, SplitEllMatrix};
use crate::parallel::WorkDistribution;
use crate::preconditioner::{Jacobi, PcKind};

/// The one active split representation of a solve. The triplet layout has
/// no split form; requesting it is rejected by the capability check.
pub enum SplitStorage<T> {
    Csr(SplitCsrMatrix<T>),
    Ell(SplitEllMatrix<T>),
}

pub struct ChunkedBackend<T> {
    chunks: usize,
    wd: Option<WorkDistribution>,
    storage: Option<SplitStorage<T>>,
    jacobi: Option<Jacobi<T>>,
}

impl<T> ChunkedBackend<T> {
    const CAPS: Caps = Caps::CSR.union(Caps::ELL).union(Caps::JACOBI);

    pub fn new(chunks: usize) -> Self {
        Self { chunks: chunks.max(1), wd: None, storage: None, jacobi: None }
    }

    fn wd(&self) -> &WorkDistribution {
        match &self.wd {
            Some(wd) => wd,
            None => unreachable!("kernel before prepare"),
        }
    }
}

impl<T: Float + Send + Sync> CgBackend<T> for ChunkedBackend<T> {
    fn name(&self) -> &'static str {
        "chunked"
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
        let wd = WorkDistribution::new(coo.n, self.chunks);
        self.jacobi = match pc {
            PcKind::Jacobi => Some(Jacobi::from_coo(&coo)?),
            PcKind::None => None,
        };
        self.storage = Some(match format {
            SparseFormat::Csr => SplitStorage::Csr(SplitCsrMatrix::from_coo(&coo, &wd)),
            SparseFormat::Ell => SplitStorage::Ell(SplitEllMatrix::from_coo(&coo, &wd)),
            SparseFormat::Coo => {
                return Err(CgError::UnsupportedFormat(format, self.name()));
            }
        });
        self.wd = Some(wd);
        Ok(())
    }

    fn matvec(&self, x: &[T], y: &mut [T]) {
        let slices = self.wd().split_mut(y);
        match self.storage.as_ref() {
            Some(SplitStorage::Csr(m)) => {
                m.chunks.par_iter().zip(slices).for_each(|(chunk, y_c)| chunk.spmv(x, y_c));
            }
            Some(SplitStorage::Ell(m)) => {
                m.chunks.par_iter().zip(slices).for_each(|(chunk, y_c)| chunk.spmv(x, y_c));
            }
            None => unreachable!("matvec before prepare"),
        }
    }

    fn axpy(&self, a: T, x: &[T], y: &mut [T]) {
        let wd = self.wd();
        wd.split_mut(y).into_par_iter().enumerate().for_each(|(c, y_c)| {
            let x_c = &x[wd.chunk_range(c)];
            for (yi, xi) in y_c.iter_mut().zip(x_c) {
                *yi = a * *xi + *yi;
            }
        });
    }

    fn xpay(&self, x: &[T], a: T, y: &mut [T]) {
        let wd = self.wd();
        wd.split_mut(y).into_par_iter().enumerate().for_each(|(c, y_c)| {
            let x_c = &x[wd.chunk_range(c)];
            for (yi, xi) in y_c.iter_mut().zip(x_c) {
                *yi = *xi + a * *yi;
            }
        });
    }

    // Chunk-partial sums are reduced into the scalar result; the reduce is
    // the synchronization point every chunk must reach.
    fn dot(&self, x: &[T], y: &[T]) -> T {
        let wd = self.wd();
        (0..wd.num_chunks())
            .into_par_iter()
            .map(|c| {
                let range = wd.chunk_range(c);
                x[range.clone()]
                    .iter()
                    .zip(&y[range])
                    .map(|(xi, yi)| *xi * *yi)
                    .fold(T::zero(), |acc, v| acc + v)
            })
            .reduce(|| T::zero(), |a, b| a + b)
    }

    fn apply_preconditioner(&self, r: &[T], z: &mut [T]) {
        let wd = self.wd();
        match &self.jacobi {
            Some(jacobi) => {
                let inv_diag = jacobi.inv_diag();
                wd.split_mut(z).into_par_iter().enumerate().for_each(|(c, z_c)| {
                    let range = wd.chunk_range(c);
                    for (i, zi) in range.zip(z_c.iter_mut()) {
                        *zi = inv_diag[i] * r[i];
                    }
                });
            }
            None => z.copy_from_slice(r),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::SerialBackend;

    fn banded_coo(n: usize) -> CooMatrix<f64> {
        let mut coo = CooMatrix::new(n);
        for i in 0..n {
            coo.push(i, i, 2.0 + (i % 3) as f64);
            if i + 1 < n {
                coo.push(i, i + 1, -1.0);
                coo.push(i + 1, i, -1.0);
            }
        }
        coo
    }

    fn vectors(n: usize) -> (Vec<f64>, Vec<f64>) {
        let x: Vec<f64> = (0..n).map(|i| (i as f64 * 0.7).sin()).collect();
        let y: Vec<f64> = (0..n).map(|i| (i as f64 * 1.3).cos()).collect();
        (x, y)
    }

    #[test]
    fn kernels_match_serial_backend() {
        let n = 23;
        for format in [SparseFormat::Csr, SparseFormat::Ell] {
            let mut serial = SerialBackend::new();
            serial.prepare(banded_coo(n), format, PcKind::Jacobi).unwrap();
            let mut chunked = ChunkedBackend::new(4);
            chunked.prepare(banded_coo(n), format, PcKind::Jacobi).unwrap();

            let (x, y) = vectors(n);

            let mut expected = vec![0.0; n];
            let mut got = vec![0.0; n];
            serial.matvec(&x, &mut expected);
            chunked.matvec(&x, &mut got);
            assert_eq!(got, expected, "matvec, format {format}");

            let mut expected = y.clone();
            let mut got = y.clone();
            serial.axpy(0.3, &x, &mut expected);
            chunked.axpy(0.3, &x, &mut got);
            assert_eq!(got, expected, "axpy, format {format}");

            serial.xpay(&x, -0.5, &mut expected);
            chunked.xpay(&x, -0.5, &mut got);
            assert_eq!(got, expected, "xpay, format {format}");

            let d_serial = serial.dot(&x, &y);
            let d_chunked = chunked.dot(&x, &y);
            assert!((d_serial - d_chunked).abs() < 1e-12, "dot, format {format}");

            let mut expected = vec![0.0; n];
            let mut got = vec![0.0; n];
            serial.apply_preconditioner(&y, &mut expected);
            chunked.apply_preconditioner(&y, &mut got);
            assert_eq!(got, expected, "preconditioner, format {format}");
        }
    }

    #[test]
    fn more_chunks_than_rows_still_works() {
        let n = 3;
        let mut chunked = ChunkedBackend::new(8);
        chunked.prepare(banded_coo(n), SparseFormat::Csr, PcKind::None).unwrap();
        let (x, _) = vectors(n);
        let mut serial = SerialBackend::new();
        serial.prepare(banded_coo(n), SparseFormat::Csr, PcKind::None).unwrap();
        let mut expected = vec![0.0; n];
        let mut got = vec![0.0; n];
        serial.matvec(&x, &mut expected);
        chunked.matvec(&x, &mut got);
        assert_eq!(got, expected);
    }

    #[test]
    fn rejects_triplet_layout() {
        let mut chunked = ChunkedBackend::new(2);
        assert!(!chunked.supports_format(SparseFormat::Coo));
        let err = chunked.prepare(banded_coo(4), SparseFormat::Coo, PcKind::None);
        assert!(matches!(err, Err(CgError::UnsupportedFormat(SparseFormat::Coo, _))));
    }
}
