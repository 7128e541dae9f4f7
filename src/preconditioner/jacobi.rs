// Jacobi preconditioner implementation

use num_traits::Float;

use crate::error::CgError;
use crate::matrix::CooMatrix;
use crate::preconditioner::Preconditioner;

/// Jacobi preconditioner: B = D⁻¹, the inverse of the matrix diagonal.
pub struct Jacobi<T> {
    pub(crate) inv_diag: Vec<T>,
}

impl<T: Float> Jacobi<T> {
    /// Extract the inverse diagonal from the triplet matrix.
    ///
    /// One forward scan; a row with several diagonal entries keeps the last
    /// one. Fails if any row has no diagonal entry or a zero one.
    pub fn from_coo(coo: &CooMatrix<T>) -> Result<Self, CgError> {
        let mut diag = vec![None; coo.n];
        for ((&r, &c), &v) in coo.rows.iter().zip(&coo.cols).zip(&coo.values) {
            if r == c {
                if v == T::zero() {
                    return Err(CgError::ZeroDiagonal(r));
                }
                diag[r] = Some(v);
            }
        }
        let mut inv_diag = Vec::with_capacity(coo.n);
        for (row, entry) in diag.into_iter().enumerate() {
            match entry {
                Some(value) => inv_diag.push(T::one() / value),
                None => return Err(CgError::MissingDiagonal(row)),
            }
        }
        Ok(Self { inv_diag })
    }

    pub fn inv_diag(&self) -> &[T] {
        &self.inv_diag
    }
}

impl<T: Float> Preconditioner<T> for Jacobi<T> {
    fn apply(&self, r: &[T], z: &mut [T]) {
        debug_assert_eq!(r.len(), self.inv_diag.len());
        for i in 0..r.len() {
            z[i] = self.inv_diag[i] * r[i];
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inverts_the_diagonal() {
        let mut coo = CooMatrix::<f64>::new(2);
        coo.push(0, 0, 2.0);
        coo.push(0, 1, 1.0);
        coo.push(1, 1, 4.0);
        let jacobi = Jacobi::from_coo(&coo).unwrap();
        assert_eq!(jacobi.inv_diag(), &[0.5, 0.25]);

        let mut z = vec![0.0; 2];
        jacobi.apply(&[2.0, 8.0], &mut z);
        assert_eq!(z, vec![1.0, 2.0]);
    }

    #[test]
    fn rejects_zero_diagonal() {
        let mut coo = CooMatrix::<f64>::new(2);
        coo.push(0, 0, 0.0);
        coo.push(1, 1, 1.0);
        assert!(matches!(Jacobi::from_coo(&coo), Err(CgError::ZeroDiagonal(0))));
    }

    #[test]
    fn rejects_missing_diagonal() {
        let mut coo = CooMatrix::<f64>::new(2);
        coo.push(0, 0, 1.0);
        coo.push(1, 0, 1.0);
        assert!(matches!(Jacobi::from_coo(&coo), Err(CgError::MissingDiagonal(1))));
    }
}
