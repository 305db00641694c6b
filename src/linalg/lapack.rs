//!
//! LinearAlgebraProvider backed by ndarray-linalg (LAPACK)
//!
//! Enabled with `--features openblas` (or `intel`).
//!
use super::{check_square, LinearAlgebraProvider};
use crate::error::{HmmError, Result};
use ndarray::prelude::*;
use ndarray_linalg::{Cholesky, Determinant, Inverse, Solve, UPLO};

#[derive(Debug, Clone, Copy, Default)]
pub struct LapackLinalg;

fn singular<E: std::fmt::Display>(e: E) -> HmmError {
    HmmError::SingularMatrix(e.to_string())
}

impl LinearAlgebraProvider for LapackLinalg {
    fn inverse(&self, a: &Array2<f64>) -> Result<Array2<f64>> {
        check_square(a)?;
        a.inv().map_err(singular)
    }
    fn determinant(&self, a: &Array2<f64>) -> Result<f64> {
        check_square(a)?;
        a.det().map_err(singular)
    }
    fn cholesky(&self, a: &Array2<f64>) -> Result<Array2<f64>> {
        check_square(a)?;
        a.cholesky(UPLO::Lower).map_err(singular)
    }
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
        let n = check_square(a)?;
        if b.len() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }
        a.solve(b).map_err(singular)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::NativeLinalg;
    use approx::assert_abs_diff_eq;

    #[test]
    fn lapack_agrees_with_native() {
        let a = arr2(&[[4.0, 2.0, 0.6], [2.0, 5.0, 1.0], [0.6, 1.0, 3.0]]);
        assert_abs_diff_eq!(
            LapackLinalg.determinant(&a).unwrap(),
            NativeLinalg.determinant(&a).unwrap(),
            epsilon = 1e-9
        );
        let l0 = LapackLinalg.cholesky(&a).unwrap();
        let l1 = NativeLinalg.cholesky(&a).unwrap();
        let i0 = LapackLinalg.inverse(&a).unwrap();
        let i1 = NativeLinalg.inverse(&a).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_abs_diff_eq!(l0[[i, j]], l1[[i, j]], epsilon = 1e-9);
                assert_abs_diff_eq!(i0[[i, j]], i1[[i, j]], epsilon = 1e-9);
            }
        }
    }
}
