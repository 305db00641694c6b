//!
//! Linear algebra capability set consumed by the HMM engine
//!
//! * `LinearAlgebraProvider`
//!     trait of inverse/determinant/cholesky/solve and small vector helpers
//! * `NativeLinalg`
//!     pure ndarray implementation (always available)
//! * `lapack::LapackLinalg`
//!     ndarray-linalg (LAPACK) implementation, with `lapack` feature
//!
use crate::error::{HmmError, Result};
use ndarray::prelude::*;
use std::cmp::Ordering;

#[cfg(feature = "lapack")]
pub mod lapack;

///
/// Matrix/vector operations the engine needs.
///
/// Matrix operations fail with `HmmError::SingularMatrix` when the input is
/// not invertible (or not positive-definite for `cholesky`), and with
/// `HmmError::DimensionMismatch` for non-square input.
///
pub trait LinearAlgebraProvider {
    ///
    /// Inverse matrix `A^-1`
    fn inverse(&self, a: &Array2<f64>) -> Result<Array2<f64>>;
    ///
    /// Determinant `det A`. A singular matrix has determinant 0.
    fn determinant(&self, a: &Array2<f64>) -> Result<f64>;
    ///
    /// Lower-triangular `L` with `A = L L^T`
    fn cholesky(&self, a: &Array2<f64>) -> Result<Array2<f64>>;
    ///
    /// `x` satisfying `A x = b`
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>>;

    fn dot(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> f64 {
        x.dot(&y)
    }
    fn mat_mul_vec(&self, a: &Array2<f64>, x: ArrayView1<f64>) -> Array1<f64> {
        a.dot(&x)
    }
    fn add(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        &x + &y
    }
    fn sub(&self, x: ArrayView1<f64>, y: ArrayView1<f64>) -> Array1<f64> {
        &x - &y
    }
    fn scale(&self, x: ArrayView1<f64>, s: f64) -> Array1<f64> {
        &x * s
    }
}

///
/// check that `a` is a square matrix without NaN/inf, and return its size.
///
pub fn check_square(a: &Array2<f64>) -> Result<usize> {
    let (n, m) = a.dim();
    if n != m {
        return Err(HmmError::DimensionMismatch {
            expected: n,
            actual: m,
        });
    }
    if a.iter().any(|x| !x.is_finite()) {
        return Err(HmmError::SingularMatrix(
            "matrix has a non-finite entry".to_string(),
        ));
    }
    Ok(n)
}

///
/// Linear algebra written with plain ndarray indexing.
///
/// * cholesky: Cholesky–Banachiewicz
/// * determinant/solve/inverse: LU with partial pivoting
///
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeLinalg;

/// result of LU decomposition `P A = L U`.
/// `L` (unit diagonal, below) and `U` (on and above diagonal) share `lu`.
struct Lu {
    lu: Array2<f64>,
    perm: Vec<usize>,
    sign: f64,
    singular: bool,
}

fn lu_decompose(a: &Array2<f64>) -> Lu {
    let n = a.nrows();
    let mut lu = a.clone();
    let mut perm: Vec<usize> = (0..n).collect();
    let mut sign = 1.0;
    let mut singular = false;

    for k in 0..n {
        let p = (k..n)
            .max_by(|&i, &j| {
                lu[[i, k]]
                    .abs()
                    .partial_cmp(&lu[[j, k]].abs())
                    .unwrap_or(Ordering::Equal)
            })
            .unwrap_or(k);
        if lu[[p, k]] == 0.0 {
            singular = true;
            continue;
        }
        if p != k {
            for j in 0..n {
                lu.swap([p, j], [k, j]);
            }
            perm.swap(p, k);
            sign = -sign;
        }
        for i in k + 1..n {
            let f = lu[[i, k]] / lu[[k, k]];
            lu[[i, k]] = f;
            for j in k + 1..n {
                lu[[i, j]] -= f * lu[[k, j]];
            }
        }
    }

    Lu {
        lu,
        perm,
        sign,
        singular,
    }
}

impl Lu {
    fn determinant(&self) -> f64 {
        if self.singular {
            0.0
        } else {
            self.sign * self.lu.diag().iter().product::<f64>()
        }
    }
    fn solve(&self, b: ArrayView1<f64>) -> Array1<f64> {
        let n = self.lu.nrows();
        // L y = P b
        let mut y = Array1::<f64>::zeros(n);
        for i in 0..n {
            let s: f64 = (0..i).map(|j| self.lu[[i, j]] * y[j]).sum();
            y[i] = b[self.perm[i]] - s;
        }
        // U x = y
        let mut x = Array1::<f64>::zeros(n);
        for i in (0..n).rev() {
            let s: f64 = (i + 1..n).map(|j| self.lu[[i, j]] * x[j]).sum();
            x[i] = (y[i] - s) / self.lu[[i, i]];
        }
        x
    }
}

impl LinearAlgebraProvider for NativeLinalg {
    fn inverse(&self, a: &Array2<f64>) -> Result<Array2<f64>> {
        let n = check_square(a)?;
        let lu = lu_decompose(a);
        if lu.singular {
            return Err(HmmError::SingularMatrix(
                "matrix is not invertible".to_string(),
            ));
        }
        let mut inv = Array2::<f64>::zeros((n, n));
        for j in 0..n {
            let mut e = Array1::<f64>::zeros(n);
            e[j] = 1.0;
            let col = lu.solve(e.view());
            inv.column_mut(j).assign(&col);
        }
        Ok(inv)
    }
    fn determinant(&self, a: &Array2<f64>) -> Result<f64> {
        check_square(a)?;
        Ok(lu_decompose(a).determinant())
    }
    fn cholesky(&self, a: &Array2<f64>) -> Result<Array2<f64>> {
        let n = check_square(a)?;
        let mut l = Array2::<f64>::zeros((n, n));
        for i in 0..n {
            for j in 0..=i {
                let s: f64 = (0..j).map(|k| l[[i, k]] * l[[j, k]]).sum();
                if i == j {
                    let d = a[[i, i]] - s;
                    if !(d > 0.0) {
                        return Err(HmmError::SingularMatrix(format!(
                            "matrix is not positive-definite (pivot {} = {})",
                            i, d
                        )));
                    }
                    l[[i, i]] = d.sqrt();
                } else {
                    l[[i, j]] = (a[[i, j]] - s) / l[[j, j]];
                }
            }
        }
        Ok(l)
    }
    fn solve(&self, a: &Array2<f64>, b: &Array1<f64>) -> Result<Array1<f64>> {
        let n = check_square(a)?;
        if b.len() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: b.len(),
            });
        }
        let lu = lu_decompose(a);
        if lu.singular {
            return Err(HmmError::SingularMatrix(
                "matrix is not invertible".to_string(),
            ));
        }
        Ok(lu.solve(b.view()))
    }
}

//
// Tests
//
