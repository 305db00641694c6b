//!
//! Multivariate Gaussian emission density of a hidden state
//!
use crate::error::{HmmError, Result};
use crate::linalg::LinearAlgebraProvider;
use ndarray::prelude::*;
use rand::prelude::*;
use std::f64::consts::PI;

///
/// Relative tolerance of `|C[i,j] - C[j,i]|` accepted as symmetric
///
const SYMMETRY_TOLERANCE: f64 = 1e-9;

///
/// `N(mean, covariance)` for one hidden state.
///
/// precision, cholesky factor, determinant and the normalization constants
/// are derived once in `new`, so any non positive-definite covariance is
/// rejected there rather than at the first density evaluation.
///
#[derive(Debug, Clone)]
pub struct GaussianEmission {
    mean: Array1<f64>,
    covariance: Array2<f64>,
    ///
    /// inverse of covariance
    precision: Array2<f64>,
    ///
    /// lower triangular `L` with `covariance = L L^T`
    cholesky: Array2<f64>,
    determinant: f64,
    ///
    /// `log((2 pi)^(-D/2) det^(-1/2))`
    log_norm: f64,
    ///
    /// `(2 pi)^(-D/2) det^(-1/2)`
    norm: f64,
}

impl GaussianEmission {
    ///
    /// Create from mean (length D) and covariance (D x D, symmetric
    /// positive-definite).
    ///
    /// # Errors
    ///
    /// * `DimensionMismatch` if covariance is not D x D
    /// * `InvalidParameter` if mean is empty or not finite, or covariance is not symmetric
    /// * `SingularMatrix` if covariance is not positive-definite
    ///
    pub fn new<L: LinearAlgebraProvider>(
        mean: Array1<f64>,
        covariance: Array2<f64>,
        linalg: &L,
    ) -> Result<GaussianEmission> {
        let d = mean.len();
        if d == 0 {
            return Err(HmmError::InvalidParameter(
                "mean of a gaussian is empty".to_string(),
            ));
        }
        if covariance.nrows() != d {
            return Err(HmmError::DimensionMismatch {
                expected: d,
                actual: covariance.nrows(),
            });
        }
        if covariance.ncols() != d {
            return Err(HmmError::DimensionMismatch {
                expected: d,
                actual: covariance.ncols(),
            });
        }
        if mean.iter().any(|x| !x.is_finite()) {
            return Err(HmmError::InvalidParameter(format!(
                "mean {} is not finite",
                mean
            )));
        }
        for i in 0..d {
            for j in 0..i {
                let (a, b) = (covariance[[i, j]], covariance[[j, i]]);
                if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0) {
                    return Err(HmmError::InvalidParameter(format!(
                        "covariance is not symmetric at ({}, {})",
                        i, j
                    )));
                }
            }
        }

        let cholesky = linalg.cholesky(&covariance)?;
        let precision = linalg.inverse(&covariance)?;
        let determinant = linalg.determinant(&covariance)?;
        if !(determinant > 0.0) {
            return Err(HmmError::SingularMatrix(format!(
                "covariance has determinant {}",
                determinant
            )));
        }

        let log_norm = -0.5 * d as f64 * (2.0 * PI).ln() - 0.5 * determinant.ln();
        let norm = (2.0 * PI).powf(-0.5 * d as f64) * determinant.powf(-0.5);

        Ok(GaussianEmission {
            mean,
            covariance,
            precision,
            cholesky,
            determinant,
            log_norm,
            norm,
        })
    }
    ///
    /// `N(mean, I)`
    ///
    pub fn with_identity<L: LinearAlgebraProvider>(
        mean: Array1<f64>,
        linalg: &L,
    ) -> Result<GaussianEmission> {
        let d = mean.len();
        GaussianEmission::new(mean, Array2::eye(d), linalg)
    }
    pub fn dim(&self) -> usize {
        self.mean.len()
    }
    pub fn mean(&self) -> &Array1<f64> {
        &self.mean
    }
    pub fn covariance(&self) -> &Array2<f64> {
        &self.covariance
    }
    pub fn precision(&self) -> &Array2<f64> {
        &self.precision
    }
    pub fn cholesky(&self) -> &Array2<f64> {
        &self.cholesky
    }
    pub fn determinant(&self) -> f64 {
        self.determinant
    }
    ///
    /// Squared Mahalanobis distance `(x - mean)^T precision (x - mean)`
    ///
    pub fn mahalanobis(&self, x: ArrayView1<f64>) -> f64 {
        debug_assert_eq!(x.len(), self.dim());
        let diff = &x - &self.mean;
        diff.dot(&self.precision.dot(&diff))
    }
    ///
    /// Density at x
    ///
    /// It underflows to 0 easily in high dimension; use `logpdf` when
    /// multiplying many densities.
    ///
    pub fn pdf(&self, x: ArrayView1<f64>) -> f64 {
        self.norm * (-0.5 * self.mahalanobis(x)).exp()
    }
    ///
    /// Log density at x
    ///
    pub fn logpdf(&self, x: ArrayView1<f64>) -> f64 {
        self.log_norm - 0.5 * self.mahalanobis(x)
    }
    ///
    /// Draw a sample `mean + L z` where `z ~ N(0, I)` by Box-Muller.
    ///
    pub fn simulate<R: Rng>(&self, rng: &mut R) -> Array1<f64> {
        let z: Array1<f64> = (0..self.dim())
            .map(|_| {
                // flip [0, 1) to (0, 1] so that ln(u) is finite
                let u = 1.0 - rng.gen::<f64>();
                let v = 1.0 - rng.gen::<f64>();
                (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
            })
            .collect();
        &self.mean + &self.cholesky.dot(&z)
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linalg::NativeLinalg;
    use approx::assert_abs_diff_eq;
    use rand_xoshiro::Xoshiro256PlusPlus;

    #[test]
    fn gaussian_1d_pdf() {
        let e = GaussianEmission::new(arr1(&[1.0]), arr2(&[[4.0]]), &NativeLinalg).unwrap();
        assert_eq!(e.dim(), 1);
        assert_abs_diff_eq!(e.determinant(), 4.0, epsilon = 1e-12);
        assert_abs_diff_eq!(e.precision()[[0, 0]], 0.25, epsilon = 1e-12);
        assert_abs_diff_eq!(e.cholesky()[[0, 0]], 2.0, epsilon = 1e-12);
        // N(x=3 | 1, 2^2) = exp(-0.5) / (2 sqrt(2 pi))
        let expected = (-0.5f64).exp() / (2.0 * (2.0 * PI).sqrt());
        assert_abs_diff_eq!(e.pdf(arr1(&[3.0]).view()), expected, epsilon = 1e-12);
        assert_abs_diff_eq!(
            e.logpdf(arr1(&[3.0]).view()),
            expected.ln(),
            epsilon = 1e-12
        );
    }

    #[test]
    fn gaussian_2d_pdf_and_logpdf_agree() {
        let cov = arr2(&[[2.0, 0.3], [0.3, 1.0]]);
        let e = GaussianEmission::new(arr1(&[0.5, -1.0]), cov, &NativeLinalg).unwrap();
        assert_abs_diff_eq!(e.determinant(), 2.0 - 0.09, epsilon = 1e-12);
        for x in &[[0.5, -1.0], [1.0, 2.0], [-3.0, 0.0]] {
            let x = arr1(x);
            assert_abs_diff_eq!(e.pdf(x.view()).ln(), e.logpdf(x.view()), epsilon = 1e-10);
        }
        // peak value
        let peak = 1.0 / (2.0 * PI * (1.91f64).sqrt());
        assert_abs_diff_eq!(e.pdf(arr1(&[0.5, -1.0]).view()), peak, epsilon = 1e-12);
    }

    #[test]
    fn logpdf_is_finite_where_pdf_underflows() {
        let e = GaussianEmission::with_identity(Array1::zeros(3), &NativeLinalg).unwrap();
        let far = arr1(&[50.0, 50.0, 50.0]);
        assert_eq!(e.pdf(far.view()), 0.0);
        assert!(e.logpdf(far.view()).is_finite());
    }

    #[test]
    fn dimension_mismatch() {
        let e = GaussianEmission::new(arr1(&[0.0, 0.0]), Array2::eye(3), &NativeLinalg);
        assert_eq!(
            e.unwrap_err(),
            HmmError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
        let e = GaussianEmission::new(arr1(&[0.0, 0.0]), Array2::zeros((2, 3)), &NativeLinalg);
        assert_eq!(
            e.unwrap_err(),
            HmmError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn zero_row_covariance_fails_at_construction() {
        let cov = arr2(&[[1.0, 0.0], [0.0, 0.0]]);
        let e = GaussianEmission::new(arr1(&[0.0, 0.0]), cov, &NativeLinalg);
        assert!(matches!(e, Err(HmmError::SingularMatrix(_))));
    }

    #[test]
    fn asymmetric_covariance_is_rejected() {
        let cov = arr2(&[[1.0, 0.5], [0.0, 1.0]]);
        let e = GaussianEmission::new(arr1(&[0.0, 0.0]), cov, &NativeLinalg);
        assert!(matches!(e, Err(HmmError::InvalidParameter(_))));
    }

    #[test]
    fn simulate_moments() {
        let cov = arr2(&[[1.0, 0.8], [0.8, 2.0]]);
        let e = GaussianEmission::new(arr1(&[3.0, -2.0]), cov.clone(), &NativeLinalg).unwrap();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(0);
        let n = 20000;
        let xs: Vec<Array1<f64>> = (0..n).map(|_| e.simulate(&mut rng)).collect();
        let mean = xs.iter().fold(Array1::<f64>::zeros(2), |acc, x| acc + x) / n as f64;
        assert_abs_diff_eq!(mean[0], 3.0, epsilon = 0.05);
        assert_abs_diff_eq!(mean[1], -2.0, epsilon = 0.05);
        let mut c = Array2::<f64>::zeros((2, 2));
        for x in xs.iter() {
            let d = x - &mean;
            for i in 0..2 {
                for j in 0..2 {
                    c[[i, j]] += d[i] * d[j];
                }
            }
        }
        c /= n as f64;
        for i in 0..2 {
            for j in 0..2 {
                assert_abs_diff_eq!(c[[i, j]], cov[[i, j]], epsilon = 0.1);
            }
        }
    }
}
