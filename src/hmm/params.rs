//!
//! Parameters of the Gaussian HMM
//!
//! * `TransitionModel`: N x N row-stochastic matrix
//! * `InitialDistribution`: length N probability vector
//! * `HmmParams`: immutable snapshot of all parameters, one per EM iteration
//!
use super::emission::GaussianEmission;
use crate::error::{HmmError, Result};
use ndarray::prelude::*;

///
/// Tolerance of `|sum - 1|` for probability vectors
///
pub const PROB_TOLERANCE: f64 = 1e-9;

///
/// check the vector is a probability distribution
/// (all entries in `[0, 1]` and the sum is 1).
///
fn check_distribution(v: ArrayView1<f64>, name: &str) -> Result<()> {
    if let Some(x) = v.iter().find(|&&x| !(0.0..=1.0).contains(&x)) {
        return Err(HmmError::InvalidParameter(format!(
            "{} has an entry {} out of [0, 1]",
            name, x
        )));
    }
    let sum = v.sum();
    if (sum - 1.0).abs() > PROB_TOLERANCE {
        return Err(HmmError::InvalidParameter(format!(
            "{} sums to {}, not 1",
            name, sum
        )));
    }
    Ok(())
}

///
/// State transition probability matrix `A[i, j] = P(state j at t+1 | state i at t)`
///
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionModel {
    matrix: Array2<f64>,
}

impl TransitionModel {
    ///
    /// Create from a square matrix whose rows are probability distributions.
    ///
    pub fn new(matrix: Array2<f64>) -> Result<TransitionModel> {
        let (n, m) = matrix.dim();
        if n == 0 {
            return Err(HmmError::InvalidParameter(
                "transition matrix is empty".to_string(),
            ));
        }
        if n != m {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: m,
            });
        }
        for (i, row) in matrix.outer_iter().enumerate() {
            check_distribution(row, &format!("transition row {}", i))?;
        }
        Ok(TransitionModel { matrix })
    }
    ///
    /// `(I + 0.1) / (1 + 0.1 n)`
    ///
    /// Every row is near-uniform with a bias toward staying in the same state.
    ///
    pub fn near_uniform(n_states: usize) -> TransitionModel {
        let mut matrix = Array2::<f64>::eye(n_states) + 0.1;
        matrix /= 1.0 + 0.1 * n_states as f64;
        TransitionModel { matrix }
    }
    pub fn n_states(&self) -> usize {
        self.matrix.nrows()
    }
    ///
    /// `P(i -> j)`
    ///
    #[inline]
    pub fn prob(&self, i: usize, j: usize) -> f64 {
        self.matrix[[i, j]]
    }
    pub fn row(&self, i: usize) -> ArrayView1<f64> {
        self.matrix.row(i)
    }
    pub fn matrix(&self) -> &Array2<f64> {
        &self.matrix
    }
}

///
/// Initial state distribution `pi[i] = P(state i at t=0)`
///
#[derive(Debug, Clone, PartialEq)]
pub struct InitialDistribution {
    probs: Array1<f64>,
}

impl InitialDistribution {
    pub fn new(probs: Array1<f64>) -> Result<InitialDistribution> {
        if probs.is_empty() {
            return Err(HmmError::InvalidParameter(
                "initial distribution is empty".to_string(),
            ));
        }
        check_distribution(probs.view(), "initial distribution")?;
        Ok(InitialDistribution { probs })
    }
    pub fn uniform(n_states: usize) -> InitialDistribution {
        InitialDistribution {
            probs: Array1::from_elem(n_states, 1.0 / n_states as f64),
        }
    }
    pub fn n_states(&self) -> usize {
        self.probs.len()
    }
    #[inline]
    pub fn prob(&self, i: usize) -> f64 {
        self.probs[i]
    }
    pub fn probs(&self) -> ArrayView1<f64> {
        self.probs.view()
    }
}

///
/// A full set of HMM parameters.
///
/// The forward/backward/posterior passes and the re-estimation are
/// implemented on this type. Re-estimation returns a new `HmmParams`
/// instead of modifying itself.
///
#[derive(Debug, Clone)]
pub struct HmmParams {
    pub(crate) transition: TransitionModel,
    pub(crate) initial: InitialDistribution,
    /// `emissions[i]` is the emission density of state i
    pub(crate) emissions: Vec<GaussianEmission>,
}

impl HmmParams {
    ///
    /// Bundle the parameters, checking that the number of states and
    /// the observation dimensions agree.
    ///
    pub fn new(
        transition: TransitionModel,
        initial: InitialDistribution,
        emissions: Vec<GaussianEmission>,
    ) -> Result<HmmParams> {
        let params = HmmParams {
            transition,
            initial,
            emissions,
        };
        params.shape()?;
        Ok(params)
    }
    ///
    /// `(N, D)` of the parameters, or an error if they are inconsistent.
    ///
    pub fn shape(&self) -> Result<(usize, usize)> {
        let n = self.transition.n_states();
        if n == 0 {
            return Err(HmmError::InvalidParameter("no states".to_string()));
        }
        if self.initial.n_states() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: self.initial.n_states(),
            });
        }
        if self.emissions.len() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: self.emissions.len(),
            });
        }
        let d = self.emissions[0].dim();
        if let Some(e) = self.emissions.iter().find(|e| e.dim() != d) {
            return Err(HmmError::DimensionMismatch {
                expected: d,
                actual: e.dim(),
            });
        }
        Ok((n, d))
    }
    pub fn n_states(&self) -> usize {
        self.transition.n_states()
    }
    pub fn obs_dim(&self) -> usize {
        self.emissions[0].dim()
    }
    pub fn transition(&self) -> &TransitionModel {
        &self.transition
    }
    pub fn initial(&self) -> &InitialDistribution {
        &self.initial
    }
    pub fn emissions(&self) -> &[GaussianEmission] {
        &self.emissions
    }
    ///
    /// Check that the sequence has at least `min_len` observations, and
    /// that every observation is a finite vector of length D.
    ///
    pub fn check_observations(&self, observations: &[Array1<f64>], min_len: usize) -> Result<()> {
        if observations.len() < min_len {
            return Err(HmmError::SequenceTooShort {
                len: observations.len(),
                min: min_len,
            });
        }
        let d = self.obs_dim();
        for (t, x) in observations.iter().enumerate() {
            if x.len() != d || x.iter().any(|v| !v.is_finite()) {
                return Err(HmmError::InvalidObservation {
                    t,
                    expected: d,
                    actual: x.len(),
                });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for HmmParams {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "pi: {}", self.initial.probs)?;
        writeln!(f, "A:\n{}", self.transition.matrix)?;
        for (i, e) in self.emissions.iter().enumerate() {
            writeln!(f, "state#{} mean={} cov={}", i, e.mean(), e.covariance())?;
        }
        Ok(())
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
    use test_case::test_case;

    #[test_case(1 ; "single state")]
    #[test_case(2 ; "two states")]
    #[test_case(5 ; "five states")]
    fn near_uniform_rows_are_distributions(n: usize) {
        let a = TransitionModel::near_uniform(n);
        assert_eq!(a.n_states(), n);
        for i in 0..n {
            assert_abs_diff_eq!(a.row(i).sum(), 1.0, epsilon = PROB_TOLERANCE);
            for j in 0..n {
                if i != j {
                    assert!(a.prob(i, i) > a.prob(i, j));
                }
            }
        }
        // accepted by the checked constructor too
        assert!(TransitionModel::new(a.matrix().clone()).is_ok());

        let pi = InitialDistribution::uniform(n);
        assert_abs_diff_eq!(pi.probs().sum(), 1.0, epsilon = PROB_TOLERANCE);
    }

    #[test]
    fn near_uniform_two_states() {
        let a = TransitionModel::near_uniform(2);
        assert_abs_diff_eq!(a.prob(0, 0), 1.1 / 1.2, epsilon = 1e-12);
        assert_abs_diff_eq!(a.prob(0, 1), 0.1 / 1.2, epsilon = 1e-12);
    }

    #[test]
    fn invalid_transition() {
        assert!(TransitionModel::new(arr2(&[[0.5, 0.4], [0.5, 0.5]])).is_err());
        assert!(TransitionModel::new(arr2(&[[1.5, -0.5], [0.5, 0.5]])).is_err());
        assert!(TransitionModel::new(Array2::zeros((2, 3))).is_err());
        assert!(TransitionModel::new(Array2::zeros((0, 0))).is_err());
        assert!(TransitionModel::new(arr2(&[[f64::NAN, 1.0], [0.5, 0.5]])).is_err());
    }

    #[test]
    fn invalid_initial() {
        assert!(InitialDistribution::new(arr1(&[0.3, 0.3])).is_err());
        assert!(InitialDistribution::new(arr1(&[])).is_err());
        assert!(InitialDistribution::new(arr1(&[0.3, 0.7])).is_ok());
    }

    #[test]
    fn params_shape() {
        let l = NativeLinalg;
        let e1 = GaussianEmission::with_identity(arr1(&[0.0]), &l).unwrap();
        let e2 = GaussianEmission::with_identity(arr1(&[0.0, 1.0]), &l).unwrap();
        let ok = HmmParams::new(
            TransitionModel::near_uniform(2),
            InitialDistribution::uniform(2),
            vec![e1.clone(), e1.clone()],
        )
        .unwrap();
        assert_eq!(ok.shape().unwrap(), (2, 1));
        println!("{}", ok);

        // state count mismatch
        let e = HmmParams::new(
            TransitionModel::near_uniform(2),
            InitialDistribution::uniform(3),
            vec![e1.clone(), e1.clone()],
        );
        assert!(e.is_err());
        // emission dim mismatch
        let e = HmmParams::new(
            TransitionModel::near_uniform(2),
            InitialDistribution::uniform(2),
            vec![e1, e2],
        );
        assert_eq!(
            e.unwrap_err(),
            HmmError::DimensionMismatch {
                expected: 1,
                actual: 2
            }
        );
    }

    #[test]
    fn params_check_observations() {
        let l = NativeLinalg;
        let e = GaussianEmission::with_identity(arr1(&[0.0, 0.0]), &l).unwrap();
        let params = HmmParams::new(
            TransitionModel::near_uniform(2),
            InitialDistribution::uniform(2),
            vec![e.clone(), e],
        )
        .unwrap();
        assert!(params
            .check_observations(&[arr1(&[0.0, 1.0]), arr1(&[2.0, 1.0])], 2)
            .is_ok());
        assert_eq!(
            params.check_observations(&[arr1(&[0.0, 1.0]), arr1(&[2.0])], 1),
            Err(HmmError::InvalidObservation {
                t: 1,
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            params.check_observations(&[arr1(&[0.0, 1.0])], 2),
            Err(HmmError::SequenceTooShort { len: 1, min: 2 })
        );
    }
}
