//!
//! Forward algorithm (alpha pass) with per-step scaling
//!
use super::params::HmmParams;
use super::table::EmissionTable;
use crate::error::{Degeneracy, HmmError, Result};
use log::warn;
use ndarray::prelude::*;

///
/// Result of the forward pass
///
/// * `alpha[t, i]`: scaled forward probability, each row sums to 1
/// * `scale[t]`: `c[t]`, reciprocal of the row sum before normalization.
///   The sum is taken over the shifted densities of `EmissionTable`, so
///   `c[t]` is `exp(-s[t])` times the reciprocal of the unshifted sum.
///
#[derive(Debug, Clone)]
pub struct ForwardTable {
    pub alpha: Array2<f64>,
    pub scale: Array1<f64>,
    ///
    /// sum of the emission table shifts (see `EmissionTable`)
    log_shift: f64,
}

impl ForwardTable {
    pub fn n_steps(&self) -> usize {
        self.alpha.nrows()
    }
    ///
    /// `log P(x) = -sum_t log c[t]`
    ///
    pub fn log_likelihood(&self) -> f64 {
        -self.scale.iter().map(|c| c.ln()).sum::<f64>() + self.log_shift
    }
}

impl HmmParams {
    ///
    /// Run the forward algorithm
    ///
    /// ```text
    /// alpha[0, i] = pi[i] b_i(x[0])
    /// alpha[t, i] = (sum_j alpha[t-1, j] A[j, i]) b_i(x[t])
    /// c[t] = 1 / sum_i alpha[t, i]
    /// alpha[t, i] <- c[t] alpha[t, i]
    /// ```
    ///
    /// A zero unscaled sum at t means the observation cannot be emitted
    /// under these parameters, and is reported as `Degeneracy::ZeroLikelihood`.
    /// The table must have one column per state (`DimensionMismatch` otherwise).
    ///
    pub fn forward(&self, emission: &EmissionTable) -> Result<ForwardTable> {
        let n = self.n_states();
        if emission.n_states() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: emission.n_states(),
            });
        }
        let n_steps = emission.n_steps();
        let mut alpha = Array2::<f64>::zeros((n_steps, n));
        let mut scale = Array1::<f64>::zeros(n_steps);

        for t in 0..n_steps {
            for i in 0..n {
                let prior = if t == 0 {
                    self.initial.prob(i)
                } else {
                    (0..n)
                        .map(|j| alpha[[t - 1, j]] * self.transition.prob(j, i))
                        .sum::<f64>()
                };
                let value = prior * emission.b(t, i);
                alpha[[t, i]] = value;
            }
            let c = 1.0 / alpha.row(t).sum();
            if !(c.is_finite() && c > 0.0) {
                warn!("forward: unreachable observation at t={} (c={})", t, c);
                return Err(HmmError::degenerate(0, Degeneracy::ZeroLikelihood { t }));
            }
            alpha.row_mut(t).mapv_inplace(|a| a * c);
            scale[t] = c;
        }

        Ok(ForwardTable {
            alpha,
            scale,
            log_shift: emission.total_log_shift(),
        })
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::*;
    use crate::hmm::HmmModel;
    use crate::linalg::NativeLinalg;
    use approx::assert_abs_diff_eq;
    use itertools::Itertools;

    ///
    /// log P(x) by enumerating all N^T state paths with raw pdf
    ///
    fn brute_force_log_likelihood(params: &HmmParams, xs: &[Array1<f64>]) -> f64 {
        let n = params.n_states();
        let p: f64 = (0..xs.len())
            .map(|_| 0..n)
            .multi_cartesian_product()
            .map(|path| {
                let mut p = params.initial.prob(path[0]) * params.emissions[path[0]].pdf(xs[0].view());
                for t in 1..xs.len() {
                    p *= params.transition.prob(path[t - 1], path[t])
                        * params.emissions[path[t]].pdf(xs[t].view());
                }
                p
            })
            .sum();
        p.ln()
    }

    #[test]
    fn forward_rows_sum_to_one() {
        let params = mock_two_state_params(4.0);
        let xs = mock_bimodal_observations(30, 4.0, 1);
        let table = EmissionTable::new(&params.emissions, &xs);
        let f = params.forward(&table).unwrap();
        assert_eq!(f.n_steps(), 60);
        for t in 0..f.n_steps() {
            assert_abs_diff_eq!(f.alpha.row(t).sum(), 1.0, epsilon = 1e-6);
            assert!(f.scale[t] > 0.0);
        }
    }

    #[test]
    fn forward_likelihood_matches_enumeration() {
        let params = mock_two_state_params(1.5);
        let xs = vec![arr1(&[0.1]), arr1(&[1.2]), arr1(&[-0.4]), arr1(&[2.0])];
        let table = EmissionTable::new(&params.emissions, &xs);
        let f = params.forward(&table).unwrap();
        assert_abs_diff_eq!(
            f.log_likelihood(),
            brute_force_log_likelihood(&params, &xs),
            epsilon = 1e-9
        );

        let params = mock_2d_params();
        let xs = vec![arr1(&[0.0, 0.5]), arr1(&[3.0, 2.5]), arr1(&[2.0, 3.0])];
        let table = EmissionTable::new(&params.emissions, &xs);
        let f = params.forward(&table).unwrap();
        assert_abs_diff_eq!(
            f.log_likelihood(),
            brute_force_log_likelihood(&params, &xs),
            epsilon = 1e-9
        );
    }

    #[test]
    fn forward_long_sequence_does_not_underflow() {
        let params = mock_two_state_params(6.0);
        let xs = mock_bimodal_observations(2000, 6.0, 3);
        let table = EmissionTable::new(&params.emissions, &xs);
        let f = params.forward(&table).unwrap();
        let lp = f.log_likelihood();
        assert!(lp.is_finite());
        assert!(lp < 0.0);
    }

    #[test]
    fn forward_rejects_table_of_other_model() {
        let params = mock_two_state_params(4.0);
        let other = HmmModel::new(3, 1, NativeLinalg).unwrap();
        let xs = vec![arr1(&[0.0]), arr1(&[1.0])];
        let table = EmissionTable::new(other.emissions(), &xs);
        assert_eq!(
            params.forward(&table).unwrap_err(),
            HmmError::DimensionMismatch {
                expected: 2,
                actual: 3
            }
        );
    }

    #[test]
    fn forward_unreachable_observation() {
        let params = mock_unreachable_params();
        // only state 0 can start, but x[0] is far beyond state 0's reach
        let xs = vec![arr1(&[100.0]), arr1(&[0.0])];
        let table = EmissionTable::new(&params.emissions, &xs);
        let e = params.forward(&table).unwrap_err();
        assert_eq!(
            e,
            HmmError::NumericalDegeneracy {
                iteration: 0,
                reason: Degeneracy::ZeroLikelihood { t: 0 }
            }
        );
    }
}
