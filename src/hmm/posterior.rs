//!
//! State occupation (gamma) and state transition (digamma) posteriors
//!
//! ```text
//! digamma[t, i, j] = P(state i at t, state j at t+1 | x)
//!                  = alpha[t, i] A[i, j] b_j(x[t+1]) beta[t+1, j] / denom
//! gamma[t, i]      = sum_j digamma[t, i, j]
//! ```
//!
//! for `t = 0, ..., T-2`. The row `t = T-1` is not defined by this
//! recursion and is not stored: both tables have `T-1` rows.
//!
use super::backward::BackwardTable;
use super::forward::ForwardTable;
use super::params::HmmParams;
use super::table::EmissionTable;
use crate::error::{Degeneracy, HmmError, Result};
use itertools::iproduct;
use log::warn;
use ndarray::prelude::*;

#[derive(Debug, Clone)]
pub struct Posterior {
    /// `(T-1) x N`
    pub gamma: Array2<f64>,
    /// `(T-1) x N x N`
    pub digamma: Array3<f64>,
}

impl Posterior {
    ///
    /// number of rows, that is `T-1`
    ///
    pub fn n_steps(&self) -> usize {
        self.gamma.nrows()
    }
    ///
    /// `sum_t gamma[t, i]`: expected number of transitions out of state i
    ///
    pub fn state_weight(&self, i: usize) -> f64 {
        self.gamma.column(i).sum()
    }
}

///
/// All tables computed in a single E-step
///
#[derive(Debug, Clone)]
pub struct EStep {
    pub emission: EmissionTable,
    pub forward: ForwardTable,
    pub backward: BackwardTable,
    pub posterior: Posterior,
}

impl HmmParams {
    ///
    /// Calculate gamma and digamma from the forward/backward tables.
    ///
    /// A zero denominator at t (no transition between t and t+1 has
    /// probability mass) is reported as `Degeneracy::ZeroTransitionMass`.
    ///
    pub fn posterior(
        &self,
        emission: &EmissionTable,
        forward: &ForwardTable,
        backward: &BackwardTable,
    ) -> Result<Posterior> {
        let n = self.n_states();
        if emission.n_states() != n {
            return Err(HmmError::DimensionMismatch {
                expected: n,
                actual: emission.n_states(),
            });
        }
        let n_rows = emission.n_steps().saturating_sub(1);
        let alpha = &forward.alpha;
        let beta = &backward.beta;
        let mut gamma = Array2::<f64>::zeros((n_rows, n));
        let mut digamma = Array3::<f64>::zeros((n_rows, n, n));

        for t in 0..n_rows {
            let mut denom = 0.0;
            for (i, j) in iproduct!(0..n, 0..n) {
                let term = alpha[[t, i]]
                    * self.transition.prob(i, j)
                    * emission.b(t + 1, j)
                    * beta[[t + 1, j]];
                digamma[[t, i, j]] = term;
                denom += term;
            }
            if !(denom.is_finite() && denom > 0.0) {
                warn!("posterior: no transition mass at t={} (denom={})", t, denom);
                return Err(HmmError::degenerate(
                    0,
                    Degeneracy::ZeroTransitionMass { t },
                ));
            }
            for i in 0..n {
                let mut g = 0.0;
                for j in 0..n {
                    let d = digamma[[t, i, j]] / denom;
                    digamma[[t, i, j]] = d;
                    g += d;
                }
                gamma[[t, i]] = g;
            }
        }

        Ok(Posterior { gamma, digamma })
    }
    ///
    /// Run forward, backward and posterior passes on the observations.
    ///
    /// Observations are validated first (at least one, each a finite
    /// vector of length D).
    ///
    pub fn e_step(&self, observations: &[Array1<f64>]) -> Result<EStep> {
        self.check_observations(observations, 1)?;
        let emission = EmissionTable::new(&self.emissions, observations);
        let forward = self.forward(&emission)?;
        let backward = self.backward(&emission, &forward);
        let posterior = self.posterior(&emission, &forward, &backward)?;
        Ok(EStep {
            emission,
            forward,
            backward,
            posterior,
        })
    }
}
