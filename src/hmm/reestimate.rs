//!
//! M-step of Baum-Welch: re-estimate parameters from the posteriors
//!
//! * `pi[i] <- gamma[0, i]`
//! * `A[i, j] <- sum_t digamma[t, i, j] / sum_t gamma[t, i]`
//! * `mean_i <- sum_t gamma[t, i] x[t] / sum_t gamma[t, i]`
//! * `cov_i <- sum_t gamma[t, i] (x[t] - mean_i)(x[t] - mean_i)^T / sum_t gamma[t, i]`
//!
//! with `t = 0, ..., T-2`. A state with zero total weight keeps its
//! previous transition row and emission.
//!
use super::emission::GaussianEmission;
use super::params::{HmmParams, InitialDistribution, TransitionModel};
use super::posterior::Posterior;
use crate::error::{Degeneracy, HmmError, Result};
use crate::linalg::LinearAlgebraProvider;
use log::{debug, warn};
use ndarray::prelude::*;

fn degenerate(reason: Degeneracy) -> HmmError {
    warn!("reestimate: {}", reason);
    HmmError::degenerate(0, reason)
}

impl HmmParams {
    ///
    /// Create the re-estimated parameters. `self` is not modified.
    ///
    /// `posterior` must have been computed from `observations` with `self`,
    /// and have at least one row.
    ///
    pub fn reestimate<L: LinearAlgebraProvider>(
        &self,
        observations: &[Array1<f64>],
        posterior: &Posterior,
        linalg: &L,
    ) -> Result<HmmParams> {
        let n = self.n_states();
        let n_rows = posterior.n_steps();
        if n_rows == 0 {
            return Err(HmmError::SequenceTooShort {
                len: observations.len(),
                min: 2,
            });
        }
        let gamma = &posterior.gamma;
        let digamma = &posterior.digamma;
        let weights: Vec<f64> = (0..n).map(|i| posterior.state_weight(i)).collect();

        // initial distribution
        let initial = InitialDistribution::new(gamma.row(0).to_owned())
            .map_err(|_| degenerate(Degeneracy::InvalidProbabilities))?;

        // transition
        let mut matrix = self.transition.matrix().clone();
        for i in 0..n {
            if weights[i] == 0.0 {
                debug!("reestimate: state {} is never occupied, keeping row", i);
                continue;
            }
            for j in 0..n {
                let numer: f64 = (0..n_rows).map(|t| digamma[[t, i, j]]).sum();
                matrix[[i, j]] = numer / weights[i];
            }
        }
        let transition = TransitionModel::new(matrix)
            .map_err(|_| degenerate(Degeneracy::InvalidProbabilities))?;

        // emissions
        let mut emissions = Vec::with_capacity(n);
        for i in 0..n {
            if weights[i] == 0.0 {
                emissions.push(self.emissions[i].clone());
                continue;
            }
            let emission = self.reestimate_emission(i, observations, gamma.column(i), weights[i], linalg)?;
            emissions.push(emission);
        }

        Ok(HmmParams {
            transition,
            initial,
            emissions,
        })
    }
    ///
    /// weighted mean and covariance of state i
    ///
    fn reestimate_emission<L: LinearAlgebraProvider>(
        &self,
        state: usize,
        observations: &[Array1<f64>],
        weight: ArrayView1<f64>,
        total: f64,
        linalg: &L,
    ) -> Result<GaussianEmission> {
        let d = self.obs_dim();

        let mut mean = Array1::<f64>::zeros(d);
        for (x, &w) in observations.iter().zip(weight.iter()) {
            mean.scaled_add(w, x);
        }
        mean /= total;

        let mut covariance = Array2::<f64>::zeros((d, d));
        for (x, &w) in observations.iter().zip(weight.iter()) {
            let diff = x - &mean;
            for j in 0..d {
                for k in 0..d {
                    covariance[[j, k]] += w * diff[j] * diff[k];
                }
            }
        }
        covariance /= total;

        if mean.iter().chain(covariance.iter()).any(|v| !v.is_finite()) {
            return Err(degenerate(Degeneracy::NonFiniteParameter { state }));
        }
        GaussianEmission::new(mean, covariance, linalg)
            .map_err(|_| degenerate(Degeneracy::InvalidCovariance { state }))
    }
}

//
// Tests
//
