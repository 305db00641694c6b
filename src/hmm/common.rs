//!
//! Definition of the Gaussian HMM
//!
use super::emission::GaussianEmission;
use super::params::{HmmParams, InitialDistribution, TransitionModel};
use crate::error::{HmmError, Result};
use crate::linalg::LinearAlgebraProvider;
use ndarray::prelude::*;

///
/// Continuous-emission hidden Markov model
///
/// * `n_states` (N) hidden states, each with a `GaussianEmission` on
///   `obs_dim` (D) dimensional observations
/// * N and D never change after construction
/// * `L` is the linear algebra used to (re)build the gaussians
///
#[derive(Debug, Clone)]
pub struct HmmModel<L: LinearAlgebraProvider> {
    n_states: usize,
    obs_dim: usize,
    pub(crate) params: HmmParams,
    linalg: L,
}

impl<L: LinearAlgebraProvider> HmmModel<L> {
    ///
    /// Create a model with default parameters.
    ///
    /// * transition: `TransitionModel::near_uniform`
    /// * initial: uniform
    /// * emission of state i: `N(m_i 1, I)` with `m_i = 3 + (i - N/2) / N`
    ///   (distinct means, so that the states are not symmetric)
    ///
    pub fn new(n_states: usize, obs_dim: usize, linalg: L) -> Result<HmmModel<L>> {
        if n_states == 0 {
            return Err(HmmError::InvalidParameter(
                "number of states must be > 0".to_string(),
            ));
        }
        if obs_dim == 0 {
            return Err(HmmError::InvalidParameter(
                "observation dimension must be > 0".to_string(),
            ));
        }
        let n = n_states as f64;
        let emissions = (0..n_states)
            .map(|i| {
                let m = 3.0 + (i as f64 - 0.5 * n) / n;
                GaussianEmission::with_identity(Array1::from_elem(obs_dim, m), &linalg)
            })
            .collect::<Result<Vec<_>>>()?;
        let params = HmmParams::new(
            TransitionModel::near_uniform(n_states),
            InitialDistribution::uniform(n_states),
            emissions,
        )?;
        Ok(HmmModel {
            n_states,
            obs_dim,
            params,
            linalg,
        })
    }
    ///
    /// Create a model from explicit parameters.
    ///
    pub fn from_params(params: HmmParams, linalg: L) -> Result<HmmModel<L>> {
        let (n_states, obs_dim) = params.shape()?;
        Ok(HmmModel {
            n_states,
            obs_dim,
            params,
            linalg,
        })
    }
    ///
    /// Replace the parameters. The number of states and the observation
    /// dimension must not change.
    ///
    pub fn set_params(&mut self, params: HmmParams) -> Result<()> {
        let (n, d) = params.shape()?;
        if n != self.n_states {
            return Err(HmmError::DimensionMismatch {
                expected: self.n_states,
                actual: n,
            });
        }
        if d != self.obs_dim {
            return Err(HmmError::DimensionMismatch {
                expected: self.obs_dim,
                actual: d,
            });
        }
        self.params = params;
        Ok(())
    }
    pub fn n_states(&self) -> usize {
        self.n_states
    }
    pub fn obs_dim(&self) -> usize {
        self.obs_dim
    }
    pub fn params(&self) -> &HmmParams {
        &self.params
    }
    pub fn transition(&self) -> &TransitionModel {
        &self.params.transition
    }
    pub fn initial(&self) -> &InitialDistribution {
        &self.params.initial
    }
    pub fn emissions(&self) -> &[GaussianEmission] {
        &self.params.emissions
    }
    pub fn linalg(&self) -> &L {
        &self.linalg
    }
    ///
    /// Check that the sequence has at least `min_len` observations, and
    /// that every observation is a finite vector of length D.
    ///
    pub fn check_observations(&self, observations: &[Array1<f64>], min_len: usize) -> Result<()> {
        self.params.check_observations(observations, min_len)
    }
    ///
    /// State probabilities `P(state i at t | x)` for `t = 0, ..., T-2`,
    /// as a `(T-1) x N` matrix.
    ///
    /// The last time step is not included.
    ///
    pub fn decode(&self, observations: &[Array1<f64>]) -> Result<Array2<f64>> {
        self.check_observations(observations, 1)?;
        let e = self.params.e_step(observations)?;
        Ok(e.posterior.gamma)
    }
    ///
    /// `log P(x)` under the current parameters
    ///
    pub fn log_likelihood(&self, observations: &[Array1<f64>]) -> Result<f64> {
        self.check_observations(observations, 1)?;
        let emission = super::table::EmissionTable::new(&self.params.emissions, observations);
        let forward = self.params.forward(&emission)?;
        Ok(forward.log_likelihood())
    }
}

impl<L: LinearAlgebraProvider> std::fmt::Display for HmmModel<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        writeln!(f, "HMM(N={}, D={})", self.n_states, self.obs_dim)?;
        write!(f, "{}", self.params)
    }
}

//
// Tests
//
