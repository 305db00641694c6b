//!
//! Gaussian hidden Markov model
//!
//! # Overview of calculation
//!
//! x = x[0],...,x[T-1] : Observations (D-dim vectors)
//! N hidden states, with `A` (transition), `pi` (initial) and `b_i` (gaussian density of state i)
//!
//! Forward (scaled)
//! alpha[t][i]
//!  = P(x[0:t+1] and in state i at t) / P(x[0:t+1])
//!  c[t] is the normalizing factor of row t, and
//!  log P(x) = - sum_t log c[t]
//!
//! Backward (scaled with the same c)
//! beta[t][i]
//!  ~ P(x[t+1:T] | in state i at t)
//!
//! Posterior
//! digamma[t][i][j] = P(state i at t and state j at t+1 | x)
//! gamma[t][i]      = P(state i at t | x)  (0 <= t < T-1)
//!
//! Baum-Welch
//! repeat { forward -> backward -> posterior -> reestimate }
//! until log P(x) stops increasing (see `train`).
//!
pub mod backward;
pub mod common;
pub mod emission;
pub mod forward;
pub mod mocks;
pub mod params;
pub mod posterior;
pub mod reestimate;
pub mod sample;
pub mod table;
pub mod train;

pub use common::HmmModel;
pub use emission::GaussianEmission;
pub use params::{HmmParams, InitialDistribution, TransitionModel};
pub use sample::Simulation;
pub use train::{CancelToken, FitConfig, FitReport, Termination};
