//!
//! Baum-Welch training loop
//!
//! Each iteration runs E-step (forward, backward, posterior) and M-step
//! (re-estimation) on the current parameters, then swaps in the new
//! parameters. The loop stops at the first iteration whose log-likelihood
//! does not improve on the previous one.
//!
use super::common::HmmModel;
use super::params::HmmParams;
use crate::error::{HmmError, Result};
use crate::linalg::LinearAlgebraProvider;
use log::{debug, info, log, Level};
use ndarray::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

///
/// Flag shared with the caller to stop `fit` between iterations.
///
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> CancelToken {
        CancelToken::default()
    }
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

///
/// Options of `HmmModel::fit_with`
///
#[derive(Debug, Clone)]
pub struct FitConfig {
    ///
    /// maximum number of EM iterations (> 0)
    pub max_iterations: usize,
    ///
    /// log each iteration in info level, and dump alpha/beta in debug level
    pub verbose: bool,
    ///
    /// checked before each iteration
    pub cancel: Option<CancelToken>,
}

impl FitConfig {
    pub fn new(max_iterations: usize) -> FitConfig {
        FitConfig {
            max_iterations,
            verbose: false,
            cancel: None,
        }
    }
    pub fn verbose(mut self) -> FitConfig {
        self.verbose = true;
        self
    }
    pub fn with_cancel(mut self, token: CancelToken) -> FitConfig {
        self.cancel = Some(token);
        self
    }
    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().map_or(false, |c| c.is_cancelled())
    }
}

///
/// Why the training loop stopped
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    /// log-likelihood did not improve
    Converged,
    /// `max_iterations` iterations were run
    MaxIterationsReached,
    /// `CancelToken` was set
    Cancelled,
}

///
/// Summary of `fit_with`
///
#[derive(Debug, Clone)]
pub struct FitReport {
    ///
    /// index of the iteration that stopped the loop, or `max_iterations`
    pub iterations: usize,
    pub termination: Termination,
    ///
    /// `log_likelihoods[k]` is the log-likelihood of the parameters
    /// before the re-estimation of iteration k
    pub log_likelihoods: Vec<f64>,
}

impl<L: LinearAlgebraProvider> HmmModel<L> {
    ///
    /// Train the parameters on the observations by Baum-Welch.
    ///
    /// Returns the index of the iteration at which the log-likelihood stopped
    /// improving, or `max_iterations` if it kept improving.
    ///
    pub fn fit(
        &mut self,
        observations: &[Array1<f64>],
        max_iterations: usize,
        verbose: bool,
    ) -> Result<usize> {
        let mut config = FitConfig::new(max_iterations);
        config.verbose = verbose;
        let report = self.fit_with(observations, &config)?;
        Ok(report.iterations)
    }
    ///
    /// `fit` with a cancellation token, returning the full report.
    ///
    /// # Errors
    ///
    /// * `InvalidParameter` if `max_iterations == 0`
    /// * `InvalidObservation` / `SequenceTooShort` (T < 2) before any computation
    /// * `NumericalDegeneracy { iteration, .. }` when an iteration fails;
    ///   the model keeps the parameters from before that iteration
    ///
    pub fn fit_with(&mut self, observations: &[Array1<f64>], config: &FitConfig) -> Result<FitReport> {
        if config.max_iterations == 0 {
            return Err(HmmError::InvalidParameter(
                "max_iterations must be > 0".to_string(),
            ));
        }
        self.check_observations(observations, 2)?;

        let level = if config.verbose {
            Level::Info
        } else {
            Level::Debug
        };
        let mut old_log_prob = f64::NEG_INFINITY;
        let mut log_likelihoods = Vec::new();
        let mut iter = 0;

        let termination = loop {
            if iter >= config.max_iterations {
                break Termination::MaxIterationsReached;
            }
            if config.is_cancelled() {
                info!("fit: cancelled at #{}", iter);
                break Termination::Cancelled;
            }

            let (next, log_prob) = self
                .em_step(observations, config.verbose)
                .map_err(|e| e.at_iteration(iter))?;
            self.params = next;
            log!(level, "#{} logProb={}", iter, log_prob);
            log_likelihoods.push(log_prob);

            if log_prob <= old_log_prob {
                break Termination::Converged;
            }
            old_log_prob = log_prob;
            iter += 1;
        };

        log!(level, "fit: {:?} at #{}", termination, iter);
        Ok(FitReport {
            iterations: iter,
            termination,
            log_likelihoods,
        })
    }
    ///
    /// One EM iteration on the current parameters.
    /// Returns the new parameters and the log-likelihood of the current ones.
    ///
    fn em_step(&self, observations: &[Array1<f64>], verbose: bool) -> Result<(HmmParams, f64)> {
        let e = self.params.e_step(observations)?;
        if verbose {
            debug!("alpha={}", e.forward.alpha);
            debug!("beta={}", e.backward.beta);
        }
        let next = self
            .params
            .reestimate(observations, &e.posterior, self.linalg())?;
        Ok((next, e.forward.log_likelihood()))
    }
}

//
// Tests
//
