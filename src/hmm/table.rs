//!
//! Emission probability table `B[t, i]` shared by the passes
//!
//! Densities are evaluated once per pass in log space, shifted by the
//! maximum of each time step and then exponentiated:
//!
//! ```text
//! B[t, i] = exp(logpdf_i(x[t]) - s[t])
//! s[t]    = max_i logpdf_i(x[t])
//! ```
//!
//! Multiplying every state of a time step by the same constant does not
//! change the normalized forward table nor gamma/digamma; it only scales
//! the scale factor `c[t]` by `exp(s[t])`, which is added back in
//! `ForwardTable::log_likelihood`.
//!
use super::emission::GaussianEmission;
use ndarray::prelude::*;
use rayon::prelude::*;

#[derive(Debug, Clone)]
pub struct EmissionTable {
    b: Array2<f64>,
    log_shift: Array1<f64>,
}

impl EmissionTable {
    ///
    /// Evaluate all emission densities for all observations.
    /// Time steps are independent and computed in parallel.
    ///
    pub fn new(emissions: &[GaussianEmission], observations: &[Array1<f64>]) -> EmissionTable {
        let n = emissions.len();
        let rows: Vec<(Vec<f64>, f64)> = observations
            .par_iter()
            .map(|x| {
                let lps: Vec<f64> = emissions.iter().map(|e| e.logpdf(x.view())).collect();
                let max = lps.iter().copied().fold(f64::NEG_INFINITY, f64::max);
                let shift = if max.is_finite() { max } else { 0.0 };
                let row = lps.into_iter().map(|lp| (lp - shift).exp()).collect();
                (row, shift)
            })
            .collect();

        let mut b = Array2::<f64>::zeros((observations.len(), n));
        let mut log_shift = Array1::<f64>::zeros(observations.len());
        for (t, (row, shift)) in rows.into_iter().enumerate() {
            b.row_mut(t).assign(&Array1::from(row));
            log_shift[t] = shift;
        }
        EmissionTable { b, log_shift }
    }
    ///
    /// Shifted density `B[t, i]` of state i emitting `x[t]`
    ///
    #[inline]
    pub fn b(&self, t: usize, i: usize) -> f64 {
        self.b[[t, i]]
    }
    pub fn n_steps(&self) -> usize {
        self.b.nrows()
    }
    pub fn n_states(&self) -> usize {
        self.b.ncols()
    }
    pub fn log_shift(&self, t: usize) -> f64 {
        self.log_shift[t]
    }
    ///
    /// `sum_t s[t]`
    ///
    pub fn total_log_shift(&self) -> f64 {
        self.log_shift.sum()
    }
}
