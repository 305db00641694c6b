//!
//! Backward algorithm (beta pass)
//!
use super::forward::ForwardTable;
use super::params::HmmParams;
use super::table::EmissionTable;
use ndarray::prelude::*;

///
/// Result of the backward pass, scaled with the forward scale factors.
///
#[derive(Debug, Clone)]
pub struct BackwardTable {
    pub beta: Array2<f64>,
}

impl BackwardTable {
    pub fn n_steps(&self) -> usize {
        self.beta.nrows()
    }
}

impl HmmParams {
    ///
    /// Run the backward algorithm
    ///
    /// ```text
    /// beta[T-1, i] = c[T-1]
    /// beta[t, i]   = c[t] sum_j A[i, j] b_j(x[t+1]) beta[t+1, j]
    /// ```
    ///
    /// The last row starts from `c[T-1]`, not from 1, so that forward and
    /// backward share the same scaling. `b_j` and `c` are the shifted values
    /// of `EmissionTable` and `ForwardTable::scale`.
    ///
    pub fn backward(&self, emission: &EmissionTable, forward: &ForwardTable) -> BackwardTable {
        let n = self.n_states();
        let n_steps = emission.n_steps();
        let c = &forward.scale;
        let mut beta = Array2::<f64>::zeros((n_steps, n));
        if n_steps == 0 {
            return BackwardTable { beta };
        }

        beta.row_mut(n_steps - 1).fill(c[n_steps - 1]);
        for t in (0..n_steps - 1).rev() {
            for i in 0..n {
                let s: f64 = (0..n)
                    .map(|j| self.transition.prob(i, j) * emission.b(t + 1, j) * beta[[t + 1, j]])
                    .sum();
                let value = c[t] * s;
                beta[[t, i]] = value;
            }
        }

        BackwardTable { beta }
    }
}
