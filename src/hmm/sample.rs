//!
//! Sampling state paths (and observations) from the model
//!
use super::common::HmmModel;
use super::params::HmmParams;
use crate::error::{HmmError, Result};
use crate::linalg::LinearAlgebraProvider;
use ndarray::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

///
/// Sampled path
///
#[derive(Debug, Clone)]
pub struct Simulation {
    ///
    /// hidden state at each time, in `[0, N)`
    pub states: Vec<usize>,
    ///
    /// emitted observation at each time, if requested
    pub observations: Option<Vec<Array1<f64>>>,
}

///
/// Inverse-CDF pick: the first state whose cumulative probability exceeds `r`.
///
/// If rounding leaves `r` beyond the total, the last state with positive
/// probability is picked.
///
pub fn pick_with_cdf(r: f64, probs: ArrayView1<f64>) -> usize {
    let mut cum = 0.0;
    for (s, &p) in probs.iter().enumerate() {
        cum += p;
        if r < cum {
            return s;
        }
    }
    probs
        .iter()
        .rposition(|&p| p > 0.0)
        .unwrap_or(probs.len() - 1)
}

impl HmmParams {
    ///
    /// Walk the Markov chain for `length` steps, optionally emitting one
    /// observation per visited state.
    ///
    pub fn simulate<R: Rng>(
        &self,
        rng: &mut R,
        length: usize,
        with_observations: bool,
    ) -> Simulation {
        let mut states: Vec<usize> = Vec::with_capacity(length);
        let mut observations = Vec::new();
        for t in 0..length {
            let probs = if t == 0 {
                self.initial.probs()
            } else {
                self.transition.row(states[t - 1])
            };
            let state = pick_with_cdf(rng.gen::<f64>(), probs);
            states.push(state);
            if with_observations {
                observations.push(self.emissions[state].simulate(rng));
            }
        }
        Simulation {
            states,
            observations: if with_observations {
                Some(observations)
            } else {
                None
            },
        }
    }
}

impl<L: LinearAlgebraProvider> HmmModel<L> {
    ///
    /// Sample a path of `length > 0` steps with the given rng.
    ///
    pub fn simulate<R: Rng>(
        &self,
        rng: &mut R,
        length: usize,
        with_observations: bool,
    ) -> Result<Simulation> {
        if length == 0 {
            return Err(HmmError::InvalidParameter(
                "length of a simulation must be > 0".to_string(),
            ));
        }
        Ok(self.params.simulate(rng, length, with_observations))
    }
    ///
    /// Sample a path with `Xoshiro256PlusPlus` seeded by `seed`
    ///
    pub fn simulate_seeded(
        &self,
        length: usize,
        with_observations: bool,
        seed: u64,
    ) -> Result<Simulation> {
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        self.simulate(&mut rng, length, with_observations)
    }
}

//
// Tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hmm::mocks::*;
    use crate::linalg::NativeLinalg;
    use approx::assert_abs_diff_eq;

    #[test]
    fn pick_with_cdf_boundaries() {
        let p = arr1(&[0.2, 0.0, 0.8]);
        assert_eq!(pick_with_cdf(0.0, p.view()), 0);
        assert_eq!(pick_with_cdf(0.19, p.view()), 0);
        assert_eq!(pick_with_cdf(0.2, p.view()), 2);
        assert_eq!(pick_with_cdf(0.999, p.view()), 2);
        // rounding: the total is slightly less than 1
        let q = arr1(&[0.5, 0.49999999999, 0.0]);
        assert_eq!(pick_with_cdf(0.9999999999999, q.view()), 1);
    }

    #[test]
    fn simulate_shapes() {
        let hmm = HmmModel::new(3, 2, NativeLinalg).unwrap();
        let s = hmm.simulate_seeded(50, true, 0).unwrap();
        assert_eq!(s.states.len(), 50);
        assert!(s.states.iter().all(|&x| x < 3));
        let obs = s.observations.unwrap();
        assert_eq!(obs.len(), 50);
        assert!(obs.iter().all(|x| x.len() == 2));

        let s = hmm.simulate_seeded(10, false, 0).unwrap();
        assert_eq!(s.states.len(), 10);
        assert!(s.observations.is_none());

        assert!(hmm.simulate_seeded(0, true, 0).is_err());
    }

    #[test]
    fn simulate_is_reproducible() {
        let hmm = HmmModel::from_params(mock_two_state_params(5.0), NativeLinalg).unwrap();
        let s1 = hmm.simulate_seeded(30, true, 4).unwrap();
        let s2 = hmm.simulate_seeded(30, true, 4).unwrap();
        assert_eq!(s1.states, s2.states);
        assert_eq!(s1.observations, s2.observations);
    }

    #[test]
    fn simulate_transition_frequencies() {
        let hmm = HmmModel::from_params(mock_two_state_params(5.0), NativeLinalg).unwrap();
        let s = hmm.simulate_seeded(20000, false, 1).unwrap();
        let mut stay = 0;
        let mut from_0 = 0;
        for w in s.states.windows(2) {
            if w[0] == 0 {
                from_0 += 1;
                if w[1] == 0 {
                    stay += 1;
                }
            }
        }
        let p_stay = stay as f64 / from_0 as f64;
        assert_abs_diff_eq!(p_stay, hmm.transition().prob(0, 0), epsilon = 0.02);
    }
}
