//!
//! Mock parameters and observations for testing
//!
use super::emission::GaussianEmission;
use super::params::{HmmParams, InitialDistribution, TransitionModel};
use crate::linalg::NativeLinalg;
use ndarray::prelude::*;
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

fn build(transition: Array2<f64>, initial: Array1<f64>, emissions: Vec<(Array1<f64>, Array2<f64>)>) -> HmmParams {
    let emissions = emissions
        .into_iter()
        .map(|(m, c)| GaussianEmission::new(m, c, &NativeLinalg).unwrap())
        .collect();
    HmmParams::new(
        TransitionModel::new(transition).unwrap(),
        InitialDistribution::new(initial).unwrap(),
        emissions,
    )
    .unwrap()
}

///
/// 1-dim 2-state model
///
/// * `N(0, 1)` and `N(separation, 1)`
/// * sticky transition (stay with p=0.9)
/// * uniform initial
///
pub fn mock_two_state_params(separation: f64) -> HmmParams {
    build(
        arr2(&[[0.9, 0.1], [0.1, 0.9]]),
        arr1(&[0.5, 0.5]),
        vec![
            (arr1(&[0.0]), arr2(&[[1.0]])),
            (arr1(&[separation]), arr2(&[[1.0]])),
        ],
    )
}

///
/// 2-dim 2-state model with correlated covariances
///
pub fn mock_2d_params() -> HmmParams {
    build(
        arr2(&[[0.8, 0.2], [0.3, 0.7]]),
        arr1(&[0.6, 0.4]),
        vec![
            (arr1(&[0.0, 0.0]), arr2(&[[1.0, 0.3], [0.3, 1.0]])),
            (arr1(&[3.0, 3.0]), arr2(&[[1.5, -0.2], [-0.2, 0.8]])),
        ],
    )
}

///
/// Model that always starts in state 0 and never leaves it,
/// while state 1 emits around 100.
///
pub fn mock_unreachable_params() -> HmmParams {
    build(
        arr2(&[[1.0, 0.0], [0.0, 1.0]]),
        arr1(&[1.0, 0.0]),
        vec![
            (arr1(&[0.0]), arr2(&[[1.0]])),
            (arr1(&[100.0]), arr2(&[[1.0]])),
        ],
    )
}

///
/// 1-dim 2-state model, `N(0, 4)` and `N(10, 4)`, with uniform transition
/// and initial probabilities.
///
/// Fitted on `[0, 10, 10]` the first re-estimation shrinks state 0 around
/// the single observation 0, and the second one collapses its variance to 0.
///
pub fn mock_collapsing_params() -> HmmParams {
    build(
        arr2(&[[0.5, 0.5], [0.5, 0.5]]),
        arr1(&[0.5, 0.5]),
        vec![
            (arr1(&[0.0]), arr2(&[[4.0]])),
            (arr1(&[10.0]), arr2(&[[4.0]])),
        ],
    )
}

///
/// `n_each` samples from `N(0, 1)` followed by `n_each` samples from
/// `N(separation, 1)`.
///
pub fn mock_bimodal_observations(n_each: usize, separation: f64, seed: u64) -> Vec<Array1<f64>> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let low = GaussianEmission::with_identity(arr1(&[0.0]), &NativeLinalg).unwrap();
    let high = GaussianEmission::with_identity(arr1(&[separation]), &NativeLinalg).unwrap();
    let mut xs: Vec<Array1<f64>> = (0..n_each).map(|_| low.simulate(&mut rng)).collect();
    xs.extend((0..n_each).map(|_| high.simulate(&mut rng)));
    xs
}

///
/// 2-dim observations alternating between two clusters
/// (around `(0, 0)` and `(3, 3)`) in runs of random length.
///
pub fn mock_2d_observations(n_runs: usize, seed: u64) -> Vec<Array1<f64>> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let params = mock_2d_params();
    let mut xs = Vec::new();
    for run in 0..n_runs {
        let state = run % 2;
        let len = rng.gen_range(1..5);
        for _ in 0..len {
            xs.push(params.emissions[state].simulate(&mut rng));
        }
    }
    xs
}
