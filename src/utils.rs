use ndarray::prelude::*;
use std::time::Instant;

///
/// measure time in milli-seconds (ms) of closure.
///
pub fn timer<F, T>(f: F) -> (T, u128)
where
    F: FnOnce() -> T,
{
    let start = Instant::now();
    let ret = f();
    let duration = start.elapsed();
    (ret, duration.as_millis())
}

///
/// most probable state of each row of a `T x N` state probability matrix
///
pub fn argmax_path(probs: &Array2<f64>) -> Vec<usize> {
    probs
        .outer_iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .fold((0, f64::NEG_INFINITY), |(k, max), (i, &p)| {
                    if p > max {
                        (i, p)
                    } else {
                        (k, max)
                    }
                })
                .0
        })
        .collect()
}

///
/// fraction of positions where `xs[i] == ys[i]`, over the shorter length
///
pub fn agreement<T: PartialEq>(xs: &[T], ys: &[T]) -> f64 {
    let n = xs.len().min(ys.len());
    if n == 0 {
        return 0.0;
    }
    let same = xs.iter().zip(ys.iter()).filter(|(x, y)| x == y).count();
    same as f64 / n as f64
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn argmax_path_test() {
        let p = arr2(&[[0.1, 0.9], [0.7, 0.3], [0.5, 0.5]]);
        assert_eq!(argmax_path(&p), vec![1, 0, 0]);
    }

    #[test]
    fn agreement_test() {
        assert_eq!(agreement(&[0, 1, 1, 0], &[0, 1, 0, 0]), 0.75);
        // compared over the shorter one
        assert_eq!(agreement(&[0, 1, 1], &[0, 1, 1, 0]), 1.0);
        let empty: [usize; 0] = [];
        assert_eq!(agreement(&empty, &empty), 0.0);
    }
}
