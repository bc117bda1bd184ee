//! Deterministic synthetic datasets for tests, doctests and demos.
//!
//! Features are uniform in `[-1, 1]`. The underlying function does not
//! depend on the seed, so datasets drawn with different seeds share it and
//! can serve as train and validation sets for each other.

use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;

use crate::data::Dataset;

/// Noise-free signal: a decaying linear term plus a bump on feature 0.
fn signal(sample: &[f32]) -> f32 {
    let linear: f32 = sample
        .iter()
        .enumerate()
        .map(|(j, &x)| {
            let sign = if j % 2 == 0 { 1.0 } else { -1.0 };
            sign * x / (j + 1) as f32
        })
        .sum();
    linear + 0.5 * (3.0 * sample[0]).sin()
}

fn uniform_features(rng: &mut Xoshiro256PlusPlus, n_samples: usize, n_features: usize) -> Array2<f32> {
    Array2::from_shape_fn((n_samples, n_features), |_| rng.r#gen::<f32>() * 2.0 - 1.0)
}

/// Regression data: `y = signal(x) + noise * U(-1, 1)`.
///
/// # Panics
///
/// If `n_features == 0`.
pub fn synthetic_regression(n_samples: usize, n_features: usize, noise: f32, seed: u64) -> Dataset {
    assert!(n_features > 0, "need at least one feature");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let rows = uniform_features(&mut rng, n_samples, n_features);

    let targets: Array1<f32> = rows
        .rows()
        .into_iter()
        .map(|row| {
            let sample = row.to_vec();
            let mut y = signal(&sample);
            if noise > 0.0 {
                y += (rng.r#gen::<f32>() * 2.0 - 1.0) * noise;
            }
            y
        })
        .collect();

    Dataset::from_rows(rows.view(), targets.view()).expect("one target per sample")
}

/// Binary labels (0/1) from thresholding the regression signal, with 5%
/// of labels flipped.
///
/// # Panics
///
/// If `n_features == 0`.
pub fn synthetic_binary(n_samples: usize, n_features: usize, seed: u64) -> Dataset {
    assert!(n_features > 0, "need at least one feature");
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let rows = uniform_features(&mut rng, n_samples, n_features);

    let targets: Array1<f32> = rows
        .rows()
        .into_iter()
        .map(|row| {
            let positive = signal(&row.to_vec()) > 0.0;
            let flip = rng.gen_bool(0.05);
            if positive != flip { 1.0 } else { 0.0 }
        })
        .collect();

    Dataset::from_rows(rows.view(), targets.view()).expect("one target per sample")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shapes_and_determinism() {
        let a = synthetic_regression(50, 3, 0.1, 7);
        let b = synthetic_regression(50, 3, 0.1, 7);
        assert_eq!(a.n_samples(), 50);
        assert_eq!(a.n_features(), 3);
        assert_eq!(a.targets(), b.targets());
        assert_ne!(a.targets(), synthetic_regression(50, 3, 0.1, 8).targets());
    }

    #[test]
    fn noise_free_targets_follow_signal() {
        let ds = synthetic_regression(20, 2, 0.0, 1);
        for i in 0..ds.n_samples() {
            let sample = [ds.get(i, 0), ds.get(i, 1)];
            assert!((ds.targets()[i] - signal(&sample)).abs() < 1e-6);
        }
    }

    #[test]
    fn binary_labels_are_balanced_enough() {
        let ds = synthetic_binary(400, 3, 2);
        assert!(ds.targets().iter().all(|&y| y == 0.0 || y == 1.0));
        let positives = ds.targets().iter().filter(|&&y| y == 1.0).count();
        assert!((100..300).contains(&positives), "{positives} positives");
    }
}
