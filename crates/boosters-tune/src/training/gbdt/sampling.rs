//! Row and column sampling for training.
//!
//! - [`RowSampler`]: random fraction of rows without replacement (`subsample`)
//! - [`ColumnSampler`]: random fraction of features per tree (`colsample_bytree`)
//!
//! Both are stateless given a seed; the trainer derives one seed per round.

use rand::Rng;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// ============================================================================
// RowSampler
// ============================================================================

/// Random row sampler without replacement.
#[derive(Debug, Clone, Copy)]
pub struct RowSampler {
    /// Fraction of rows to sample (0, 1].
    rate: f32,
}

impl RowSampler {
    /// `rate` is validated by `GBDTParams`; values above 1 sample everything.
    pub fn new(rate: f32) -> Self {
        debug_assert!(rate > 0.0, "subsample rate must be positive, got {rate}");
        Self { rate }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.rate < 1.0
    }

    /// Sorted row indices for one round.
    pub fn sample(&self, n_rows: usize, seed: u64) -> Vec<u32> {
        if !self.is_enabled() || n_rows == 0 {
            return (0..n_rows as u32).collect();
        }
        let sample_size = ((n_rows as f32 * self.rate).ceil() as usize).clamp(1, n_rows);
        sample_without_replacement(n_rows as u32, sample_size, seed)
    }
}

// ============================================================================
// ColumnSampler
// ============================================================================

/// Samples the features a tree may split on.
#[derive(Debug, Clone, Copy)]
pub struct ColumnSampler {
    n_features: u32,
    colsample_bytree: f32,
}

impl ColumnSampler {
    pub fn new(n_features: u32, colsample_bytree: f32) -> Self {
        debug_assert!(colsample_bytree > 0.0);
        Self {
            n_features,
            colsample_bytree,
        }
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.colsample_bytree < 1.0
    }

    /// Sorted feature indices for one tree. Never empty when `n_features > 0`.
    pub fn sample_for_tree(&self, seed: u64) -> Vec<u32> {
        if !self.is_enabled() || self.n_features == 0 {
            return (0..self.n_features).collect();
        }
        let sample_size = ((self.n_features as f32 * self.colsample_bytree).ceil() as usize)
            .clamp(1, self.n_features as usize);
        sample_without_replacement(self.n_features, sample_size, seed)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Sample `k` items from `0..n` without replacement.
///
/// Returns sorted indices for cache-friendly access.
fn sample_without_replacement(n: u32, k: usize, seed: u64) -> Vec<u32> {
    let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
    let mut indices: Vec<u32> = (0..n).collect();

    // Partial Fisher-Yates shuffle
    for i in 0..k {
        let j = rng.gen_range(i..n as usize);
        indices.swap(i, j);
    }

    let mut sampled: Vec<u32> = indices[..k].to_vec();
    sampled.sort_unstable();
    sampled
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn full_rate_returns_all_rows() {
        let sampler = RowSampler::new(1.0);
        assert!(!sampler.is_enabled());
        assert_eq!(sampler.sample(5, 1), vec![0, 1, 2, 3, 4]);
    }

    #[rstest]
    #[case(100, 0.5, 50)]
    #[case(10, 0.25, 3)]
    #[case(3, 0.01, 1)]
    fn row_sample_size(#[case] n: usize, #[case] rate: f32, #[case] expected: usize) {
        let rows = RowSampler::new(rate).sample(n, 42);
        assert_eq!(rows.len(), expected);
        assert!(rows.windows(2).all(|w| w[0] < w[1]));
        assert!(rows.iter().all(|&r| (r as usize) < n));
    }

    #[test]
    fn row_sample_is_deterministic_in_seed() {
        let sampler = RowSampler::new(0.3);
        assert_eq!(sampler.sample(200, 9), sampler.sample(200, 9));
        assert_ne!(sampler.sample(200, 9), sampler.sample(200, 10));
    }

    #[test]
    fn column_sample_keeps_at_least_one_feature() {
        let sampler = ColumnSampler::new(3, 0.1);
        assert_eq!(sampler.sample_for_tree(5).len(), 1);
        assert_eq!(ColumnSampler::new(4, 1.0).sample_for_tree(5), vec![0, 1, 2, 3]);
    }
}
