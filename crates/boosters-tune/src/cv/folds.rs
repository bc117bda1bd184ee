//! K-fold partitioning of sample indices.

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

use super::CvError;

/// One train/held-out split. Both index lists are sorted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fold {
    pub train: Vec<u32>,
    pub test: Vec<u32>,
}

/// Shuffled k-fold splitter.
///
/// Indices are shuffled with `seed` and dealt round-robin, so fold sizes
/// differ by at most one and every sample is held out exactly once.
///
/// ```
/// use boosters_tune::cv::KFold;
///
/// let folds = KFold::new(3, 7).split(10).unwrap();
/// assert_eq!(folds.len(), 3);
/// assert_eq!(folds.iter().map(|f| f.test.len()).sum::<usize>(), 10);
/// ```
#[derive(Debug, Clone, Copy)]
pub struct KFold {
    n_folds: usize,
    seed: u64,
}

impl KFold {
    pub fn new(n_folds: usize, seed: u64) -> Self {
        Self { n_folds, seed }
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    /// Split `n_samples` indices into folds.
    ///
    /// # Errors
    ///
    /// [`CvError::InsufficientData`] unless `2 <= n_folds <= n_samples`.
    pub fn split(&self, n_samples: usize) -> Result<Vec<Fold>, CvError> {
        if self.n_folds < 2 || n_samples < self.n_folds {
            return Err(CvError::InsufficientData {
                required: self.n_folds.max(2),
                got: n_samples,
            });
        }

        let mut order: Vec<u32> = (0..n_samples as u32).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(self.seed);
        order.shuffle(&mut rng);

        let mut assignment = vec![0usize; n_samples];
        for (position, &sample) in order.iter().enumerate() {
            assignment[sample as usize] = position % self.n_folds;
        }

        let folds = (0..self.n_folds)
            .map(|k| {
                let (test, train): (Vec<u32>, Vec<u32>) =
                    (0..n_samples as u32).partition(|&i| assignment[i as usize] == k);
                Fold { train, test }
            })
            .collect();
        Ok(folds)
    }
}
