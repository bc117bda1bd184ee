//! Dataset container.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_xoshiro::Xoshiro256PlusPlus;

// =============================================================================
// DatasetError
// =============================================================================

/// Errors raised while building or loading a [`Dataset`].
#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("{field} has {got} samples, expected {expected}")]
    ShapeMismatch {
        expected: usize,
        got: usize,
        field: &'static str,
    },

    #[error("expected {expected} feature names, got {got}")]
    FeatureNames { expected: usize, got: usize },

    #[error("target column '{0}' not found")]
    MissingTarget(String),

    #[error("sample {sample} has a missing or non-finite target")]
    NonFiniteTarget { sample: usize },

    #[error("row {row}: target value is missing")]
    MissingTargetValue { row: usize },

    #[error("row {row}, column '{column}': cannot parse '{value}' as a number")]
    Parse {
        row: usize,
        column: String,
        value: String,
    },

    #[error("holdout fraction must be in [0, 1), got {0}")]
    InvalidFraction(f32),

    #[error(transparent)]
    Csv(#[from] ::csv::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// =============================================================================
// Dataset
// =============================================================================

/// Feature matrix plus single-output regression/classification targets.
///
/// # Storage Layout
///
/// Features are stored in **feature-major** layout: `[n_features, n_samples]`.
/// Each feature's values across all samples are contiguous in memory, which is
/// what the exact split finder scans.
///
/// # Example
///
/// ```
/// use boosters_tune::data::Dataset;
/// use ndarray::array;
///
/// // Feature-major format: 2 features, 3 samples
/// let features = array![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]];
/// let targets = array![0.5, 1.0, 1.5];
/// let ds = Dataset::new(features.view(), targets.view()).unwrap();
///
/// assert_eq!(ds.n_samples(), 3);
/// assert_eq!(ds.n_features(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct Dataset {
    /// Feature data: `[n_features, n_samples]` (feature-major).
    features: Array2<f32>,
    /// Target values, one per sample.
    targets: Array1<f32>,
    /// Column names, one per feature.
    feature_names: Vec<String>,
}

impl Dataset {
    /// Create a dataset from feature-major data.
    ///
    /// # Errors
    ///
    /// [`DatasetError::ShapeMismatch`] if the number of targets differs from
    /// the number of samples, [`DatasetError::NonFiniteTarget`] if any target
    /// is NaN or infinite. Features may be missing; targets may not.
    pub fn new(features: ArrayView2<f32>, targets: ArrayView1<f32>) -> Result<Self, DatasetError> {
        let n_samples = features.ncols();
        if targets.len() != n_samples {
            return Err(DatasetError::ShapeMismatch {
                expected: n_samples,
                got: targets.len(),
                field: "targets",
            });
        }
        if let Some(sample) = targets.iter().position(|t| !t.is_finite()) {
            return Err(DatasetError::NonFiniteTarget { sample });
        }

        let feature_names = (0..features.nrows()).map(|i| format!("f{i}")).collect();
        Ok(Self {
            features: features.as_standard_layout().into_owned(),
            targets: targets.to_owned(),
            feature_names,
        })
    }

    /// Create a dataset from sample-major data `[n_samples, n_features]`.
    pub fn from_rows(samples: ArrayView2<f32>, targets: ArrayView1<f32>) -> Result<Self, DatasetError> {
        Self::new(samples.t(), targets)
    }

    /// Replace the generated `f0, f1, ...` feature names.
    pub fn with_feature_names(mut self, names: Vec<String>) -> Result<Self, DatasetError> {
        if names.len() != self.n_features() {
            return Err(DatasetError::FeatureNames {
                expected: self.n_features(),
                got: names.len(),
            });
        }
        self.feature_names = names;
        Ok(self)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    #[inline]
    pub fn n_samples(&self) -> usize {
        self.features.ncols()
    }

    #[inline]
    pub fn n_features(&self) -> usize {
        self.features.nrows()
    }

    /// A dataset without samples cannot be cross-validated.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n_samples() == 0
    }

    /// Feature matrix `[n_features, n_samples]`.
    pub fn features(&self) -> ArrayView2<'_, f32> {
        self.features.view()
    }

    /// Values of one feature across all samples (contiguous).
    #[inline]
    pub fn feature(&self, feature: usize) -> &[f32] {
        self.features
            .row(feature)
            .to_slice()
            .expect("feature rows are contiguous in standard layout")
    }

    /// Value of `feature` for `sample`.
    #[inline]
    pub fn get(&self, sample: usize, feature: usize) -> f32 {
        self.features[[feature, sample]]
    }

    pub fn targets(&self) -> &[f32] {
        self.targets
            .as_slice()
            .expect("owned targets are contiguous")
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    // =========================================================================
    // Subsets
    // =========================================================================

    /// Owned copy of the given samples, in the given order.
    pub fn select(&self, samples: &[u32]) -> Dataset {
        let idx: Vec<usize> = samples.iter().map(|&i| i as usize).collect();
        Dataset {
            features: self
                .features
                .select(Axis(1), &idx)
                .as_standard_layout()
                .into_owned(),
            targets: self.targets.select(Axis(0), &idx),
            feature_names: self.feature_names.clone(),
        }
    }

    /// Shuffle and split off a holdout set.
    ///
    /// Returns `(train, holdout)` where the holdout holds
    /// `round(n_samples * holdout_fraction)` samples. Deterministic in `seed`.
    pub fn train_test_split(
        &self,
        holdout_fraction: f32,
        seed: u64,
    ) -> Result<(Dataset, Dataset), DatasetError> {
        if !(0.0..1.0).contains(&holdout_fraction) {
            return Err(DatasetError::InvalidFraction(holdout_fraction));
        }

        let n = self.n_samples();
        let mut idx: Vec<u32> = (0..n as u32).collect();
        let mut rng = Xoshiro256PlusPlus::seed_from_u64(seed);
        idx.shuffle(&mut rng);

        let holdout_len = ((n as f32) * holdout_fraction).round() as usize;
        let (holdout, train) = idx.split_at(holdout_len.min(n));
        Ok((self.select(train), self.select(holdout)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn sample() -> Dataset {
        let features = array![[1.0, 2.0, 3.0, 4.0], [10.0, 20.0, 30.0, 40.0]];
        let targets = array![0.1, 0.2, 0.3, 0.4];
        Dataset::new(features.view(), targets.view()).unwrap()
    }

    #[test]
    fn rejects_target_length_mismatch() {
        let features = array![[1.0, 2.0, 3.0]];
        let targets = array![1.0, 2.0];
        let err = Dataset::new(features.view(), targets.view()).unwrap_err();
        assert!(matches!(
            err,
            DatasetError::ShapeMismatch {
                expected: 3,
                got: 2,
                ..
            }
        ));
    }

    #[test]
    fn rejects_non_finite_targets() {
        let features = array![[1.0, 2.0, 3.0]];
        let err = Dataset::new(features.view(), array![1.0, f32::NAN, 2.0].view()).unwrap_err();
        assert!(matches!(err, DatasetError::NonFiniteTarget { sample: 1 }));

        let err = Dataset::new(features.view(), array![f32::INFINITY, 1.0, 2.0].view()).unwrap_err();
        assert!(matches!(err, DatasetError::NonFiniteTarget { sample: 0 }));
    }

    #[test]
    fn missing_features_are_allowed() {
        let features = array![[1.0, f32::NAN, 3.0]];
        let ds = Dataset::new(features.view(), array![1.0, 2.0, 3.0].view()).unwrap();
        assert!(ds.get(1, 0).is_nan());
    }

    #[test]
    fn from_rows_transposes() {
        let rows = array![[1.0, 10.0], [2.0, 20.0], [3.0, 30.0]];
        let targets = array![0.0, 1.0, 2.0];
        let ds = Dataset::from_rows(rows.view(), targets.view()).unwrap();
        assert_eq!(ds.n_samples(), 3);
        assert_eq!(ds.n_features(), 2);
        assert_eq!(ds.feature(1), &[10.0, 20.0, 30.0]);
        assert_eq!(ds.get(2, 0), 3.0);
    }

    #[test]
    fn select_copies_requested_samples() {
        let ds = sample();
        let subset = ds.select(&[3, 1]);
        assert_eq!(subset.n_samples(), 2);
        assert_eq!(subset.feature(0), &[4.0, 2.0]);
        assert_eq!(subset.targets(), &[0.4, 0.2]);
        assert_eq!(ds.n_samples(), 4);
    }

    #[test]
    fn train_test_split_partitions_samples() {
        let ds = sample();
        let (train, holdout) = ds.train_test_split(0.25, 7).unwrap();
        assert_eq!(train.n_samples(), 3);
        assert_eq!(holdout.n_samples(), 1);

        let mut all: Vec<f32> = train.targets().iter().chain(holdout.targets()).copied().collect();
        all.sort_by(f32::total_cmp);
        assert_eq!(all, vec![0.1, 0.2, 0.3, 0.4]);

        let (again, _) = ds.train_test_split(0.25, 7).unwrap();
        assert_eq!(again.targets(), train.targets());
    }

    #[test]
    fn train_test_split_rejects_bad_fraction() {
        assert!(matches!(
            sample().train_test_split(1.0, 0),
            Err(DatasetError::InvalidFraction(_))
        ));
    }

    #[test]
    fn feature_names_must_match() {
        let ds = sample();
        assert!(ds.clone().with_feature_names(vec!["a".into()]).is_err());
        let named = ds.with_feature_names(vec!["a".into(), "b".into()]).unwrap();
        assert_eq!(named.feature_names(), ["a", "b"]);
    }
}
