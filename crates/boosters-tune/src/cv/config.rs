//! Cross-validation settings shared by every combination of one run.
//!
//! # Example
//!
//! ```
//! use boosters_tune::cv::{CvConfig, SeedPolicy};
//! use boosters_tune::ParamSet;
//!
//! let config = CvConfig::builder()
//!     .n_folds(10)
//!     .n_rounds(500)
//!     .early_stopping_rounds(10)
//!     .seed(1)
//!     .seed_policy(SeedPolicy::PerCombination)
//!     .base_params(ParamSet::new().with("max_depth", 3))
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.seed_for(0), config.seed_for(0));
//! assert_ne!(config.seed_for(0), config.seed_for(1));
//! ```

use bon::Builder;
use serde::{Deserialize, Serialize};

use crate::param::ParamSet;
use crate::utils::mix_seed;

// =============================================================================
// CvConfigError
// =============================================================================

/// Invalid cross-validation settings.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CvConfigError {
    #[error("n_folds must be at least 2, got {0}")]
    InvalidNFolds(usize),

    #[error("n_rounds must be at least 1")]
    InvalidNRounds,
}

// =============================================================================
// SeedPolicy
// =============================================================================

/// How the seed for fold assignment is chosen per combination.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedPolicy {
    /// Every combination uses `seed`, so all combinations see the same folds.
    #[default]
    Fixed,
    /// Combination `i` (input position) uses `mix_seed(seed, i)`.
    PerCombination,
}

// =============================================================================
// CvConfig
// =============================================================================

/// Settings shared by every cross-validation call of one grid search.
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(
    derive(Clone, Debug),
    finish_fn(vis = "", name = __build_internal)
)]
pub struct CvConfig {
    /// Number of folds. Default: 5.
    #[builder(default = 5)]
    pub n_folds: usize,

    /// Maximum boosting rounds. Default: 100.
    #[builder(default = 100)]
    pub n_rounds: u32,

    /// Stop after this many rounds without held-out improvement.
    /// `None` disables early stopping.
    pub early_stopping_rounds: Option<u32>,

    /// Base seed. Default: 42.
    #[builder(default = 42)]
    pub seed: u64,

    /// Seed derivation per combination. Default: [`SeedPolicy::Fixed`].
    #[builder(default)]
    pub seed_policy: SeedPolicy,

    /// Parameters applied under every combination.
    #[builder(default)]
    pub base_params: ParamSet,
}

/// Custom finishing function that validates the config.
impl<S: cv_config_builder::IsComplete> CvConfigBuilder<S> {
    /// Build and validate the configuration.
    ///
    /// # Errors
    ///
    /// - `n_folds < 2`
    /// - `n_rounds == 0`
    pub fn build(self) -> Result<CvConfig, CvConfigError> {
        let config = self.__build_internal();
        config.validate()?;
        Ok(config)
    }
}

impl CvConfig {
    /// Check the settings; configs built without the builder can be invalid.
    pub fn validate(&self) -> Result<(), CvConfigError> {
        if self.n_folds < 2 {
            return Err(CvConfigError::InvalidNFolds(self.n_folds));
        }
        if self.n_rounds == 0 {
            return Err(CvConfigError::InvalidNRounds);
        }
        Ok(())
    }

    /// Seed for the combination at input position `index`.
    pub fn seed_for(&self, index: usize) -> u64 {
        match self.seed_policy {
            SeedPolicy::Fixed => self.seed,
            SeedPolicy::PerCombination => mix_seed(self.seed, index as u64),
        }
    }

    /// Patience as the early-stopping callback expects it (`0` disables).
    pub fn patience(&self) -> usize {
        self.early_stopping_rounds.unwrap_or(0) as usize
    }
}

impl Default for CvConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config is valid")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = CvConfig::default();
        assert_eq!(config.n_folds, 5);
        assert_eq!(config.n_rounds, 100);
        assert_eq!(config.seed, 42);
        assert_eq!(config.seed_policy, SeedPolicy::Fixed);
        assert_eq!(config.patience(), 0);
        assert!(config.base_params.is_empty());
    }

    #[test]
    fn invalid_fold_count() {
        let result = CvConfig::builder().n_folds(1).build();
        assert_eq!(result, Err(CvConfigError::InvalidNFolds(1)));
    }

    #[test]
    fn invalid_round_budget() {
        let result = CvConfig::builder().n_rounds(0).build();
        assert_eq!(result, Err(CvConfigError::InvalidNRounds));
    }

    #[test]
    fn fixed_policy_reuses_seed() {
        let config = CvConfig::builder().seed(9).build().unwrap();
        assert_eq!(config.seed_for(0), 9);
        assert_eq!(config.seed_for(17), 9);
    }

    #[test]
    fn per_combination_policy_depends_only_on_index() {
        let config = CvConfig::builder()
            .seed(9)
            .seed_policy(SeedPolicy::PerCombination)
            .build()
            .unwrap();
        assert_eq!(config.seed_for(3), mix_seed(9, 3));
        assert_ne!(config.seed_for(3), config.seed_for(4));
    }

    #[test]
    fn seed_policy_serde_names() {
        #[derive(Deserialize)]
        struct Wrapper {
            policy: SeedPolicy,
        }
        let w: Wrapper = toml::from_str("policy = \"per_combination\"").unwrap();
        assert_eq!(w.policy, SeedPolicy::PerCombination);
    }
}
