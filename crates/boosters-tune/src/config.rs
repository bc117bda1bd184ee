//! TOML description of a whole tuning job.
//!
//! ```toml
//! objective = "reg:squarederror"
//! metric = "rmse"
//! sort_by = "test_rmse_mean"
//! n_threads = 0
//!
//! [cv]
//! n_folds = 10
//! n_rounds = 500
//! early_stopping_rounds = 10
//! seed = 1
//! seed_policy = "fixed"
//!
//! [base]
//! subsample = 0.8
//!
//! [[grid]]
//! name = "eta"
//! values = [0.3, 0.2, 0.1]
//!
//! [[grid]]
//! name = "max_depth"
//! values = [3, 6]
//! ```
//!
//! Every section is optional except `[[grid]]`.

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cv::{CvConfig, CvConfigError, GbdtCrossValidator, SeedPolicy};
use crate::param::ParamSet;
use crate::training::{Metric, MetricFn, Objective, Verbosity};
use crate::tune::{DEFAULT_SORT_COLUMN, GridSearchRunner, ParamGrid};

// =============================================================================
// ConfigError
// =============================================================================

/// Errors loading or interpreting a job file.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse job file: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown objective `{0}`")]
    UnknownObjective(String),

    #[error("unknown metric `{0}`")]
    UnknownMetric(String),

    #[error("invalid [cv] section: {0}")]
    Cv(#[from] CvConfigError),

    #[error("grid has no combinations")]
    EmptyGrid,
}

// =============================================================================
// Sections
// =============================================================================

/// The `[cv]` table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CvSection {
    pub n_folds: usize,
    pub n_rounds: u32,
    pub early_stopping_rounds: Option<u32>,
    pub seed: u64,
    pub seed_policy: SeedPolicy,
}

impl Default for CvSection {
    fn default() -> Self {
        let defaults = CvConfig::default();
        Self {
            n_folds: defaults.n_folds,
            n_rounds: defaults.n_rounds,
            early_stopping_rounds: defaults.early_stopping_rounds,
            seed: defaults.seed,
            seed_policy: defaults.seed_policy,
        }
    }
}

/// A complete tuning job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TuneConfig {
    #[serde(default)]
    pub cv: CvSection,

    /// XGBoost-style objective name. Default: `reg:squarederror`.
    #[serde(default = "default_objective")]
    pub objective: String,

    /// Evaluation metric. Defaults to the objective's usual metric.
    #[serde(default)]
    pub metric: Option<String>,

    /// Parameters shared by every combination.
    #[serde(default)]
    pub base: ParamSet,

    pub grid: ParamGrid,

    #[serde(default = "default_sort_by")]
    pub sort_by: String,

    /// Sort largest first. Defaults to the metric's direction.
    #[serde(default)]
    pub descending: Option<bool>,

    /// `0` = all cores, `1` = sequential.
    #[serde(default = "default_n_threads")]
    pub n_threads: usize,
}

fn default_objective() -> String {
    "reg:squarederror".to_string()
}

fn default_sort_by() -> String {
    DEFAULT_SORT_COLUMN.to_string()
}

fn default_n_threads() -> usize {
    1
}

impl FromStr for TuneConfig {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let config: TuneConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }
}

impl TuneConfig {
    /// Read and validate a job file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        content.parse()
    }

    /// Check names, the `[cv]` settings and that the grid is non-empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.objective()?;
        self.metric()?;
        self.cv_config()?;
        if self.grid.is_empty() {
            return Err(ConfigError::EmptyGrid);
        }
        Ok(())
    }

    pub fn objective(&self) -> Result<Objective, ConfigError> {
        Objective::from_name(&self.objective).ok_or_else(|| ConfigError::UnknownObjective(self.objective.clone()))
    }

    pub fn metric(&self) -> Result<Metric, ConfigError> {
        match &self.metric {
            Some(name) => Metric::from_name(name).ok_or_else(|| ConfigError::UnknownMetric(name.clone())),
            None => Ok(Metric::default_for(self.objective()?)),
        }
    }

    pub fn cv_config(&self) -> Result<CvConfig, ConfigError> {
        let cv = &self.cv;
        let config = CvConfig::builder()
            .n_folds(cv.n_folds)
            .n_rounds(cv.n_rounds)
            .maybe_early_stopping_rounds(cv.early_stopping_rounds)
            .seed(cv.seed)
            .seed_policy(cv.seed_policy)
            .base_params(self.base.clone())
            .build()?;
        Ok(config)
    }

    pub fn combinations(&self) -> Vec<ParamSet> {
        self.grid.combinations()
    }

    /// The built-in GBDT cross-validator for this job.
    pub fn validator(&self, verbosity: Verbosity) -> Result<GbdtCrossValidator, ConfigError> {
        Ok(GbdtCrossValidator::new(self.objective()?)
            .with_metric(self.metric()?)
            .with_verbosity(verbosity))
    }

    /// A runner with this job's sort order and thread count.
    pub fn runner(&self, verbosity: Verbosity) -> Result<GridSearchRunner, ConfigError> {
        let validator = self.validator(verbosity)?;
        let descending = match self.descending {
            Some(descending) => descending,
            None => validator.metric().higher_is_better(),
        };
        Ok(GridSearchRunner::new(validator)
            .with_sort_by(self.sort_by.clone())
            .with_descending(descending)
            .with_n_threads(self.n_threads))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::param::ParamValue;

    const JOB: &str = r#"
        objective = "binary:logistic"
        n_threads = 2

        [cv]
        n_folds = 10
        n_rounds = 500
        early_stopping_rounds = 10
        seed_policy = "per_combination"

        [base]
        subsample = 0.8

        [[grid]]
        name = "eta"
        values = [0.3, 0.2, 0.1]

        [[grid]]
        name = "max_depth"
        values = [3, 6]
    "#;

    #[test]
    fn parses_full_job() {
        let job: TuneConfig = JOB.parse().unwrap();
        assert_eq!(job.objective().unwrap(), Objective::logistic());
        assert_eq!(job.metric().unwrap(), Metric::logloss());
        assert_eq!(job.n_threads, 2);
        assert_eq!(job.sort_by, "test_metric_mean");

        let cv = job.cv_config().unwrap();
        assert_eq!(cv.n_folds, 10);
        assert_eq!(cv.n_rounds, 500);
        assert_eq!(cv.early_stopping_rounds, Some(10));
        assert_eq!(cv.seed, 42);
        assert_eq!(cv.seed_policy, SeedPolicy::PerCombination);
        assert_eq!(cv.base_params.get("subsample"), Some(&ParamValue::Float(0.8)));

        assert_eq!(job.combinations().len(), 6);
    }

    #[test]
    fn minimal_job_uses_defaults() {
        let job: TuneConfig = "[[grid]]\nname = \"eta\"\nvalues = [0.1]\n".parse().unwrap();
        assert_eq!(job.cv, CvSection::default());
        assert_eq!(job.metric().unwrap(), Metric::rmse());
        assert_eq!(job.n_threads, 1);
        assert!(job.base.is_empty());
    }

    #[test]
    fn rejects_bad_jobs() {
        let err = "objective = \"poisson\"\n[[grid]]\nname = \"eta\"\nvalues = [0.1]\n"
            .parse::<TuneConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::UnknownObjective(_)));

        let err = "[cv]\nn_folds = 1\n[[grid]]\nname = \"eta\"\nvalues = [0.1]\n"
            .parse::<TuneConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Cv(CvConfigError::InvalidNFolds(1))));

        let err = "[[grid]]\nname = \"eta\"\nvalues = []\n".parse::<TuneConfig>().unwrap_err();
        assert!(matches!(err, ConfigError::EmptyGrid));

        let err = "folds = 3\n[[grid]]\nname = \"eta\"\nvalues = [0.1]\n"
            .parse::<TuneConfig>()
            .unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
