//! The cross-validation seam and its GBDT implementation.

use crate::data::Dataset;
use crate::param::ParamSet;
use crate::training::gbdt::{BoostingState, Forest, GBDTParams, GBDTTrainer, ParamError};
use crate::training::{
    EarlyStopAction, EarlyStopping, Evaluator, Metric, MetricFn, MetricValue, Objective, TrainingLogger, Verbosity,
};
use crate::utils::Parallelism;

use super::config::CvConfig;
use super::folds::KFold;
use super::log::{CvResult, EvalLogRow};

// =============================================================================
// CvError
// =============================================================================

/// Why a cross-validation call produced no result.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CvError {
    /// The combination's parameters were rejected.
    #[error(transparent)]
    InvalidParameter(#[from] ParamError),

    #[error("need at least {required} samples, got {got}")]
    InsufficientData { required: usize, got: usize },

    #[error("non-finite metric at iteration {iteration}")]
    NonFiniteMetric { iteration: usize },

    /// The backend cannot run at all. Fatal for a whole grid search.
    #[error("cross-validation backend unavailable: {0}")]
    Unavailable(String),
}

impl CvError {
    /// Whether the error should abort a whole grid search rather than one row.
    pub fn is_fatal(&self) -> bool {
        matches!(self, CvError::Unavailable(_))
    }
}

// =============================================================================
// CrossValidator
// =============================================================================

/// Runs k-fold cross-validation for one parameter combination.
///
/// Implementations must be safe to call concurrently on the same dataset.
pub trait CrossValidator: Send + Sync {
    /// Cross-validate `params` (already merged over `config.base_params`)
    /// with fold assignment seeded by `seed`.
    fn cross_validate(
        &self,
        params: &ParamSet,
        dataset: &Dataset,
        config: &CvConfig,
        seed: u64,
    ) -> Result<CvResult, CvError>;

    /// Metric name used in evaluation-log column headers.
    fn metric_name(&self) -> &str;
}

// =============================================================================
// GbdtCrossValidator
// =============================================================================

/// Cross-validation with the built-in GBDT trainer.
///
/// All folds are boosted in lockstep: after every round the metric of each
/// fold's training and held-out part is aggregated into one [`EvalLogRow`],
/// and early stopping watches the held-out mean.
///
/// # Example
///
/// ```
/// use boosters_tune::cv::{CrossValidator, CvConfig, GbdtCrossValidator};
/// use boosters_tune::testing::synthetic_regression;
/// use boosters_tune::training::Objective;
/// use boosters_tune::ParamSet;
///
/// let dataset = synthetic_regression(120, 3, 0.1, 1);
/// let config = CvConfig::builder().n_folds(3).n_rounds(20).early_stopping_rounds(5).build().unwrap();
/// let cv = GbdtCrossValidator::new(Objective::squared());
///
/// let params = ParamSet::new().with("eta", 0.3).with("max_depth", 3);
/// let result = cv.cross_validate(&params, &dataset, &config, config.seed).unwrap();
/// assert!(result.best_row().is_some());
/// ```
#[derive(Debug, Clone)]
pub struct GbdtCrossValidator {
    objective: Objective,
    metric: Metric,
    parallelism: Parallelism,
    verbosity: Verbosity,
}

/// Per-fold training state.
struct FoldRun {
    train: Dataset,
    test: Dataset,
    state: BoostingState,
    train_metric: f64,
    test_metric: f64,
}

impl GbdtCrossValidator {
    /// Validator with the objective's default metric.
    pub fn new(objective: Objective) -> Self {
        Self {
            objective,
            metric: Metric::default_for(objective),
            parallelism: Parallelism::Sequential,
            verbosity: Verbosity::Silent,
        }
    }

    pub fn with_metric(mut self, metric: Metric) -> Self {
        self.metric = metric;
        self
    }

    /// Boost folds in parallel.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn with_verbosity(mut self, verbosity: Verbosity) -> Self {
        self.verbosity = verbosity;
        self
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    /// Defaults, then `params`, with the round budget and seed of this call.
    fn resolve_params(&self, params: &ParamSet, n_rounds: u32, seed: u64) -> Result<GBDTParams, ParamError> {
        let mut resolved = GBDTParams {
            n_rounds,
            seed,
            verbosity: self.verbosity,
            ..Default::default()
        };
        for (name, value) in params.iter() {
            resolved.apply(name, value)?;
        }
        resolved.validate()?;
        Ok(resolved)
    }

    /// Train one model on the whole dataset for exactly `n_rounds` rounds.
    pub fn refit(&self, params: &ParamSet, dataset: &Dataset, n_rounds: u32, seed: u64) -> Result<Forest, CvError> {
        if dataset.is_empty() {
            return Err(CvError::InsufficientData { required: 1, got: 0 });
        }
        let params = self.resolve_params(params, n_rounds, seed)?;
        let trainer = GBDTTrainer::new(self.objective, self.metric, params).with_parallelism(self.parallelism);
        Ok(trainer.train(dataset))
    }

    /// Metric of `forest` on `dataset`.
    pub fn score(&self, forest: &Forest, dataset: &Dataset) -> f64 {
        let mut evaluator = Evaluator::new(&self.objective, &self.metric);
        evaluator.compute(&forest.predict_raw(dataset), dataset.targets())
    }
}

impl CrossValidator for GbdtCrossValidator {
    fn cross_validate(
        &self,
        params: &ParamSet,
        dataset: &Dataset,
        config: &CvConfig,
        seed: u64,
    ) -> Result<CvResult, CvError> {
        let gbdt_params = self.resolve_params(params, config.n_rounds, seed)?;
        let folds = KFold::new(config.n_folds, seed).split(dataset.n_samples())?;
        let trainer = GBDTTrainer::new(self.objective, self.metric, gbdt_params);

        let mut runs: Vec<FoldRun> = folds
            .iter()
            .map(|fold| {
                let train = dataset.select(&fold.train);
                let test = dataset.select(&fold.test);
                let state = trainer.init_state(&train, &[&test]);
                FoldRun {
                    train,
                    test,
                    state,
                    train_metric: f64::NAN,
                    test_metric: f64::NAN,
                }
            })
            .collect();

        let mut early_stopping = EarlyStopping::new(config.patience(), self.metric.higher_is_better());
        let mut logger = TrainingLogger::new(self.verbosity);
        logger.start_training(config.n_rounds as usize);
        let mut log = Vec::with_capacity(config.n_rounds as usize);

        for round in 1..=config.n_rounds as usize {
            self.parallelism.maybe_par_for_each(&mut runs, |run| {
                trainer.boost_round(&mut run.state, &run.train, &[&run.test]);
                let mut evaluator = Evaluator::new(&self.objective, &self.metric);
                run.train_metric = evaluator.compute(run.state.predictions(), run.train.targets());
                run.test_metric = evaluator.compute(run.state.eval_predictions(0), run.test.targets());
            });

            let train: Vec<f64> = runs.iter().map(|r| r.train_metric).collect();
            let test: Vec<f64> = runs.iter().map(|r| r.test_metric).collect();
            let row = EvalLogRow::from_folds(round, &train, &test);
            if !row.is_finite() {
                return Err(CvError::NonFiniteMetric { iteration: round });
            }
            log.push(row);

            let higher_is_better = self.metric.higher_is_better();
            logger.log_metrics(
                round - 1,
                &[
                    MetricValue::new(format!("train-{}", self.metric.name()), row.train_mean, higher_is_better),
                    MetricValue::new(format!("test-{}", self.metric.name()), row.test_mean, higher_is_better),
                ],
            );

            if early_stopping.update(row.test_mean) == EarlyStopAction::Stop {
                logger.log_early_stopping(round - 1, early_stopping.best_round(), self.metric.name());
                break;
            }
        }
        logger.finish_training();

        let best_iteration = early_stopping.best_value().map(|_| early_stopping.best_round() + 1);
        Ok(CvResult {
            metric: self.metric.name().to_string(),
            log,
            best_iteration,
        })
    }

    fn metric_name(&self) -> &str {
        self.metric.name()
    }
}
