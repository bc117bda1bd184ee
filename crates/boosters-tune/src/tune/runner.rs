//! The grid search driver.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, error, info, warn};

use crate::cv::{CrossValidator, CvConfig, LogColumn};
use crate::data::Dataset;
use crate::error::{Result, TuneError};
use crate::param::ParamSet;
use crate::utils::run_with_threads;

use super::grid::ParamGrid;
use super::progress::{CancelToken, Progress, ProgressFn};
use super::results::{ResultRecord, ResultsTable};

/// Default sort column: held-out metric mean.
pub const DEFAULT_SORT_COLUMN: &str = "test_metric_mean";

/// Cross-validates every parameter combination and ranks the results.
///
/// Each combination is merged over [`CvConfig::base_params`] and handed to
/// the [`CrossValidator`] with the seed chosen by [`CvConfig::seed_policy`].
/// The row at the reported best iteration becomes the combination's
/// [`ResultRecord`]. A combination that is rejected, fails numerically,
/// panics or never reports a best iteration is kept with unavailable
/// metrics and a warning; only a backend that cannot run at all aborts.
///
/// Combinations run sequentially by default. With `n_threads != 1` they are
/// spread over a rayon pool; since every combination keeps its own seed and
/// the table is sorted at the end, the output does not depend on scheduling.
///
/// # Example
///
/// ```
/// use boosters_tune::cv::{CvConfig, GbdtCrossValidator};
/// use boosters_tune::testing::synthetic_regression;
/// use boosters_tune::training::Objective;
/// use boosters_tune::tune::{GridSearchRunner, ParamGrid};
///
/// let dataset = synthetic_regression(150, 3, 0.1, 7);
/// let config = CvConfig::builder().n_folds(3).n_rounds(30).early_stopping_rounds(5).build().unwrap();
/// let grid = ParamGrid::new().axis("eta", [0.3, 0.1]).axis("max_depth", [2, 4]);
///
/// let runner = GridSearchRunner::new(GbdtCrossValidator::new(Objective::squared()));
/// let table = runner.run(&grid.combinations(), &dataset, &config).unwrap();
///
/// assert_eq!(table.len(), 4);
/// assert!(table.best().is_some());
/// ```
#[derive(Clone)]
pub struct GridSearchRunner {
    validator: Arc<dyn CrossValidator>,
    sort_by: String,
    descending: bool,
    n_threads: usize,
    progress: Option<Arc<ProgressFn>>,
    cancel: Option<CancelToken>,
}

/// What happened to one combination.
enum Outcome {
    Done(ResultRecord),
    Skipped,
    Fatal(String),
}

impl GridSearchRunner {
    pub fn new(validator: impl CrossValidator + 'static) -> Self {
        Self::from_arc(Arc::new(validator))
    }

    /// Share a validator that is also used elsewhere.
    pub fn from_arc(validator: Arc<dyn CrossValidator>) -> Self {
        Self {
            validator,
            sort_by: DEFAULT_SORT_COLUMN.to_string(),
            descending: false,
            n_threads: 1,
            progress: None,
            cancel: None,
        }
    }

    /// Evaluation-log column to sort by, e.g. `test_rmse_mean` or `iteration`.
    /// `metric` may stand in for the metric name.
    pub fn with_sort_by(mut self, column: impl Into<String>) -> Self {
        self.sort_by = column.into();
        self
    }

    /// Sort largest first, for metrics where higher is better.
    pub fn with_descending(mut self, descending: bool) -> Self {
        self.descending = descending;
        self
    }

    /// Threads for combinations: `0` = all cores, `1` = sequential.
    pub fn with_n_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads;
        self
    }

    /// Called after every finished combination, from the worker that ran it.
    pub fn with_progress(mut self, progress: impl Fn(Progress) + Send + Sync + 'static) -> Self {
        self.progress = Some(Arc::new(progress));
        self
    }

    pub fn with_cancel_token(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    pub fn validator(&self) -> &dyn CrossValidator {
        self.validator.as_ref()
    }

    /// Expand `grid` and run every combination.
    pub fn run_grid(&self, grid: &ParamGrid, dataset: &Dataset, config: &CvConfig) -> Result<ResultsTable> {
        self.run(&grid.combinations(), dataset, config)
    }

    /// Cross-validate each combination and return the sorted table.
    ///
    /// # Errors
    ///
    /// - [`TuneError::InvalidArgument`] for no combinations, an empty
    ///   dataset, an invalid `config` or an unknown sort column. Nothing is
    ///   cross-validated in that case.
    /// - [`TuneError::CollaboratorUnavailable`] if the validator reports it
    ///   cannot run at all.
    ///
    /// If cancelled, combinations not yet started are left out and the
    /// table is marked incomplete.
    pub fn run(&self, combinations: &[ParamSet], dataset: &Dataset, config: &CvConfig) -> Result<ResultsTable> {
        if combinations.is_empty() {
            return Err(TuneError::InvalidArgument("no parameter combinations".into()));
        }
        if dataset.is_empty() {
            return Err(TuneError::InvalidArgument("training set is empty".into()));
        }
        config
            .validate()
            .map_err(|e| TuneError::InvalidArgument(e.to_string()))?;

        let metric = self.validator.metric_name().to_string();
        let sort_by = LogColumn::parse(&self.sort_by, &metric).ok_or_else(|| {
            TuneError::InvalidArgument(format!("unknown sort column `{}` for metric `{metric}`", self.sort_by))
        })?;

        let total = combinations.len();
        info!(
            combinations = total,
            n_folds = config.n_folds,
            n_rounds = config.n_rounds,
            seed = config.seed,
            "starting grid search"
        );

        let completed = AtomicUsize::new(0);
        let aborted = AtomicBool::new(false);
        let outcomes: Vec<Outcome> = run_with_threads(self.n_threads, |parallelism| {
            parallelism.maybe_par_map(0..total, |index| {
                if aborted.load(Ordering::Relaxed) || self.is_cancelled() {
                    return Outcome::Skipped;
                }
                let outcome = self.evaluate(index, &combinations[index], dataset, config);
                if matches!(outcome, Outcome::Fatal(_)) {
                    aborted.store(true, Ordering::Relaxed);
                }
                let done = completed.fetch_add(1, Ordering::Relaxed) + 1;
                if let Some(progress) = &self.progress {
                    progress(Progress { completed: done, total });
                }
                outcome
            })
        });

        let mut records = Vec::with_capacity(total);
        let mut complete = true;
        for outcome in outcomes {
            match outcome {
                Outcome::Done(record) => records.push(record),
                Outcome::Skipped => complete = false,
                Outcome::Fatal(reason) => return Err(TuneError::CollaboratorUnavailable(reason)),
            }
        }

        let failed = records.iter().filter(|r| !r.is_available()).count();
        if complete {
            info!(combinations = total, failed, "grid search finished");
        } else {
            warn!(finished = records.len(), combinations = total, failed, "grid search cancelled");
        }

        Ok(ResultsTable::new(metric, records, sort_by, self.descending, complete))
    }

    fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    fn evaluate(&self, index: usize, combination: &ParamSet, dataset: &Dataset, config: &CvConfig) -> Outcome {
        let seed = config.seed_for(index);
        let params = config.base_params.merged_with(combination);

        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            self.validator.cross_validate(&params, dataset, config, seed)
        }));

        let (metrics, failure) = match result {
            Ok(Ok(cv)) => match cv.best_row() {
                Some(row) => (Some(*row), None),
                None => (None, Some("no best iteration reported".to_string())),
            },
            Ok(Err(err)) if err.is_fatal() => {
                error!(index, params = %combination, %err, "cross-validation cannot run");
                return Outcome::Fatal(err.to_string());
            }
            Ok(Err(err)) => (None, Some(err.to_string())),
            Err(payload) => (None, Some(format!("panicked: {}", panic_message(payload.as_ref())))),
        };

        match (&metrics, &failure) {
            (_, Some(reason)) => warn!(index, params = %combination, %reason, "combination failed"),
            (Some(row), None) => debug!(
                index,
                params = %combination,
                iteration = row.iteration,
                test_mean = row.test_mean,
                "combination finished"
            ),
            (None, None) => {}
        }

        Outcome::Done(ResultRecord {
            index,
            params: combination.clone(),
            seed,
            metrics,
            error: failure,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(s) = payload.downcast_ref::<&str>() {
        *s
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.as_str()
    } else {
        "unknown panic"
    }
}
