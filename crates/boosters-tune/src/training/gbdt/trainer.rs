//! GBDT Trainer for gradient boosting.
//!
//! This module provides the main training loop for gradient boosted decision trees.
//! It orchestrates objective computation, tree growing, and prediction updates.
//!
//! Besides the one-shot [`GBDTTrainer::train`], the trainer exposes a
//! round-at-a-time API ([`GBDTTrainer::init_state`] and
//! [`GBDTTrainer::boost_round`]) so that several models can be boosted in
//! lockstep, as cross-validation does.
//!
//! # Example
//!
//! ```
//! use boosters_tune::testing::synthetic_regression;
//! use boosters_tune::training::{GBDTParams, GBDTTrainer, Metric, Objective};
//!
//! let dataset = synthetic_regression(200, 3, 0.1, 7);
//! let params = GBDTParams {
//!     n_rounds: 20,
//!     learning_rate: 0.3,
//!     max_depth: 3,
//!     ..Default::default()
//! };
//!
//! let trainer = GBDTTrainer::new(Objective::squared(), Metric::rmse(), params);
//! let forest = trainer.train(&dataset);
//! assert_eq!(forest.n_trees(), 20);
//! ```

use crate::data::Dataset;
use crate::training::eval::Evaluator;
use crate::training::logger::{TrainingLogger, Verbosity};
use crate::training::metrics::{Metric, MetricFn};
use crate::training::objectives::{Objective, ObjectiveFn};
use crate::training::Gradients;
use crate::utils::{mix_seed, Parallelism};

use super::grower::{GrowerParams, TreeGrower};
use super::params::GBDTParams;
use super::sampling::{ColumnSampler, RowSampler};
use super::tree::Forest;

// =============================================================================
// BoostingState
// =============================================================================

/// Everything that changes between boosting rounds.
#[derive(Debug, Clone)]
pub struct BoostingState {
    forest: Forest,
    /// Margin predictions on the training set.
    predictions: Vec<f32>,
    /// Margin predictions per eval set.
    eval_predictions: Vec<Vec<f32>>,
    gradients: Gradients,
    round: u32,
}

impl BoostingState {
    pub fn forest(&self) -> &Forest {
        &self.forest
    }

    pub fn into_forest(self) -> Forest {
        self.forest
    }

    pub fn predictions(&self) -> &[f32] {
        &self.predictions
    }

    pub fn eval_predictions(&self, set: usize) -> &[f32] {
        &self.eval_predictions[set]
    }

    /// Number of completed rounds.
    pub fn round(&self) -> u32 {
        self.round
    }
}

// =============================================================================
// GBDTTrainer
// =============================================================================

/// Gradient boosted decision tree trainer.
#[derive(Debug, Clone)]
pub struct GBDTTrainer {
    objective: Objective,
    metric: Metric,
    params: GBDTParams,
    parallelism: Parallelism,
}

impl GBDTTrainer {
    pub fn new(objective: Objective, metric: Metric, params: GBDTParams) -> Self {
        Self {
            objective,
            metric,
            params,
            parallelism: Parallelism::Sequential,
        }
    }

    /// Allow parallel split finding.
    pub fn with_parallelism(mut self, parallelism: Parallelism) -> Self {
        self.parallelism = parallelism;
        self
    }

    pub fn params(&self) -> &GBDTParams {
        &self.params
    }

    pub fn objective(&self) -> Objective {
        self.objective
    }

    pub fn metric(&self) -> Metric {
        self.metric
    }

    fn grower(&self) -> TreeGrower {
        TreeGrower::new(
            GrowerParams {
                gain: self.params.gain.clone(),
                learning_rate: self.params.learning_rate,
                max_depth: self.params.max_depth,
            },
            self.parallelism,
        )
    }

    /// Start a model: base score from the training targets, no trees yet.
    pub fn init_state(&self, train: &Dataset, evals: &[&Dataset]) -> BoostingState {
        let base_score = self.objective.base_score(train.targets());
        BoostingState {
            forest: Forest::new(base_score),
            predictions: vec![base_score; train.n_samples()],
            eval_predictions: evals.iter().map(|d| vec![base_score; d.n_samples()]).collect(),
            gradients: Gradients::new(train.n_samples()),
            round: 0,
        }
    }

    /// Add one tree and update every prediction buffer.
    ///
    /// `evals` must be the same datasets, in the same order, as passed to
    /// [`init_state`](Self::init_state).
    pub fn boost_round(&self, state: &mut BoostingState, train: &Dataset, evals: &[&Dataset]) {
        self.boost_round_with(&self.grower(), state, train, evals);
    }

    fn boost_round_with(&self, grower: &TreeGrower, state: &mut BoostingState, train: &Dataset, evals: &[&Dataset]) {
        debug_assert_eq!(evals.len(), state.eval_predictions.len());

        self.objective
            .compute_gradients(&state.predictions, train.targets(), &mut state.gradients);

        let round = state.round as u64;
        let rows = RowSampler::new(self.params.subsample)
            .sample(train.n_samples(), mix_seed(self.params.seed, 2 * round));
        let features = ColumnSampler::new(train.n_features() as u32, self.params.colsample_bytree)
            .sample_for_tree(mix_seed(self.params.seed, 2 * round + 1));

        let tree = grower.grow(train, &state.gradients, &rows, &features);

        tree.predict_into(train, &mut state.predictions);
        for (dataset, preds) in evals.iter().zip(state.eval_predictions.iter_mut()) {
            tree.predict_into(dataset, preds);
        }

        state.forest.push_tree(tree);
        state.round += 1;
    }

    /// Train a model for exactly `n_rounds` rounds on the whole dataset.
    ///
    /// The training metric is only computed when the logger would print it.
    pub fn train(&self, train: &Dataset) -> Forest {
        let grower = self.grower();
        let mut state = self.init_state(train, &[]);

        let mut evaluator = Evaluator::new(&self.objective, &self.metric);
        let mut logger = TrainingLogger::new(self.params.verbosity);
        logger.start_training(self.params.n_rounds as usize);

        for round in 0..self.params.n_rounds {
            self.boost_round_with(&grower, &mut state, train, &[]);

            if logger.verbosity() >= Verbosity::Debug {
                let train_metric = evaluator.compute_metric(
                    format!("train-{}", self.metric.name()),
                    &state.predictions,
                    train.targets(),
                );
                logger.log_metrics(round as usize, &[train_metric]);
            }
        }

        logger.finish_training();
        state.into_forest()
    }
}
