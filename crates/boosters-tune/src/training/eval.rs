//! Evaluation utilities for training.
//!
//! Provides the [`Evaluator`] component for computing metrics during training,
//! and [`MetricValue`] for wrapping computed metrics with metadata.

use super::metrics::{MetricFn, PredictionKind};
use super::objectives::ObjectiveFn;

// =============================================================================
// MetricValue
// =============================================================================

/// A computed metric value with metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MetricValue {
    /// Name of the metric (e.g., "train-rmse", "test-logloss").
    pub name: String,
    /// The computed value.
    pub value: f64,
    /// Whether higher values are better.
    pub higher_is_better: bool,
}

impl MetricValue {
    pub fn new(name: impl Into<String>, value: f64, higher_is_better: bool) -> Self {
        Self {
            name: name.into(),
            value,
            higher_is_better,
        }
    }
}

impl std::fmt::Display for MetricValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {:.6}", self.name, self.value)
    }
}

// =============================================================================
// Evaluator
// =============================================================================

/// Computes a metric on margin predictions, applying the objective's
/// transform first when the metric expects it.
///
/// # Example
///
/// ```
/// use boosters_tune::training::{Evaluator, Metric, Objective};
///
/// let objective = Objective::logistic();
/// let metric = Metric::logloss();
/// let mut evaluator = Evaluator::new(&objective, &metric);
///
/// // Margin 0.0 is probability 0.5 after the sigmoid.
/// let value = evaluator.compute(&[0.0, 0.0], &[1.0, 0.0]);
/// assert!((value - 2.0f64.ln()).abs() < 1e-6);
/// ```
pub struct Evaluator<'a, O: ObjectiveFn, M: MetricFn> {
    objective: &'a O,
    metric: &'a M,
    transform_buffer: Vec<f32>,
}

impl<'a, O: ObjectiveFn, M: MetricFn> Evaluator<'a, O, M> {
    pub fn new(objective: &'a O, metric: &'a M) -> Self {
        Self {
            objective,
            metric,
            transform_buffer: Vec::new(),
        }
    }

    /// Whether higher metric values are better.
    pub fn higher_is_better(&self) -> bool {
        self.metric.higher_is_better()
    }

    /// The metric name.
    pub fn metric_name(&self) -> &'static str {
        self.metric.name()
    }

    /// Compute a single metric value from margins.
    pub fn compute(&mut self, predictions: &[f32], targets: &[f32]) -> f64 {
        if self.metric.expected_prediction_kind() == PredictionKind::Margin {
            return self.metric.compute(predictions, targets);
        }

        self.transform_buffer.clear();
        self.transform_buffer.extend_from_slice(predictions);
        self.objective.transform_predictions(&mut self.transform_buffer);
        self.metric.compute(&self.transform_buffer, targets)
    }

    /// Compute metric and wrap in MetricValue.
    pub fn compute_metric(
        &mut self,
        name: impl Into<String>,
        predictions: &[f32],
        targets: &[f32],
    ) -> MetricValue {
        let value = self.compute(predictions, targets);
        MetricValue::new(name, value, self.higher_is_better())
    }
}
