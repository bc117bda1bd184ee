//! Evaluation metrics for model quality.
//!
//! Metrics are separate from loss functions: a model might be trained with
//! one loss but evaluated with a different metric.
//!
//! # Available Metrics
//!
//! - [`Rmse`]: Root Mean Squared Error
//! - [`Mae`]: Mean Absolute Error
//! - [`LogLoss`]: Binary cross-entropy

use super::objectives::Objective;

/// What prediction space a metric expects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionKind {
    /// Raw model output.
    Margin,
    /// Output after the objective's transform (probabilities for logistic).
    Value,
}

// =============================================================================
// MetricFn
// =============================================================================

/// A metric computed over predictions and targets.
pub trait MetricFn: Send + Sync {
    /// Compute the metric. Empty inputs yield `0.0`.
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64;

    /// Whether higher values indicate a better model.
    fn higher_is_better(&self) -> bool;

    /// Prediction space the metric expects.
    fn expected_prediction_kind(&self) -> PredictionKind {
        PredictionKind::Value
    }

    fn name(&self) -> &'static str;
}

// =============================================================================
// RMSE (Root Mean Squared Error)
// =============================================================================

/// Root Mean Squared Error: sqrt(mean((pred - label)²))
///
/// Lower is better. Used for regression tasks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rmse;

impl MetricFn for Rmse {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let sum_sq: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &y)| {
                let diff = p as f64 - y as f64;
                diff * diff
            })
            .sum();
        (sum_sq / predictions.len() as f64).sqrt()
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "rmse"
    }
}

// =============================================================================
// MAE (Mean Absolute Error)
// =============================================================================

/// Mean Absolute Error: mean(|pred - label|)
///
/// Lower is better. More robust to outliers than RMSE.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mae;

impl MetricFn for Mae {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        let sum_ae: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &y)| (p as f64 - y as f64).abs())
            .sum();
        sum_ae / predictions.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "mae"
    }
}

// =============================================================================
// LogLoss
// =============================================================================

/// Binary cross-entropy on probabilities, clipped to `[1e-15, 1 - 1e-15]`.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogLoss;

impl MetricFn for LogLoss {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        if predictions.is_empty() {
            return 0.0;
        }
        const EPS: f64 = 1e-15;
        let sum: f64 = predictions
            .iter()
            .zip(targets)
            .map(|(&p, &y)| {
                let p = (p as f64).clamp(EPS, 1.0 - EPS);
                let y = y as f64;
                -(y * p.ln() + (1.0 - y) * (1.0 - p).ln())
            })
            .sum();
        sum / predictions.len() as f64
    }

    fn higher_is_better(&self) -> bool {
        false
    }

    fn name(&self) -> &'static str {
        "logloss"
    }
}

// =============================================================================
// Metric Enum
// =============================================================================

/// Runtime-selected metric.
///
/// ```
/// use boosters_tune::training::{Metric, MetricFn, Objective};
///
/// assert_eq!(Metric::from_name("mae"), Some(Metric::Mae));
/// assert_eq!(Metric::default_for(Objective::logistic()).name(), "logloss");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Metric {
    #[default]
    Rmse,
    Mae,
    LogLoss,
}

impl Metric {
    pub fn rmse() -> Self {
        Metric::Rmse
    }

    pub fn mae() -> Self {
        Metric::Mae
    }

    pub fn logloss() -> Self {
        Metric::LogLoss
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "rmse" => Some(Metric::Rmse),
            "mae" => Some(Metric::Mae),
            "logloss" => Some(Metric::LogLoss),
            _ => None,
        }
    }

    /// XGBoost's default evaluation metric for an objective.
    pub fn default_for(objective: Objective) -> Self {
        match objective {
            Objective::SquaredError => Metric::Rmse,
            Objective::Logistic => Metric::LogLoss,
        }
    }
}

impl MetricFn for Metric {
    fn compute(&self, predictions: &[f32], targets: &[f32]) -> f64 {
        match self {
            Metric::Rmse => Rmse.compute(predictions, targets),
            Metric::Mae => Mae.compute(predictions, targets),
            Metric::LogLoss => LogLoss.compute(predictions, targets),
        }
    }

    fn higher_is_better(&self) -> bool {
        match self {
            Metric::Rmse => Rmse.higher_is_better(),
            Metric::Mae => Mae.higher_is_better(),
            Metric::LogLoss => LogLoss.higher_is_better(),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Metric::Rmse => Rmse.name(),
            Metric::Mae => Mae.name(),
            Metric::LogLoss => LogLoss.name(),
        }
    }
}
