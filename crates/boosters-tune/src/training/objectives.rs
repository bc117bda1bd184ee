//! Objective (loss) functions for gradient boosting.
//!
//! Objectives compute gradients and hessians of the loss with respect to the
//! raw (margin) predictions, the initial base score, and the transform from
//! margins to the prediction space metrics work in.
//!
//! # Available Objectives
//!
//! - [`SquaredLoss`]: squared error regression (`reg:squarederror`)
//! - [`LogisticLoss`]: binary classification on {0, 1} targets (`binary:logistic`)

use super::gradients::Gradients;

// =============================================================================
// ObjectiveFn
// =============================================================================

/// An objective (loss) function for training gradient boosted models.
pub trait ObjectiveFn: Send + Sync {
    /// Fill `gradients` for the given margins and targets.
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients);

    /// Optimal constant margin before any tree is added.
    fn base_score(&self, targets: &[f32]) -> f32;

    /// Map margins to the prediction space in place. Identity by default.
    fn transform_predictions(&self, _predictions: &mut [f32]) {}

    /// Name used in logs and configs.
    fn name(&self) -> &'static str;
}

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2 loss) for regression.
///
/// - Loss: `0.5 * (pred - target)²`
/// - Gradient: `pred - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ObjectiveFn for SquaredLoss {
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients) {
        let (grads, hess) = gradients.as_mut_slices();
        for (((g, h), &p), &y) in grads
            .iter_mut()
            .zip(hess.iter_mut())
            .zip(predictions)
            .zip(targets)
        {
            *g = p - y;
            *h = 1.0;
        }
    }

    fn base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let sum: f64 = targets.iter().map(|&y| y as f64).sum();
        (sum / targets.len() as f64) as f32
    }

    fn name(&self) -> &'static str {
        "reg:squarederror"
    }
}

// =============================================================================
// Logistic Loss
// =============================================================================

/// Binary cross-entropy on sigmoid-transformed margins.
///
/// - Gradient: `sigmoid(pred) - target`
/// - Hessian: `max(p * (1 - p), 1e-16)`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticLoss;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

impl ObjectiveFn for LogisticLoss {
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients) {
        let (grads, hess) = gradients.as_mut_slices();
        for (((g, h), &p), &y) in grads
            .iter_mut()
            .zip(hess.iter_mut())
            .zip(predictions)
            .zip(targets)
        {
            let prob = sigmoid(p);
            *g = prob - y;
            *h = (prob * (1.0 - prob)).max(1e-16);
        }
    }

    fn base_score(&self, targets: &[f32]) -> f32 {
        if targets.is_empty() {
            return 0.0;
        }
        let mean = targets.iter().map(|&y| y as f64).sum::<f64>() / targets.len() as f64;
        let p = mean.clamp(1e-6, 1.0 - 1e-6);
        (p / (1.0 - p)).ln() as f32
    }

    fn transform_predictions(&self, predictions: &mut [f32]) {
        for p in predictions {
            *p = sigmoid(*p);
        }
    }

    fn name(&self) -> &'static str {
        "binary:logistic"
    }
}

// =============================================================================
// Objective Enum
// =============================================================================

/// Runtime-selected objective.
///
/// ```
/// use boosters_tune::training::Objective;
///
/// let objective = Objective::from_name("binary:logistic").unwrap();
/// assert_eq!(objective, Objective::logistic());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Objective {
    #[default]
    SquaredError,
    Logistic,
}

impl Objective {
    pub fn squared() -> Self {
        Objective::SquaredError
    }

    pub fn logistic() -> Self {
        Objective::Logistic
    }

    /// Parse an XGBoost-style objective name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "reg:squarederror" | "squared_error" | "regression" | "l2" => Some(Objective::SquaredError),
            "binary:logistic" | "logistic" | "binary" => Some(Objective::Logistic),
            _ => None,
        }
    }
}

impl ObjectiveFn for Objective {
    fn compute_gradients(&self, predictions: &[f32], targets: &[f32], gradients: &mut Gradients) {
        match self {
            Objective::SquaredError => SquaredLoss.compute_gradients(predictions, targets, gradients),
            Objective::Logistic => LogisticLoss.compute_gradients(predictions, targets, gradients),
        }
    }

    fn base_score(&self, targets: &[f32]) -> f32 {
        match self {
            Objective::SquaredError => SquaredLoss.base_score(targets),
            Objective::Logistic => LogisticLoss.base_score(targets),
        }
    }

    fn transform_predictions(&self, predictions: &mut [f32]) {
        match self {
            Objective::SquaredError => SquaredLoss.transform_predictions(predictions),
            Objective::Logistic => LogisticLoss.transform_predictions(predictions),
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Objective::SquaredError => SquaredLoss.name(),
            Objective::Logistic => LogisticLoss.name(),
        }
    }
}
