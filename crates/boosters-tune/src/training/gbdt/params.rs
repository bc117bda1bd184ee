//! GBDT hyperparameters and their validation.
//!
//! [`GBDTParams`] is filled from defaults and then overridden by named
//! values (XGBoost spelling, see [`GBDTParams::apply`]), so a grid axis such
//! as `eta` or `max_depth` maps straight onto a field.

use crate::param::{ParamSet, ParamValue};
use crate::training::Verbosity;

use super::split::GainParams;

// =============================================================================
// ParamError
// =============================================================================

/// A hyperparameter was rejected.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParamError {
    #[error("unknown parameter '{0}'")]
    UnknownParameter(String),

    #[error("parameter '{name}' expects {expected}, got {value}")]
    InvalidType {
        name: String,
        expected: &'static str,
        value: ParamValue,
    },

    #[error("learning_rate must be positive, got {0}")]
    InvalidLearningRate(f32),

    #[error("max_depth must be at least 1, got {0}")]
    InvalidMaxDepth(i64),

    #[error("n_rounds must be at least 1")]
    InvalidNRounds,

    #[error("{field} must be in (0, 1], got {value}")]
    InvalidSamplingRatio { field: &'static str, value: f32 },

    #[error("{field} must be non-negative, got {value}")]
    InvalidRegularization { field: &'static str, value: f32 },
}

// =============================================================================
// GBDTParams
// =============================================================================

/// Parameters for GBDT training.
///
/// Use struct construction with `..Default::default()` for convenient configuration.
#[derive(Clone, Debug, PartialEq)]
pub struct GBDTParams {
    // --- Boosting parameters ---
    /// Number of boosting rounds (trees to train).
    pub n_rounds: u32,
    /// Learning rate (shrinkage).
    pub learning_rate: f32,

    // --- Tree structure ---
    /// Maximum tree depth. A depth-1 tree is a stump.
    pub max_depth: u32,

    // --- Regularization ---
    /// Gain computation parameters (regularization, min child weight, etc.).
    pub gain: GainParams,

    // --- Sampling ---
    /// Fraction of rows used per round.
    pub subsample: f32,
    /// Fraction of features used per tree.
    pub colsample_bytree: f32,

    // --- Logging ---
    pub verbosity: Verbosity,

    // --- Reproducibility ---
    pub seed: u64,
}

impl Default for GBDTParams {
    fn default() -> Self {
        Self {
            n_rounds: 100,
            learning_rate: 0.3,
            max_depth: 6,
            gain: GainParams::default(),
            subsample: 1.0,
            colsample_bytree: 1.0,
            verbosity: Verbosity::Silent,
            seed: 0,
        }
    }
}

impl GBDTParams {
    /// Defaults overridden by every entry of `params`, then validated.
    ///
    /// # Example
    ///
    /// ```
    /// use boosters_tune::training::GBDTParams;
    /// use boosters_tune::ParamSet;
    ///
    /// let params = GBDTParams::from_params(&ParamSet::new().with("eta", 0.1).with("max_depth", 3)).unwrap();
    /// assert_eq!(params.learning_rate, 0.1);
    /// assert_eq!(params.max_depth, 3);
    /// ```
    pub fn from_params(params: &ParamSet) -> Result<Self, ParamError> {
        let mut resolved = Self::default();
        for (name, value) in params.iter() {
            resolved.apply(name, value)?;
        }
        resolved.validate()?;
        Ok(resolved)
    }

    /// Set one field by its XGBoost name. Does not validate ranges.
    pub fn apply(&mut self, name: &str, value: &ParamValue) -> Result<(), ParamError> {
        let float = |expected: &'static str| {
            value
                .as_f64()
                .map(|v| v as f32)
                .ok_or_else(|| ParamError::InvalidType {
                    name: name.to_string(),
                    expected,
                    value: value.clone(),
                })
        };

        match name {
            "eta" | "learning_rate" => self.learning_rate = float("a number")?,
            "max_depth" => {
                let depth = value.as_i64().ok_or_else(|| ParamError::InvalidType {
                    name: name.to_string(),
                    expected: "an integer",
                    value: value.clone(),
                })?;
                if depth < 1 || depth > u32::MAX as i64 {
                    return Err(ParamError::InvalidMaxDepth(depth));
                }
                self.max_depth = depth as u32;
            }
            "min_child_weight" => self.gain.min_child_weight = float("a number")?,
            "gamma" | "min_split_loss" => self.gain.min_gain = float("a number")?,
            "lambda" | "reg_lambda" => self.gain.reg_lambda = float("a number")?,
            "alpha" | "reg_alpha" => self.gain.reg_alpha = float("a number")?,
            "subsample" => self.subsample = float("a number")?,
            "colsample_bytree" => self.colsample_bytree = float("a number")?,
            other => return Err(ParamError::UnknownParameter(other.to_string())),
        }
        Ok(())
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// - `learning_rate <= 0` (or NaN)
    /// - `n_rounds == 0`
    /// - sampling ratios outside (0, 1]
    /// - negative regularization parameters
    pub fn validate(&self) -> Result<(), ParamError> {
        if !(self.learning_rate > 0.0) {
            return Err(ParamError::InvalidLearningRate(self.learning_rate));
        }
        if self.n_rounds == 0 {
            return Err(ParamError::InvalidNRounds);
        }
        if self.max_depth == 0 {
            return Err(ParamError::InvalidMaxDepth(0));
        }
        for (field, value) in [
            ("subsample", self.subsample),
            ("colsample_bytree", self.colsample_bytree),
        ] {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ParamError::InvalidSamplingRatio { field, value });
            }
        }
        for (field, value) in [
            ("lambda", self.gain.reg_lambda),
            ("alpha", self.gain.reg_alpha),
            ("gamma", self.gain.min_gain),
            ("min_child_weight", self.gain.min_child_weight),
        ] {
            if !(value >= 0.0) {
                return Err(ParamError::InvalidRegularization { field, value });
            }
        }
        Ok(())
    }
}
