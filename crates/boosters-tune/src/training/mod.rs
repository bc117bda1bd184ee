//! Training infrastructure.
//!
//! ## Shared Infrastructure
//!
//! - [`Gradients`]: Gradient/hessian buffer
//! - [`ObjectiveFn`], [`Objective`]: Loss functions
//! - [`MetricFn`], [`Metric`]: Evaluation metrics
//! - [`EarlyStopping`]: Callback for stopping when validation metric plateaus
//! - [`TrainingLogger`], [`Verbosity`]: Structured logging
//!
//! ## Model-Specific Training
//!
//! - [`gbdt`]: Gradient boosted decision trees

mod callback;
mod eval;
pub mod gbdt;
mod gradients;
mod logger;
mod metrics;
mod objectives;

pub use callback::{EarlyStopAction, EarlyStopping};
pub use eval::{Evaluator, MetricValue};
pub use gbdt::{Forest, GBDTParams, GBDTTrainer, GainParams, ParamError};
pub use gradients::Gradients;
pub use logger::{TrainingLogger, Verbosity};
pub use metrics::{LogLoss, Mae, Metric, MetricFn, PredictionKind, Rmse};
pub use objectives::{LogisticLoss, Objective, ObjectiveFn, SquaredLoss};
