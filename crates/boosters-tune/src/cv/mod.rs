//! K-fold cross-validation.
//!
//! [`CrossValidator`] is the seam the grid search calls once per
//! combination; [`GbdtCrossValidator`] implements it with the built-in
//! GBDT trainer.

mod config;
mod folds;
mod log;
mod validator;

pub use config::{CvConfig, CvConfigBuilder, CvConfigError, SeedPolicy};
pub use folds::{Fold, KFold};
pub use log::{CvResult, EvalLogRow, LogColumn};
pub use validator::{CrossValidator, CvError, GbdtCrossValidator};
