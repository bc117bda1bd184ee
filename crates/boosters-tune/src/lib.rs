//! boosters-tune: hyperparameter grid search over k-fold cross validation
//! for gradient boosted trees.
//!
//! # Key Types
//!
//! - [`GridSearchRunner`] - Cross-validates every parameter combination
//! - [`ParamGrid`] / [`ParamSet`] - Candidate values and single combinations
//! - [`CvConfig`] - Folds, round budget, early stopping and seed policy
//! - [`CrossValidator`] - The cross-validation seam, implemented by
//!   [`GbdtCrossValidator`] with the built-in GBDT trainer
//! - [`ResultsTable`] - Sorted results with CSV, JSON and Markdown output
//!
//! # Example
//!
//! ```
//! use boosters_tune::testing::synthetic_regression;
//! use boosters_tune::training::Objective;
//! use boosters_tune::{CvConfig, GbdtCrossValidator, GridSearchRunner, ParamGrid};
//!
//! let dataset = synthetic_regression(120, 3, 0.1, 0);
//! let config = CvConfig::builder().n_folds(3).n_rounds(20).early_stopping_rounds(5).build().unwrap();
//! let grid = ParamGrid::new().axis("eta", [0.3, 0.2, 0.1]);
//!
//! let table = GridSearchRunner::new(GbdtCrossValidator::new(Objective::squared()))
//!     .run(&grid.combinations(), &dataset, &config)
//!     .unwrap();
//!
//! assert_eq!(table.len(), 3);
//! assert_eq!(table.columns()[..2], ["eta", "iteration"]);
//! ```

pub mod config;
pub mod cv;
pub mod data;
pub mod testing;
pub mod training;
pub mod tune;

mod error;
mod param;
mod utils;

// =============================================================================
// Convenience Re-exports
// =============================================================================

pub use error::{Result, TuneError};
pub use param::{ParamSet, ParamValue};

pub use cv::{CrossValidator, CvConfig, CvError, CvResult, GbdtCrossValidator, SeedPolicy};
pub use data::{Dataset, DatasetError};
pub use tune::{CancelToken, GridSearchRunner, ParamGrid, ResultRecord, ResultsTable};

// Shared utilities
pub use utils::{Parallelism, mix_seed, run_with_threads};
