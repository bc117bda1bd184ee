//! Training data containers.
//!
//! # Overview
//!
//! [`Dataset`] stores features in **feature-major** layout
//! `[n_features, n_samples]` together with one target per sample.
//! Cross validation builds owned fold subsets with [`Dataset::select`];
//! the caller-owned dataset is never mutated.
//!
//! # Missing Values
//!
//! Missing values are represented as `f32::NAN`, as in XGBoost.

mod csv;
mod dataset;

pub use self::csv::{load_csv, read_csv};
pub use dataset::{Dataset, DatasetError};
