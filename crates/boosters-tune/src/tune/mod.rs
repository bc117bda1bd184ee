//! Grid search over cross-validated parameter combinations.
//!
//! - [`ParamGrid`]: Cartesian product of candidate values per parameter
//! - [`GridSearchRunner`]: cross-validates each combination
//! - [`ResultsTable`]: one [`ResultRecord`] per combination, sorted by a
//!   log column, with CSV, JSON and Markdown output
//! - [`CancelToken`], [`Progress`]: cooperative cancellation and progress

mod grid;
mod progress;
mod results;
mod runner;

pub use grid::{GridAxis, ParamGrid};
pub use progress::{CancelToken, Progress, ProgressFn};
pub use results::{ResultRecord, ResultsTable, UNAVAILABLE};
pub use runner::{DEFAULT_SORT_COLUMN, GridSearchRunner};
