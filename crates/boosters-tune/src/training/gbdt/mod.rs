//! Gradient boosted decision trees.
//!
//! - [`GBDTTrainer`]: boosting loop, one-shot or round by round
//! - [`TreeGrower`]: exact greedy depth-wise tree growth
//! - [`Forest`], [`Tree`]: the trained model
//! - [`GBDTParams`]: hyperparameters, settable by XGBoost name

mod grower;
mod params;
mod sampling;
mod split;
mod trainer;
mod tree;

pub use grower::{GrowerParams, TreeGrower};
pub use params::{GBDTParams, ParamError};
pub use sampling::{ColumnSampler, RowSampler};
pub use split::{GainParams, SplitCandidate};
pub use trainer::{BoostingState, GBDTTrainer};
pub use tree::{Forest, NodeId, Tree, TreeNode, NO_CHILD};
