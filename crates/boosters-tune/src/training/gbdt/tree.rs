//! Tree node, tree, and forest structures.
//!
//! - [`TreeNode`]: A single tree node (split or leaf)
//! - [`Tree`]: An immutable trained decision tree
//! - [`Forest`]: Base score plus an ordered list of trees

use crate::data::Dataset;
use crate::training::ObjectiveFn;

/// Type alias for tree node indices.
pub type NodeId = u32;

/// Sentinel value for "no child" (leaf nodes).
pub const NO_CHILD: NodeId = u32::MAX;

/// A single tree node.
///
/// Uses struct layout (not enum) for fixed-size nodes.
/// The `is_leaf` flag distinguishes split vs leaf nodes.
#[derive(Clone, Debug, PartialEq)]
pub struct TreeNode {
    /// Feature index for split.
    pub feature: u32,
    /// Raw threshold: `value < threshold` goes left.
    pub threshold: f32,
    /// Direction for missing values.
    pub default_left: bool,
    /// Left child node index.
    pub left: NodeId,
    /// Right child node index.
    pub right: NodeId,
    /// Leaf prediction value (already scaled by the learning rate).
    pub value: f32,
    /// Whether this is a leaf node.
    pub is_leaf: bool,
}

impl Default for TreeNode {
    fn default() -> Self {
        Self {
            feature: 0,
            threshold: 0.0,
            default_left: false,
            left: NO_CHILD,
            right: NO_CHILD,
            value: 0.0,
            is_leaf: true,
        }
    }
}

impl TreeNode {
    #[inline]
    pub fn leaf(value: f32) -> Self {
        Self {
            is_leaf: true,
            value,
            ..Default::default()
        }
    }

    #[inline]
    pub fn split(feature: u32, threshold: f32, default_left: bool) -> Self {
        Self {
            feature,
            threshold,
            default_left,
            is_leaf: false,
            ..Default::default()
        }
    }

    /// Child index for a feature value.
    #[inline]
    fn next(&self, value: f32) -> NodeId {
        let go_left = if value.is_nan() {
            self.default_left
        } else {
            value < self.threshold
        };
        if go_left { self.left } else { self.right }
    }
}

/// An immutable trained decision tree.
///
/// Nodes are stored in a contiguous array. Root is always at index 0.
#[derive(Clone, Debug, PartialEq)]
pub struct Tree {
    nodes: Vec<TreeNode>,
}

impl Tree {
    /// Build a tree from nodes. Panics in debug builds if the root is missing.
    pub(crate) fn new(nodes: Vec<TreeNode>) -> Self {
        debug_assert!(!nodes.is_empty());
        Self { nodes }
    }

    /// Single-leaf tree.
    pub fn constant(value: f32) -> Self {
        Self::new(vec![TreeNode::leaf(value)])
    }

    pub fn nodes(&self) -> &[TreeNode] {
        &self.nodes
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn n_leaves(&self) -> usize {
        self.nodes.iter().filter(|n| n.is_leaf).count()
    }

    /// Maximum root-to-leaf depth (a single leaf has depth 0).
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[TreeNode], id: NodeId) -> usize {
            let node = &nodes[id as usize];
            if node.is_leaf {
                0
            } else {
                1 + walk(nodes, node.left).max(walk(nodes, node.right))
            }
        }
        walk(&self.nodes, 0)
    }

    /// Leaf value for one sample.
    #[inline]
    pub fn predict_sample(&self, dataset: &Dataset, sample: usize) -> f32 {
        let mut id: NodeId = 0;
        loop {
            let node = &self.nodes[id as usize];
            if node.is_leaf {
                return node.value;
            }
            id = node.next(dataset.get(sample, node.feature as usize));
        }
    }

    /// Add this tree's output to `predictions` for every sample.
    pub fn predict_into(&self, dataset: &Dataset, predictions: &mut [f32]) {
        for (sample, pred) in predictions.iter_mut().enumerate() {
            *pred += self.predict_sample(dataset, sample);
        }
    }
}

// =============================================================================
// Forest
// =============================================================================

/// Collection of trees forming a single-output ensemble.
#[derive(Clone, Debug, PartialEq)]
pub struct Forest {
    base_score: f32,
    trees: Vec<Tree>,
}

impl Forest {
    pub fn new(base_score: f32) -> Self {
        Self {
            base_score,
            trees: Vec::new(),
        }
    }

    pub fn push_tree(&mut self, tree: Tree) {
        self.trees.push(tree);
    }

    #[inline]
    pub fn trees(&self) -> &[Tree] {
        &self.trees
    }

    #[inline]
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    #[inline]
    pub fn base_score(&self) -> f32 {
        self.base_score
    }

    /// Margin predictions (base score plus every tree).
    pub fn predict_raw(&self, dataset: &Dataset) -> Vec<f32> {
        let mut predictions = vec![self.base_score; dataset.n_samples()];
        for tree in &self.trees {
            tree.predict_into(dataset, &mut predictions);
        }
        predictions
    }

    /// Predictions in the objective's output space.
    pub fn predict(&self, dataset: &Dataset, objective: &impl ObjectiveFn) -> Vec<f32> {
        let mut predictions = self.predict_raw(dataset);
        objective.transform_predictions(&mut predictions);
        predictions
    }
}
