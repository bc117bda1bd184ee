//! Tree grower for gradient boosting.
//!
//! Exact greedy, depth-wise: every node scans the sorted values of each
//! allowed feature and keeps the split with the largest positive gain.
//! Missing values are tried on both sides and the better side becomes the
//! node's default direction.

use std::collections::VecDeque;

use crate::data::Dataset;
use crate::training::Gradients;
use crate::utils::Parallelism;

use super::split::{GainParams, SplitCandidate};
use super::tree::{NodeId, Tree, TreeNode};

/// Parameters for tree growth.
#[derive(Clone, Debug)]
pub struct GrowerParams {
    /// Gain computation and constraint parameters.
    pub gain: GainParams,
    /// Learning rate, folded into the leaf values.
    pub learning_rate: f32,
    /// Maximum depth of the tree.
    pub max_depth: u32,
}

impl Default for GrowerParams {
    fn default() -> Self {
        Self {
            gain: GainParams::default(),
            learning_rate: 0.3,
            max_depth: 6,
        }
    }
}

/// A node waiting to be split or turned into a leaf.
struct PendingNode {
    id: NodeId,
    rows: Vec<u32>,
    depth: u32,
    grad_sum: f64,
    hess_sum: f64,
}

/// Grows a single decision tree from gradient and hessian vectors.
pub struct TreeGrower {
    params: GrowerParams,
    parallelism: Parallelism,
}

impl TreeGrower {
    pub fn new(params: GrowerParams, parallelism: Parallelism) -> Self {
        Self {
            params,
            parallelism,
        }
    }

    pub fn params(&self) -> &GrowerParams {
        &self.params
    }

    /// Grow a tree on `rows`, splitting only on `features`.
    pub fn grow(&self, dataset: &Dataset, gradients: &Gradients, rows: &[u32], features: &[u32]) -> Tree {
        let (grad_sum, hess_sum) = gradients.sum(rows);
        let mut nodes = vec![TreeNode::default()];
        let mut queue = VecDeque::from([PendingNode {
            id: 0,
            rows: rows.to_vec(),
            depth: 0,
            grad_sum,
            hess_sum,
        }]);

        while let Some(node) = queue.pop_front() {
            let split = if node.depth < self.params.max_depth && node.rows.len() >= 2 {
                self.find_split(dataset, gradients, &node, features)
            } else {
                None
            };

            let Some(split) = split else {
                nodes[node.id as usize] = TreeNode::leaf(self.leaf_value(node.grad_sum, node.hess_sum));
                continue;
            };

            let (left_rows, right_rows) = partition(dataset, &node.rows, &split);
            let left_id = nodes.len() as NodeId;
            let right_id = left_id + 1;
            nodes.push(TreeNode::default());
            nodes.push(TreeNode::default());

            let mut split_node = TreeNode::split(split.feature, split.threshold, split.default_left);
            split_node.left = left_id;
            split_node.right = right_id;
            nodes[node.id as usize] = split_node;

            let (lg, lh) = gradients.sum(&left_rows);
            queue.push_back(PendingNode {
                id: left_id,
                rows: left_rows,
                depth: node.depth + 1,
                grad_sum: lg,
                hess_sum: lh,
            });
            queue.push_back(PendingNode {
                id: right_id,
                rows: right_rows,
                depth: node.depth + 1,
                grad_sum: node.grad_sum - lg,
                hess_sum: node.hess_sum - lh,
            });
        }

        Tree::new(nodes)
    }

    #[inline]
    fn leaf_value(&self, grad_sum: f64, hess_sum: f64) -> f32 {
        self.params.learning_rate * self.params.gain.compute_leaf_weight(grad_sum, hess_sum)
    }

    /// Best split over all features, ties resolved towards the lower feature index.
    fn find_split(
        &self,
        dataset: &Dataset,
        gradients: &Gradients,
        node: &PendingNode,
        features: &[u32],
    ) -> Option<SplitCandidate> {
        let per_feature = self.parallelism.maybe_par_map(features.to_vec(), |feature| {
            best_split_for_feature(&self.params.gain, dataset, gradients, node, feature)
        });

        let mut best = None;
        for candidate in per_feature.into_iter().flatten() {
            SplitCandidate::keep_better(&mut best, candidate);
        }
        best
    }
}

/// Scan one feature's sorted values.
fn best_split_for_feature(
    gain: &GainParams,
    dataset: &Dataset,
    gradients: &Gradients,
    node: &PendingNode,
    feature: u32,
) -> Option<SplitCandidate> {
    let values = dataset.feature(feature as usize);
    let grads = gradients.grads();
    let hess = gradients.hess();

    let mut present: Vec<(f32, f32, f32)> = node
        .rows
        .iter()
        .filter_map(|&r| {
            let r = r as usize;
            let v = values[r];
            (!v.is_nan()).then(|| (v, grads[r], hess[r]))
        })
        .collect();
    if present.len() < 2 {
        return None;
    }
    present.sort_by(|a, b| a.0.total_cmp(&b.0));

    let has_missing = present.len() < node.rows.len();
    let (present_g, present_h) = present
        .iter()
        .fold((0.0f64, 0.0f64), |(g, h), &(_, gi, hi)| (g + gi as f64, h + hi as f64));
    let missing_g = node.grad_sum - present_g;
    let missing_h = node.hess_sum - present_h;

    let mut best: Option<SplitCandidate> = None;
    let (mut gl, mut hl) = (0.0f64, 0.0f64);

    for i in 0..present.len() - 1 {
        let (v, g, h) = present[i];
        gl += g as f64;
        hl += h as f64;

        let next = present[i + 1].0;
        if !(v < next) {
            continue;
        }
        let mut threshold = v + (next - v) * 0.5;
        if !(v < threshold) {
            threshold = next;
        }

        let mut try_direction = |left_g: f64, left_h: f64, default_left: bool| {
            let right_g = node.grad_sum - left_g;
            let right_h = node.hess_sum - left_h;
            if !gain.is_valid_split(left_h, right_h) {
                return;
            }
            let split_gain = gain.compute_gain(left_g, left_h, right_g, right_h, node.grad_sum, node.hess_sum);
            if split_gain > 0.0 {
                SplitCandidate::keep_better(
                    &mut best,
                    SplitCandidate {
                        feature,
                        threshold,
                        default_left,
                        gain: split_gain,
                    },
                );
            }
        };

        // Missing values right, then left.
        try_direction(gl, hl, false);
        if has_missing {
            try_direction(gl + missing_g, hl + missing_h, true);
        }
    }

    best
}

/// Split rows into `(left, right)` following the node's decision rule.
fn partition(dataset: &Dataset, rows: &[u32], split: &SplitCandidate) -> (Vec<u32>, Vec<u32>) {
    let values = dataset.feature(split.feature as usize);
    rows.iter().partition(|&&r| {
        let v = values[r as usize];
        if v.is_nan() { split.default_left } else { v < split.threshold }
    })
}
