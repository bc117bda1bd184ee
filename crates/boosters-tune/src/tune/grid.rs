//! Cartesian-product parameter grids.

use serde::{Deserialize, Serialize};

use crate::param::{ParamSet, ParamValue};

/// One axis of a grid: a parameter name and its candidate values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridAxis {
    pub name: String,
    pub values: Vec<ParamValue>,
}

/// Candidate values per hyperparameter, expanded into every combination.
///
/// The first axis varies fastest, so `eta = [0.1, 0.2]` by
/// `max_depth = [3, 6]` yields `(0.1, 3), (0.2, 3), (0.1, 6), (0.2, 6)`.
///
/// ```
/// use boosters_tune::tune::ParamGrid;
///
/// let grid = ParamGrid::new()
///     .axis("eta", [0.1, 0.2])
///     .axis("max_depth", [3, 6]);
///
/// let combos = grid.combinations();
/// assert_eq!(combos.len(), 4);
/// assert_eq!(combos[1].to_string(), "{eta: 0.2, max_depth: 3}");
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParamGrid {
    axes: Vec<GridAxis>,
}

impl ParamGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an axis. A repeated name replaces the earlier axis in place.
    pub fn axis<V: Into<ParamValue>>(mut self, name: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        let axis = GridAxis {
            name: name.into(),
            values: values.into_iter().map(Into::into).collect(),
        };
        match self.axes.iter_mut().find(|a| a.name == axis.name) {
            Some(slot) => *slot = axis,
            None => self.axes.push(axis),
        }
        self
    }

    pub fn axes(&self) -> &[GridAxis] {
        &self.axes
    }

    /// Number of combinations: product of the axis lengths.
    pub fn len(&self) -> usize {
        if self.axes.is_empty() {
            return 0;
        }
        self.axes.iter().map(|a| a.values.len()).product()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Every combination, first axis fastest. Empty if any axis is empty.
    pub fn combinations(&self) -> Vec<ParamSet> {
        let total = self.len();
        let mut combos = Vec::with_capacity(total);
        for mut index in 0..total {
            let mut params = ParamSet::new();
            for axis in &self.axes {
                let n = axis.values.len();
                params.set(axis.name.clone(), axis.values[index % n].clone());
                index /= n;
            }
            combos.push(params);
        }
        combos
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_axis_varies_fastest() {
        let grid = ParamGrid::new().axis("a", [1, 2, 3]).axis("b", ["x", "y"]);
        let rendered: Vec<String> = grid.combinations().iter().map(ToString::to_string).collect();
        assert_eq!(
            rendered,
            [
                "{a: 1, b: x}",
                "{a: 2, b: x}",
                "{a: 3, b: x}",
                "{a: 1, b: y}",
                "{a: 2, b: y}",
                "{a: 3, b: y}",
            ]
        );
    }

    #[test]
    fn eight_by_seven_grid() {
        let grid = ParamGrid::new()
            .axis("max_depth", 1..=8i64)
            .axis("min_child_weight", [1, 2, 3, 4, 5, 6, 7]);
        assert_eq!(grid.len(), 56);
        let combos = grid.combinations();
        assert_eq!(combos.len(), 56);
        assert!(combos.iter().all(|c| c.names().collect::<Vec<_>>() == ["max_depth", "min_child_weight"]));
    }

    #[test]
    fn empty_axis_or_no_axes_yield_nothing() {
        assert!(ParamGrid::new().combinations().is_empty());
        let grid = ParamGrid::new().axis("a", [1]).axis("b", Vec::<i64>::new());
        assert!(grid.is_empty());
        assert!(grid.combinations().is_empty());
    }

    #[test]
    fn repeated_axis_replaces() {
        let grid = ParamGrid::new().axis("a", [1, 2]).axis("a", [5]);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn deserializes_from_toml_axes() {
        #[derive(Deserialize)]
        struct Job {
            grid: ParamGrid,
        }
        let job: Job = toml::from_str(
            r#"
            [[grid]]
            name = "eta"
            values = [0.3, 0.1]

            [[grid]]
            name = "booster"
            values = ["gbtree"]
            "#,
        )
        .unwrap();
        assert_eq!(job.grid.len(), 2);
        assert_eq!(job.grid.axes()[0].values[1], ParamValue::Float(0.1));
        assert_eq!(job.grid.axes()[1].values[0], ParamValue::Str("gbtree".into()));
    }
}
