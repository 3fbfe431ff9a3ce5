//! Gradient-boosted regression ensemble, evaluated from exported
//! parameters.
//!
//! Each tree is a flat node list with the root at index 0 and children
//! linked strictly forwards, so a walk always terminates. Structure is
//! checked once at load time; scoring itself cannot fail.

use serde::Deserialize;

/// A node in a regression tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        /// Index into the feature row.
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

/// One regression tree as a flat node list.
#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    /// Walk from the root to a leaf for `row`. Values at or below the
    /// split threshold go left, matching the fitting library's rule.
    pub fn score(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    /// Structural check run once at load: every split stays inside the
    /// feature row, every child index stays inside the node list and
    /// points strictly forwards, and every constant is finite.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("node {idx} has a non-finite leaf value"));
                    }
                }
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if *feature >= n_features {
                        return Err(format!(
                            "node {idx} splits on feature {feature}, but rows carry {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {idx} has a non-finite threshold"));
                    }
                    for child in [*left, *right] {
                        if child >= self.nodes.len() {
                            return Err(format!(
                                "node {idx} links to node {child}, past the end of the tree"
                            ));
                        }
                        if child <= idx {
                            return Err(format!(
                                "node {idx} links backwards to node {child}"
                            ));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

/// The exported gradient-boosted regressor.
#[derive(Debug, Clone, Deserialize)]
pub struct GradientBoostingModel {
    /// Columns the estimator was fitted on, in order.
    pub feature_names: Vec<String>,
    /// Boosting starting point, the mean of the training target.
    pub base_score: f64,
    pub learning_rate: f64,
    pub trees: Vec<Tree>,
}

impl GradientBoostingModel {
    /// Ensemble prediction for one feature row: the base score plus the
    /// shrunken sum of every tree's leaf value.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let boost: f64 = self.trees.iter().map(|tree| tree.score(row)).sum();
        self.base_score + self.learning_rate * boost
    }

    /// Load-time check that the export matches `expected_columns` and
    /// every tree is structurally sound.
    pub fn validate(&self, expected_columns: &[&str]) -> Result<(), String> {
        if self.feature_names.len() != expected_columns.len()
            || !self
                .feature_names
                .iter()
                .zip(expected_columns)
                .all(|(got, want)| got == want)
        {
            return Err(format!(
                "model was fitted on columns {:?}, expected {:?}",
                self.feature_names, expected_columns
            ));
        }
        if self.trees.is_empty() {
            return Err("model has no trees".to_string());
        }
        if !self.base_score.is_finite() {
            return Err("base_score is not finite".to_string());
        }
        if !self.learning_rate.is_finite() || self.learning_rate <= 0.0 {
            return Err(format!(
                "learning_rate must be finite and positive, got {}",
                self.learning_rate
            ));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(expected_columns.len())
                .map_err(|detail| format!("tree {i}: {detail}"))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn split(feature: usize, threshold: f64, left: usize, right: usize) -> Node {
        Node::Split {
            feature,
            threshold,
            left,
            right,
        }
    }

    fn leaf(value: f64) -> Node {
        Node::Leaf { value }
    }

    fn model() -> GradientBoostingModel {
        GradientBoostingModel {
            feature_names: vec!["A".to_string(), "B".to_string()],
            base_score: 50.0,
            learning_rate: 0.1,
            trees: vec![
                Tree {
                    nodes: vec![split(1, 0.0, 1, 2), leaf(-10.0), leaf(10.0)],
                },
                Tree {
                    nodes: vec![leaf(4.0)],
                },
            ],
        }
    }

    #[test]
    fn test_prediction_sums_shrunken_leaves() {
        let m = model();
        // row B below threshold: 50 + 0.1 * (-10 + 4)
        assert_relative_eq!(m.predict(&[0.0, -1.0]), 49.4);
        // row B above threshold: 50 + 0.1 * (10 + 4)
        assert_relative_eq!(m.predict(&[0.0, 1.0]), 51.4);
    }

    #[test]
    fn test_threshold_boundary_goes_left() {
        let tree = Tree {
            nodes: vec![split(0, 5.0, 1, 2), leaf(-1.0), leaf(1.0)],
        };
        assert_relative_eq!(tree.score(&[5.0]), -1.0);
        assert_relative_eq!(tree.score(&[5.0 + 1e-9]), 1.0);
    }

    #[test]
    fn test_deep_walk_reaches_the_right_leaf() {
        let tree = Tree {
            nodes: vec![
                split(0, 0.0, 1, 2),
                split(1, 0.0, 3, 4),
                leaf(30.0),
                leaf(10.0),
                leaf(20.0),
            ],
        };
        assert_relative_eq!(tree.score(&[-1.0, -1.0]), 10.0);
        assert_relative_eq!(tree.score(&[-1.0, 1.0]), 20.0);
        assert_relative_eq!(tree.score(&[1.0, 0.0]), 30.0);
    }

    #[test]
    fn test_nodes_deserialize_untagged() {
        let tree: Tree = serde_json::from_str(
            r#"{
                "nodes": [
                    {"feature": 0, "threshold": 1.5, "left": 1, "right": 2},
                    {"value": -2.0},
                    {"value": 3.0}
                ]
            }"#,
        )
        .unwrap();
        assert_relative_eq!(tree.score(&[1.5]), -2.0);
        assert_relative_eq!(tree.score(&[2.0]), 3.0);
    }

    #[test]
    fn test_validate_accepts_the_fixture() {
        assert!(model().validate(&["A", "B"]).is_ok());
    }

    #[test]
    fn test_validate_rejects_wrong_columns() {
        let err = model().validate(&["A", "C"]).unwrap_err();
        assert!(err.contains("fitted on columns"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_backward_links() {
        let tree = Tree {
            nodes: vec![split(0, 0.0, 0, 1), leaf(1.0)],
        };
        let err = tree.validate(2).unwrap_err();
        assert!(err.contains("backwards"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_out_of_range_children() {
        let tree = Tree {
            nodes: vec![split(0, 0.0, 1, 9), leaf(1.0)],
        };
        let err = tree.validate(2).unwrap_err();
        assert!(err.contains("past the end"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_foreign_features() {
        let tree = Tree {
            nodes: vec![split(7, 0.0, 1, 2), leaf(1.0), leaf(2.0)],
        };
        let err = tree.validate(2).unwrap_err();
        assert!(err.contains("feature 7"), "got: {err}");
    }

    #[test]
    fn test_validate_rejects_empty_trees() {
        let mut m = model();
        m.trees.push(Tree { nodes: vec![] });
        assert!(m.validate(&["A", "B"]).is_err());
    }
}
