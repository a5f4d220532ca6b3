use serde::{Deserialize, Serialize};

/// Node of a regression tree stored as a flat array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node: rows with `x[feature] <= threshold` go to `left`.
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    /// Terminal node carrying the predicted value.
    Leaf { value: f64 },
}

/// Regression tree; node 0 is the root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<TreeNode>,
}

impl Tree {
    /// Checks that the tree is non-empty, that feature indices are below
    /// `feature_count`, and that every child index points forward and in range.
    /// Forward-only children guarantee that evaluation terminates.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".into());
        }

        for (index, node) in self.nodes.iter().enumerate() {
            if let TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } = node
            {
                if *feature >= feature_count {
                    return Err(format!(
                        "node {index} splits on feature {feature} but only {feature_count} features are declared"
                    ));
                }
                if threshold.is_nan() {
                    return Err(format!("node {index} has a NaN threshold"));
                }
                for child in [*left, *right] {
                    if child <= index || child >= self.nodes.len() {
                        return Err(format!("node {index} has invalid child index {child}"));
                    }
                }
            }
        }

        Ok(())
    }

    /// Walks the tree for one feature vector. The tree must have been validated.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                TreeNode::Leaf { value } => return *value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if features[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }
}
