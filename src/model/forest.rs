//! Tree ensemble evaluation
//!
//! Each tree stores its nodes in a flat array with the root at index 0 and
//! children always after their parent. A split sends the sample left when
//! `x[feature] <= threshold`. Leaves hold the positive-class fraction of the
//! training samples that reached them.

use serde::{Deserialize, Serialize};

use crate::{HoopsError, Result};

/// A single tree node
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        /// Positive-class fraction at this node (needed for path attribution)
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<f64>,
    },
    Leaf {
        value: f64,
    },
}

impl Node {
    fn value(&self) -> Option<f64> {
        match self {
            Node::Split { value, .. } => *value,
            Node::Leaf { value } => Some(*value),
        }
    }
}

/// One decision tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    fn validate(&self, index: usize, n_features: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(invalid(format!("tree {} has no nodes", index)));
        }
        let len = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match node {
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    value,
                } => {
                    if *feature >= n_features {
                        return Err(invalid(format!(
                            "tree {} node {} splits on feature {} of {}",
                            index, i, feature, n_features
                        )));
                    }
                    if !threshold.is_finite() {
                        return Err(invalid(format!("tree {} node {} has a non-finite threshold", index, i)));
                    }
                    for child in [*left, *right] {
                        if child <= i || child >= len {
                            return Err(invalid(format!(
                                "tree {} node {} points to child {} (nodes: {})",
                                index, i, child, len
                            )));
                        }
                    }
                    if let Some(v) = value {
                        check_probability(*v, index, i)?;
                    }
                }
                Node::Leaf { value } => check_probability(*value, index, i)?,
            }
        }
        Ok(())
    }

    /// Follow the decision path and return the visited node indices
    fn path(&self, x: &[f64]) -> Vec<usize> {
        let mut path = vec![0];
        let mut idx = 0;
        while let Node::Split {
            feature,
            threshold,
            left,
            right,
            ..
        } = &self.nodes[idx]
        {
            idx = if x[*feature] <= *threshold { *left } else { *right };
            path.push(idx);
        }
        path
    }

    fn leaf_value(&self, x: &[f64]) -> f64 {
        let path = self.path(x);
        let last = path[path.len() - 1];
        self.nodes[last].value().unwrap_or(0.0)
    }
}

/// Per-feature attribution of one prediction
#[derive(Debug, Clone, PartialEq)]
pub struct PathContributions {
    /// Mean root probability over the trees
    pub bias: f64,
    /// Signed contribution per input feature
    pub contributions: Vec<f64>,
}

/// Bagged ensemble of probability trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    pub n_features: usize,
    pub trees: Vec<Tree>,
}

impl RandomForest {
    /// Structural checks run once when the bundle is loaded
    pub fn validate(&self) -> Result<()> {
        if self.trees.is_empty() {
            return Err(invalid("forest has no trees".to_string()));
        }
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.n_features)?;
        }
        Ok(())
    }

    /// Positive-class probability: mean of the per-tree leaf values
    pub fn predict_proba(&self, x: &[f64]) -> Result<f64> {
        self.check_input(x)?;
        let sum: f64 = self.trees.iter().map(|t| t.leaf_value(x)).sum();
        Ok((sum / self.trees.len() as f64).clamp(0.0, 1.0))
    }

    /// Every split node carries its own probability
    pub fn supports_path_attribution(&self) -> bool {
        self.trees.iter().all(|t| {
            t.nodes
                .iter()
                .all(|n| !matches!(n, Node::Split { value: None, .. }))
        })
    }

    /// Charge each step of the decision path to the feature that was split on
    pub fn path_contributions(&self, x: &[f64]) -> Result<PathContributions> {
        self.check_input(x)?;
        let mut bias = 0.0;
        let mut contributions = vec![0.0; self.n_features];

        for (t, tree) in self.trees.iter().enumerate() {
            let path = tree.path(x);
            let value_at = |idx: usize| {
                tree.nodes[idx].value().ok_or_else(|| {
                    HoopsError::ExplanationUnavailable(format!(
                        "tree {} node {} has no stored probability",
                        t, idx
                    ))
                })
            };

            bias += value_at(0)?;
            for step in path.windows(2) {
                let (parent, child) = (step[0], step[1]);
                if let Node::Split { feature, .. } = &tree.nodes[parent] {
                    contributions[*feature] += value_at(child)? - value_at(parent)?;
                }
            }
        }

        let n = self.trees.len() as f64;
        Ok(PathContributions {
            bias: bias / n,
            contributions: contributions.into_iter().map(|c| c / n).collect(),
        })
    }

    fn check_input(&self, x: &[f64]) -> Result<()> {
        if x.len() != self.n_features {
            return Err(HoopsError::FeatureShape(format!(
                "model expects {} features, got {}",
                self.n_features,
                x.len()
            )));
        }
        if x.iter().any(|v| !v.is_finite()) {
            return Err(HoopsError::FeatureShape("non-finite feature value".to_string()));
        }
        Ok(())
    }
}

fn check_probability(value: f64, tree: usize, node: usize) -> Result<()> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(invalid(format!(
            "tree {} node {} has probability {} outside [0, 1]",
            tree, node, value
        )))
    }
}

fn invalid(message: String) -> HoopsError {
    HoopsError::ModelUnavailable(message)
}
