use serde::Deserialize;

use super::{check_width, tree_shap, Classifier, ModelError, Prediction};
use crate::models::FEATURE_COUNT;

/// One node of a regression tree. Splits send `x[feature] < threshold` left.
/// `cover` is the training weight that reached the node.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
        cover: f64,
    },
    Leaf {
        leaf: f64,
        cover: f64,
    },
}

impl Node {
    pub fn cover(&self) -> f64 {
        match self {
            Node::Split { cover, .. } | Node::Leaf { cover, .. } => *cover,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub(crate) fn node(&self, tree: usize, index: usize) -> Result<&Node, ModelError> {
        self.nodes.get(index).ok_or_else(|| ModelError::MalformedTree {
            tree,
            reason: format!("node {index} out of range"),
        })
    }

    fn leaf_value(&self, tree: usize, x: &[f64]) -> Result<f64, ModelError> {
        let mut index = 0;
        loop {
            match self.node(tree, index)? {
                Node::Leaf { leaf, .. } => return Ok(*leaf),
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                    ..
                } => {
                    let value = x.get(*feature).copied().ok_or(ModelError::Dimension {
                        expected: feature + 1,
                        actual: x.len(),
                    })?;
                    index = if value < *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Cover-weighted mean leaf value.
    fn expected_value(&self, tree: usize, index: usize) -> Result<f64, ModelError> {
        match self.node(tree, index)? {
            Node::Leaf { leaf, .. } => Ok(*leaf),
            Node::Split {
                left, right, cover, ..
            } => {
                let l = self.node(tree, *left)?.cover();
                let r = self.node(tree, *right)?.cover();
                Ok((l * self.expected_value(tree, *left)? + r * self.expected_value(tree, *right)?)
                    / cover)
            }
        }
    }

    /// Structural checks: children come after their parent (so traversal
    /// terminates), split features fit the input width, split covers are
    /// positive.
    fn validate(&self, tree: usize, width: usize) -> Result<(), ModelError> {
        let malformed = |reason: String| ModelError::MalformedTree { tree, reason };

        if self.nodes.is_empty() {
            return Err(malformed("no nodes".into()));
        }
        for (i, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                cover,
                threshold,
            } = node
            {
                if *feature >= width {
                    return Err(malformed(format!("node {i} splits on feature {feature}")));
                }
                for child in [left, right] {
                    if *child <= i || *child >= self.nodes.len() {
                        return Err(malformed(format!("node {i} has invalid child {child}")));
                    }
                }
                if !cover.is_finite() || *cover <= 0.0 || !threshold.is_finite() {
                    return Err(malformed(format!("node {i} has invalid cover or threshold")));
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// BoostedTrees: logistic gradient-boosted ensemble
// ---------------------------------------------------------------------------

fn default_num_features() -> usize {
    FEATURE_COUNT
}

#[derive(Debug, Clone, Deserialize)]
pub struct BoostedTrees {
    /// Initial margin (log-odds) before any tree.
    #[serde(default)]
    pub base_score: f64,
    #[serde(default = "default_num_features")]
    pub num_features: usize,
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    pub trees: Vec<Tree>,
}

impl BoostedTrees {
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate(i, self.num_features)?;
        }
        Ok(())
    }

    /// Raw log-odds output for class 1.
    pub fn margin(&self, features: &[f64]) -> Result<f64, ModelError> {
        check_width(features, self.num_features)?;
        self.trees
            .iter()
            .enumerate()
            .try_fold(self.base_score, |acc, (i, tree)| {
                Ok(acc + tree.leaf_value(i, features)?)
            })
    }

    /// Margin of the average instance, the baseline attributions are
    /// measured from.
    pub fn expected_margin(&self) -> Result<f64, ModelError> {
        self.trees
            .iter()
            .enumerate()
            .try_fold(self.base_score, |acc, (i, tree)| {
                Ok(acc + tree.expected_value(i, 0)?)
            })
    }
}

fn sigmoid(x: f64) -> f64 {
    1.0 / (1.0 + (-x).exp())
}

impl Classifier for BoostedTrees {
    fn predict(&self, features: &[f64]) -> Result<Prediction, ModelError> {
        let p1 = sigmoid(self.margin(features)?);
        Prediction {
            class: u8::from(p1 > 0.5),
            probabilities: [1.0 - p1, p1],
        }
        .validate()
    }

    /// Exact TreeSHAP values on the margin, summed over all trees.
    fn attribute(&self, features: &[f64]) -> Result<Vec<f64>, ModelError> {
        check_width(features, self.num_features)?;
        let mut phi = vec![0.0; self.num_features];
        for (i, tree) in self.trees.iter().enumerate() {
            tree_shap::accumulate(tree, i, features, &mut phi)?;
        }
        if let Some(i) = phi.iter().position(|v| !v.is_finite()) {
            return Err(ModelError::NonFinite(i));
        }
        Ok(phi)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
