//! Decision tree structure and traversal.
//!
//! The tree is a strict binary tree: every split owns both children and
//! every path ends in a leaf carrying a binary label. Serialization is a
//! tagged record so the artifact names each node kind explicitly.

use serde::{Deserialize, Serialize};

/// One node of the approval tree.
///
/// On the wire a split looks like
/// `{"kind":"split","feature_index":0,"threshold":550.0,"left":...,"right":...}`
/// and a leaf like `{"kind":"leaf","label":1}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TreeNode {
    /// Internal node: rows with `value <= threshold` descend left, the rest right.
    Split {
        feature_index: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
    /// Terminal node holding the predicted label (0 or 1).
    Leaf { label: u8 },
}

impl TreeNode {
    /// Walk the tree and return the label for `features`.
    ///
    /// Callers must pass a vector covering every feature index in the tree;
    /// the store validates that bound on load and the metadata builds the
    /// vector at the right width, so a loaded model never walks out of range.
    pub fn predict(&self, features: &[f64]) -> u8 {
        let mut node = self;
        loop {
            match node {
                TreeNode::Leaf { label } => return *label,
                TreeNode::Split {
                    feature_index,
                    threshold,
                    left,
                    right,
                } => {
                    node = if features[*feature_index] <= *threshold {
                        left
                    } else {
                        right
                    };
                }
            }
        }
    }

    /// Check structural invariants: feature indices below `feature_count`,
    /// finite thresholds, binary leaf labels.
    pub fn validate(&self, feature_count: usize) -> Result<(), String> {
        match self {
            TreeNode::Leaf { label } => {
                if *label > 1 {
                    return Err(format!("leaf label {label} is not binary"));
                }
                Ok(())
            }
            TreeNode::Split {
                feature_index,
                threshold,
                left,
                right,
            } => {
                if *feature_index >= feature_count {
                    return Err(format!(
                        "split feature index {feature_index} out of range for {feature_count} features"
                    ));
                }
                if !threshold.is_finite() {
                    return Err(format!("split threshold {threshold} is not finite"));
                }
                left.validate(feature_count)?;
                right.validate(feature_count)
            }
        }
    }

    /// Number of leaves.
    pub fn leaf_count(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 1,
            TreeNode::Split { left, right, .. } => left.leaf_count() + right.leaf_count(),
        }
    }

    /// Depth of the deepest leaf; a lone leaf has depth 0.
    pub fn depth(&self) -> usize {
        match self {
            TreeNode::Leaf { .. } => 0,
            TreeNode::Split { left, right, .. } => 1 + left.depth().max(right.depth()),
        }
    }
}
