//! CART induction for the approval classifier.
//!
//! Exact greedy splitting on Gini impurity. Candidates are scanned in
//! ascending (feature index, threshold) order and the incumbent best is
//! only replaced by a strictly greater impurity reduction, so equal-gain
//! ties resolve to the lower feature index, then the lower threshold.
//! Training the same rows therefore always yields the same tree.

use lendtree_model::TreeNode;
use tracing::debug;

use crate::dataset::Dataset;
use crate::errors::TrainerError;

/// Induction parameters.
#[derive(Debug, Clone)]
pub struct TreeConfig {
    /// Maximum tree depth, with the root at depth 0.
    pub max_depth: usize,
    /// Smallest subset the builder will try to split further.
    pub min_split: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_split: 2,
        }
    }
}

/// Best split found for one node subset.
struct SplitCandidate {
    feature_index: usize,
    threshold: f64,
    reduction: f64,
}

/// Builds one classification tree over a dataset.
pub struct TreeBuilder<'a> {
    config: TreeConfig,
    dataset: &'a Dataset,
    feature_count: usize,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(dataset: &'a Dataset, config: TreeConfig) -> Self {
        let feature_count = dataset.features.first().map_or(0, Vec::len);
        Self {
            config,
            dataset,
            feature_count,
        }
    }

    /// Induce the tree. Fails only when fewer than two samples are available.
    pub fn build(&self) -> Result<TreeNode, TrainerError> {
        if self.dataset.len() < 2 {
            return Err(TrainerError::NotEnoughRows {
                valid: self.dataset.len(),
                skipped: self.dataset.rows_skipped,
            });
        }
        let indices: Vec<usize> = (0..self.dataset.len()).collect();
        Ok(self.build_node(&indices, 0))
    }

    fn build_node(&self, indices: &[usize], depth: usize) -> TreeNode {
        if depth >= self.config.max_depth
            || indices.len() < self.config.min_split
            || self.is_pure(indices)
        {
            return self.leaf(indices);
        }

        let split = match self.find_best_split(indices) {
            Some(split) => split,
            None => return self.leaf(indices),
        };

        let (left_indices, right_indices) =
            self.partition(indices, split.feature_index, split.threshold);
        debug!(
            depth,
            feature_index = split.feature_index,
            threshold = split.threshold,
            left = left_indices.len(),
            right = right_indices.len(),
            "split chosen"
        );

        TreeNode::Split {
            feature_index: split.feature_index,
            threshold: split.threshold,
            left: Box::new(self.build_node(&left_indices, depth + 1)),
            right: Box::new(self.build_node(&right_indices, depth + 1)),
        }
    }

    /// Scan every (feature, observed value) candidate and keep the one with
    /// the greatest positive impurity reduction. Candidates that leave one
    /// side empty reduce nothing and drop out on their own.
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let parent_gini = self.gini(indices);
        let total = indices.len() as f64;
        let mut best: Option<SplitCandidate> = None;

        for feature_index in 0..self.feature_count {
            for threshold in self.distinct_values(indices, feature_index) {
                let (left, right) = self.partition(indices, feature_index, threshold);
                if left.is_empty() || right.is_empty() {
                    continue;
                }

                let weighted = (left.len() as f64 / total) * self.gini(&left)
                    + (right.len() as f64 / total) * self.gini(&right);
                let reduction = parent_gini - weighted;
                if reduction <= 0.0 {
                    continue;
                }

                let improves = match &best {
                    Some(current) => reduction > current.reduction,
                    None => true,
                };
                if improves {
                    best = Some(SplitCandidate {
                        feature_index,
                        threshold,
                        reduction,
                    });
                }
            }
        }

        best
    }

    /// Distinct observed values of one feature in the subset, ascending.
    fn distinct_values(&self, indices: &[usize], feature_index: usize) -> Vec<f64> {
        let mut values: Vec<f64> = indices
            .iter()
            .map(|&idx| self.dataset.features[idx][feature_index])
            .collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        values
    }

    fn partition(
        &self,
        indices: &[usize],
        feature_index: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();
        for &idx in indices {
            if self.dataset.features[idx][feature_index] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }
        (left, right)
    }

    /// Gini impurity of the subset: `1 - p0^2 - p1^2`.
    fn gini(&self, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let total = indices.len() as f64;
        let p1 = self.count_approved(indices) as f64 / total;
        let p0 = 1.0 - p1;
        1.0 - p0 * p0 - p1 * p1
    }

    fn is_pure(&self, indices: &[usize]) -> bool {
        let approved = self.count_approved(indices);
        approved == 0 || approved == indices.len()
    }

    /// Majority leaf; an exact tie goes to approved.
    fn leaf(&self, indices: &[usize]) -> TreeNode {
        let approved = self.count_approved(indices);
        let rejected = indices.len() - approved;
        let label = if approved >= rejected { 1 } else { 0 };
        TreeNode::Leaf { label }
    }

    fn count_approved(&self, indices: &[usize]) -> usize {
        indices
            .iter()
            .filter(|&&idx| self.dataset.labels[idx] == 1)
            .count()
    }
}
