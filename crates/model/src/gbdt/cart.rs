//! CART regression tree builder
//!
//! Exact-greedy split search over sorted feature values with running
//! gradient/hessian sums, deterministic tie-breaking, and L1/L2-regularized
//! leaf values.

use super::tree::{Node, Tree};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeParams {
    pub max_depth: usize,
    /// Minimum sum of hessians per child (sample count for squared error)
    pub min_child_weight: f64,
    /// Minimum gain required to split
    pub gamma: f64,
    /// L1 regularization on leaf values
    pub alpha: f64,
    /// L2 regularization on leaf values
    pub lambda: f64,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            max_depth: 6,
            min_child_weight: 1.0,
            gamma: 0.0,
            alpha: 0.0,
            lambda: 1.0,
        }
    }
}

/// Best split candidate for a node
#[derive(Debug, Clone, Copy)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: f64,
    gain: f64,
}

impl SplitCandidate {
    /// Deterministic preference: higher gain, then lower feature index, then
    /// lower threshold.
    fn better_than(&self, other: &SplitCandidate) -> bool {
        if self.gain != other.gain {
            return self.gain > other.gain;
        }
        if self.feature_idx != other.feature_idx {
            return self.feature_idx < other.feature_idx;
        }
        self.threshold < other.threshold
    }
}

/// Build a regression tree with the exact-greedy CART algorithm
pub struct CartBuilder<'a> {
    features: &'a [Vec<f64>],
    gradients: &'a [f64],
    hessians: &'a [f64],
    feature_count: usize,
    params: TreeParams,
}

impl<'a> CartBuilder<'a> {
    pub fn new(
        features: &'a [Vec<f64>],
        gradients: &'a [f64],
        hessians: &'a [f64],
        params: TreeParams,
    ) -> Self {
        assert_eq!(features.len(), gradients.len());
        assert_eq!(features.len(), hessians.len());

        let feature_count = features.first().map(|row| row.len()).unwrap_or(0);

        Self {
            features,
            gradients,
            hessians,
            feature_count,
            params,
        }
    }

    /// Build a tree over the given sample indices
    pub fn build(&self, indices: &[usize]) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, &mut nodes);
        Tree::new(nodes)
    }

    fn build_node(&self, indices: &[usize], depth: usize, nodes: &mut Vec<Node>) -> i32 {
        let current_idx = nodes.len() as i32;
        let leaf_value = self.leaf_value(indices);

        if depth >= self.params.max_depth || indices.len() < 2 {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        let split = match self.find_best_split(indices) {
            Some(split) => split,
            None => {
                nodes.push(Node::leaf(leaf_value));
                return current_idx;
            }
        };

        let (left_indices, right_indices) =
            self.partition(indices, split.feature_idx, split.threshold);

        if left_indices.is_empty() || right_indices.is_empty() {
            nodes.push(Node::leaf(leaf_value));
            return current_idx;
        }

        // Reserve the slot; children are patched in after recursion.
        nodes.push(Node::internal(split.feature_idx as i32, split.threshold, 0, 0));

        let left_idx = self.build_node(&left_indices, depth + 1, nodes);
        let right_idx = self.build_node(&right_indices, depth + 1, nodes);

        nodes[current_idx as usize].left = left_idx;
        nodes[current_idx as usize].right = right_idx;

        current_idx
    }

    /// Scan every feature with a sorted sweep and return the best split
    fn find_best_split(&self, indices: &[usize]) -> Option<SplitCandidate> {
        let (g_total, h_total) = self.sum_grad_hess(indices);
        let parent_score = score(g_total, h_total, self.params.lambda);

        let mut best: Option<SplitCandidate> = None;

        for feature_idx in 0..self.feature_count {
            let mut sorted: Vec<(f64, f64, f64)> = indices
                .iter()
                .map(|&i| {
                    (
                        self.features[i][feature_idx],
                        self.gradients[i],
                        self.hessians[i],
                    )
                })
                .collect();
            sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            let mut g_left = 0.0;
            let mut h_left = 0.0;

            for window in 0..sorted.len() - 1 {
                let (value, grad, hess) = sorted[window];
                g_left += grad;
                h_left += hess;

                let next_value = sorted[window + 1].0;
                if next_value <= value {
                    continue; // no boundary between equal values
                }

                let g_right = g_total - g_left;
                let h_right = h_total - h_left;

                if h_left < self.params.min_child_weight
                    || h_right < self.params.min_child_weight
                {
                    continue;
                }

                let gain = score(g_left, h_left, self.params.lambda)
                    + score(g_right, h_right, self.params.lambda)
                    - parent_score;

                if gain <= self.params.gamma {
                    continue;
                }

                let threshold = value + (next_value - value) / 2.0;
                let candidate = SplitCandidate {
                    feature_idx,
                    threshold,
                    gain,
                };

                best = match best {
                    None => Some(candidate),
                    Some(current) if candidate.better_than(&current) => Some(candidate),
                    other => other,
                };
            }
        }

        best
    }

    fn partition(
        &self,
        indices: &[usize],
        feature_idx: usize,
        threshold: f64,
    ) -> (Vec<usize>, Vec<usize>) {
        let mut left = Vec::new();
        let mut right = Vec::new();

        for &idx in indices {
            if self.features[idx][feature_idx] <= threshold {
                left.push(idx);
            } else {
                right.push(idx);
            }
        }

        (left, right)
    }

    fn sum_grad_hess(&self, indices: &[usize]) -> (f64, f64) {
        let mut g = 0.0;
        let mut h = 0.0;
        for &idx in indices {
            g += self.gradients[idx];
            h += self.hessians[idx];
        }
        (g, h)
    }

    /// Optimal leaf value: -soft_threshold(G, alpha) / (H + lambda)
    fn leaf_value(&self, indices: &[usize]) -> f64 {
        let (g, h) = self.sum_grad_hess(indices);
        let shrunk = soft_threshold(g, self.params.alpha);
        if h + self.params.lambda <= 0.0 {
            return 0.0;
        }
        -shrunk / (h + self.params.lambda)
    }
}

/// Structure score G^2 / (H + lambda)
fn score(g: f64, h: f64, lambda: f64) -> f64 {
    if h + lambda <= 0.0 {
        return 0.0;
    }
    (g * g) / (h + lambda)
}

/// L1 soft-thresholding of the gradient sum
fn soft_threshold(g: f64, alpha: f64) -> f64 {
    if g > alpha {
        g - alpha
    } else if g < -alpha {
        g + alpha
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_split() {
        let features = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        // Gradients pull the left half up and the right half down
        let gradients = vec![-5.0, -5.0, 5.0, 5.0];
        let hessians = vec![1.0, 1.0, 1.0, 1.0];

        let params = TreeParams {
            max_depth: 2,
            ..TreeParams::default()
        };
        let builder = CartBuilder::new(&features, &gradients, &hessians, params);
        let tree = builder.build(&[0, 1, 2, 3]);

        assert!(tree.validate().is_ok());
        // Left samples should get a positive value, right a negative one
        assert!(tree.evaluate(&[1.5]) > 0.0);
        assert!(tree.evaluate(&[10.5]) < 0.0);
    }

    #[test]
    fn test_leaf_only_tree() {
        let features = vec![vec![1.0]];
        let gradients = vec![-3.0];
        let hessians = vec![1.0];

        let builder = CartBuilder::new(&features, &gradients, &hessians, TreeParams::default());
        let tree = builder.build(&[0]);

        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf());
    }

    #[test]
    fn test_constant_feature_yields_leaf() {
        let features = vec![vec![7.0], vec![7.0], vec![7.0]];
        let gradients = vec![-1.0, 0.0, 1.0];
        let hessians = vec![1.0, 1.0, 1.0];

        let builder = CartBuilder::new(&features, &gradients, &hessians, TreeParams::default());
        let tree = builder.build(&[0, 1, 2]);

        // No boundary between equal values, so no split is possible
        assert_eq!(tree.nodes.len(), 1);
        assert!(tree.nodes[0].is_leaf());
    }

    #[test]
    fn test_determinism() {
        let features = vec![vec![1.0, 4.0], vec![2.0, 3.0], vec![3.0, 2.0], vec![4.0, 1.0]];
        let gradients = vec![-2.0, -1.0, 1.0, 2.0];
        let hessians = vec![1.0; 4];

        let params = TreeParams {
            max_depth: 3,
            ..TreeParams::default()
        };

        let builder = CartBuilder::new(&features, &gradients, &hessians, params.clone());
        let tree1 = builder.build(&[0, 1, 2, 3]);
        let builder2 = CartBuilder::new(&features, &gradients, &hessians, params);
        let tree2 = builder2.build(&[0, 1, 2, 3]);

        assert_eq!(tree1, tree2);
    }
}
