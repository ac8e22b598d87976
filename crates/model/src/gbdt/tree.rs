//! Decision tree structures for GBDT inference
//!
//! Trees are stored as flat node vectors with index-based children; node 0 is
//! the root. Traversal goes left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// For internal nodes `feature_idx >= 0` and `left`/`right` point to child
/// node indices. For leaf nodes `feature_idx == -1` and `leaf` holds the
/// prediction value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Node {
    /// Left child index (-1 for leaf nodes)
    pub left: i32,

    /// Right child index (-1 for leaf nodes)
    pub right: i32,

    /// Feature index to split on (-1 for leaf nodes)
    pub feature_idx: i32,

    /// Threshold value for the split
    pub threshold: f64,

    /// Leaf value (Some for leaf nodes, None for internal nodes)
    pub leaf: Option<f64>,
}

impl Node {
    /// Create a new internal (split) node
    pub fn internal(feature_idx: i32, threshold: f64, left: i32, right: i32) -> Self {
        Self {
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    /// Create a new leaf node
    pub fn leaf(value: f64) -> Self {
        Self {
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0.0,
            leaf: Some(value),
        }
    }

    /// Check if this node is a leaf
    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single regression tree
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Tree {
    /// Tree nodes (node 0 is the root)
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Evaluate this tree on a feature vector
    ///
    /// Out-of-range indices terminate traversal with 0.0 rather than panic.
    pub fn evaluate(&self, features: &[f64]) -> f64 {
        if self.nodes.is_empty() {
            return 0.0;
        }

        let mut idx = 0usize;

        loop {
            if idx >= self.nodes.len() {
                return 0.0;
            }

            let node = &self.nodes[idx];

            if node.is_leaf() {
                return node.leaf.unwrap_or(0.0);
            }

            let feature_idx = node.feature_idx as usize;
            if feature_idx >= features.len() {
                return 0.0;
            }

            idx = if features[feature_idx] <= node.threshold {
                if node.left < 0 || node.left as usize >= self.nodes.len() {
                    return 0.0;
                }
                node.left as usize
            } else {
                if node.right < 0 || node.right as usize >= self.nodes.len() {
                    return 0.0;
                }
                node.right as usize
            };
        }
    }

    /// Validate tree structure
    pub fn validate(&self) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        for (i, node) in self.nodes.iter().enumerate() {
            if !node.is_leaf() {
                if node.left < 0 || node.left as usize >= self.nodes.len() {
                    return Err(format!("Node {} has invalid left child: {}", i, node.left));
                }
                if node.right < 0 || node.right as usize >= self.nodes.len() {
                    return Err(format!(
                        "Node {} has invalid right child: {}",
                        i, node.right
                    ));
                }
                if node.feature_idx < 0 {
                    return Err(format!(
                        "Internal node {} has invalid feature index: {}",
                        i, node.feature_idx
                    ));
                }
            } else if node.leaf.is_none() {
                return Err(format!("Leaf node {i} has no leaf value"));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_creation() {
        let internal = Node::internal(3, 12.5, 1, 2);
        assert_eq!(internal.feature_idx, 3);
        assert_eq!(internal.threshold, 12.5);
        assert!(!internal.is_leaf());

        let leaf = Node::leaf(-2.5);
        assert_eq!(leaf.feature_idx, -1);
        assert!(leaf.is_leaf());
        assert_eq!(leaf.leaf, Some(-2.5));
    }

    #[test]
    fn test_tree_evaluation() {
        // if feature[0] <= 50 return 100, else return 200
        let tree = Tree::new(vec![
            Node::internal(0, 50.0, 1, 2),
            Node::leaf(100.0),
            Node::leaf(200.0),
        ]);

        assert_eq!(tree.evaluate(&[30.0]), 100.0);
        assert_eq!(tree.evaluate(&[50.0]), 100.0); // equal goes left
        assert_eq!(tree.evaluate(&[60.0]), 200.0);
    }

    #[test]
    fn test_tree_validation() {
        let valid = Tree::new(vec![
            Node::internal(0, 50.0, 1, 2),
            Node::leaf(100.0),
            Node::leaf(200.0),
        ]);
        assert!(valid.validate().is_ok());

        let invalid = Tree::new(vec![
            Node::internal(0, 50.0, 5, 2), // left=5 is out of bounds
            Node::leaf(100.0),
            Node::leaf(200.0),
        ]);
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_short_feature_vector() {
        let tree = Tree::new(vec![
            Node::internal(4, 1.0, 1, 2),
            Node::leaf(1.0),
            Node::leaf(2.0),
        ]);

        // Feature index past the end of the vector terminates with 0.0
        assert_eq!(tree.evaluate(&[1.0, 2.0]), 0.0);
    }
}
