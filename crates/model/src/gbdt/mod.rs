//! Gradient-boosted regression trees
//!
//! Squared-error boosting in the usual second-order form: per round the
//! gradients/hessians are recomputed, a CART tree is fitted on a seeded row
//! subsample, and predictions advance by the learning-rate-scaled tree
//! output. Training is fully deterministic for a fixed seed.

pub mod cart;
pub mod tree;

pub use cart::{CartBuilder, TreeParams};
pub use tree::{Node, Tree};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

/// Boosting hyperparameters
///
/// Tuning choices, not contracts; the defaults must stay reproducible under
/// the fixed seed.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GbdtParams {
    pub n_trees: usize,
    pub max_depth: usize,
    pub learning_rate: f64,
    /// Row subsampling fraction per boosting round
    pub subsample: f64,
    pub min_child_weight: f64,
    pub gamma: f64,
    /// L1 regularization
    pub alpha: f64,
    /// L2 regularization
    pub lambda: f64,
    pub seed: u64,
}

impl Default for GbdtParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: 8,
            learning_rate: 0.05,
            subsample: 0.8,
            min_child_weight: 3.0,
            gamma: 0.1,
            alpha: 0.1,
            lambda: 1.0,
            seed: 42,
        }
    }
}

/// A fitted boosted ensemble
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Booster {
    /// Base prediction (mean of the training targets)
    pub bias: f64,

    /// Trees with learning-rate-scaled leaf values
    pub trees: Vec<Tree>,

    /// Number of features the ensemble was fitted on
    pub n_features: usize,
}

impl Booster {
    /// Fit an ensemble on the given rows
    pub fn fit(
        features: &[Vec<f64>],
        targets: &[f64],
        params: &GbdtParams,
    ) -> Result<Self, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if features.len() != targets.len() {
            return Err(ModelError::ShapeMismatch {
                rows: features.len(),
                targets: targets.len(),
            });
        }

        let n_samples = features.len();
        let n_features = features[0].len();

        let bias = targets.iter().sum::<f64>() / n_samples as f64;
        let mut predictions = vec![bias; n_samples];

        let mut rng = StdRng::seed_from_u64(params.seed);
        let tree_params = TreeParams {
            max_depth: params.max_depth,
            min_child_weight: params.min_child_weight,
            gamma: params.gamma,
            alpha: params.alpha,
            lambda: params.lambda,
        };

        let mut trees = Vec::with_capacity(params.n_trees);
        let mut gradients = vec![0.0; n_samples];
        let hessians = vec![1.0; n_samples];

        for round in 0..params.n_trees {
            for i in 0..n_samples {
                gradients[i] = predictions[i] - targets[i];
            }

            let indices: Vec<usize> = if params.subsample < 1.0 {
                (0..n_samples)
                    .filter(|_| rng.gen::<f64>() < params.subsample)
                    .collect()
            } else {
                (0..n_samples).collect()
            };

            if indices.len() < 2 {
                tracing::debug!("round {}: subsample too small, skipping", round);
                continue;
            }

            let builder = CartBuilder::new(features, &gradients, &hessians, tree_params.clone());
            let mut tree = builder.build(&indices);

            for node in &mut tree.nodes {
                if let Some(leaf) = node.leaf.as_mut() {
                    *leaf *= params.learning_rate;
                }
            }

            for (i, row) in features.iter().enumerate() {
                predictions[i] += tree.evaluate(row);
            }

            trees.push(tree);
        }

        Ok(Self {
            bias,
            trees,
            n_features,
        })
    }

    /// Predict a single row
    pub fn predict(&self, features: &[f64]) -> f64 {
        let mut sum = self.bias;
        for tree in &self.trees {
            sum += tree.evaluate(features);
        }
        sum
    }

    /// Validate every tree in the ensemble
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, tree) in self.trees.iter().enumerate() {
            tree.validate()
                .map_err(|e| ModelError::Invalid(format!("tree {i}: {e}")))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_dataset(n: usize) -> (Vec<Vec<f64>>, Vec<f64>) {
        let mut features = Vec::with_capacity(n);
        let mut targets = Vec::with_capacity(n);
        for i in 0..n {
            let x = i as f64;
            features.push(vec![x, (n - i) as f64]);
            targets.push(3.0 * x + 10.0);
        }
        (features, targets)
    }

    #[test]
    fn test_fit_reduces_error() {
        let (features, targets) = linear_dataset(64);
        let params = GbdtParams {
            n_trees: 50,
            max_depth: 4,
            learning_rate: 0.2,
            subsample: 1.0,
            min_child_weight: 1.0,
            gamma: 0.0,
            ..GbdtParams::default()
        };

        let booster = Booster::fit(&features, &targets, &params).unwrap();

        let bias = targets.iter().sum::<f64>() / targets.len() as f64;
        let mut base_sse = 0.0;
        let mut fit_sse = 0.0;
        for (row, &y) in features.iter().zip(&targets) {
            base_sse += (y - bias).powi(2);
            fit_sse += (y - booster.predict(row)).powi(2);
        }

        assert!(fit_sse < base_sse * 0.05, "fit_sse={fit_sse} base_sse={base_sse}");
    }

    #[test]
    fn test_empty_dataset_rejected() {
        let err = Booster::fit(&[], &[], &GbdtParams::default()).unwrap_err();
        assert!(matches!(err, ModelError::EmptyDataset));
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let err = Booster::fit(&[vec![1.0]], &[1.0, 2.0], &GbdtParams::default()).unwrap_err();
        assert!(matches!(err, ModelError::ShapeMismatch { .. }));
    }

    #[test]
    fn test_fit_deterministic() {
        let (features, targets) = linear_dataset(32);
        let params = GbdtParams {
            n_trees: 10,
            max_depth: 3,
            min_child_weight: 1.0,
            ..GbdtParams::default()
        };

        let a = Booster::fit(&features, &targets, &params).unwrap();
        let b = Booster::fit(&features, &targets, &params).unwrap();
        assert_eq!(a, b);
    }
}
