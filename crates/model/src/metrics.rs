//! Regression evaluation metrics
//!
//! Computed once per training run on the held-out split and stored in the
//! artifact; never recomputed elsewhere.

use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct EvalMetrics {
    pub rmse: f64,
    pub mae: f64,
    pub r2_score: f64,
    pub mse: f64,
}

impl EvalMetrics {
    /// Compute metrics from predictions against true targets
    pub fn compute(targets: &[f64], predictions: &[f64]) -> Self {
        let n = targets.len().max(1) as f64;

        let mut sse = 0.0;
        let mut sae = 0.0;
        for (&y, &p) in targets.iter().zip(predictions) {
            let err = y - p;
            sse += err * err;
            sae += err.abs();
        }

        let mse = sse / n;
        let mae = sae / n;

        let mean = targets.iter().sum::<f64>() / n;
        let sst: f64 = targets.iter().map(|&y| (y - mean) * (y - mean)).sum();
        let r2_score = if sst > 0.0 { 1.0 - sse / sst } else { 0.0 };

        Self {
            rmse: mse.sqrt(),
            mae,
            r2_score,
            mse,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_perfect_fit() {
        let targets = vec![1.0, 2.0, 3.0];
        let metrics = EvalMetrics::compute(&targets, &targets);
        assert_eq!(metrics.mse, 0.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.r2_score, 1.0);
    }

    #[test]
    fn test_known_values() {
        let targets = vec![0.0, 2.0];
        let predictions = vec![1.0, 1.0];

        let metrics = EvalMetrics::compute(&targets, &predictions);
        assert!((metrics.mse - 1.0).abs() < 1e-12);
        assert!((metrics.rmse - 1.0).abs() < 1e-12);
        assert!((metrics.mae - 1.0).abs() < 1e-12);
        // sst = 2, sse = 2
        assert!(metrics.r2_score.abs() < 1e-12);
    }
}
