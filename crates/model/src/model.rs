//! House-price model: training, prediction, persistence, introspection

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::Serialize;
use std::path::{Path, PathBuf};

use crate::artifact::ModelArtifact;
use crate::error::ModelError;
use crate::features::PredictInput;
use crate::gbdt::{Booster, GbdtParams};
use crate::metrics::EvalMetrics;

/// Seed for the train/test shuffle; fixed for reproducibility
const SPLIT_SEED: u64 = 42;

/// Fraction of rows held out for evaluation
const TEST_FRACTION: f64 = 0.2;

/// Metadata view exposed by `/model/info`
#[derive(Clone, Debug, Serialize)]
pub struct ModelInfo {
    pub version: String,
    pub trained_at: String,
    pub metrics: EvalMetrics,
    pub feature_count: usize,
    pub features: Vec<String>,
    pub training_samples: usize,
    pub model_path: String,
}

/// A gradient-boosted house-price regressor bound to an artifact path
#[derive(Clone, Debug)]
pub struct PriceModel {
    model_path: PathBuf,
    params: GbdtParams,
    artifact: Option<ModelArtifact>,
}

impl PriceModel {
    pub fn new<P: AsRef<Path>>(model_path: P) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            params: GbdtParams::default(),
            artifact: None,
        }
    }

    pub fn with_params<P: AsRef<Path>>(model_path: P, params: GbdtParams) -> Self {
        Self {
            model_path: model_path.as_ref().to_path_buf(),
            params,
            artifact: None,
        }
    }

    pub fn model_path(&self) -> &Path {
        &self.model_path
    }

    pub fn is_loaded(&self) -> bool {
        self.artifact.is_some()
    }

    pub fn feature_names(&self) -> Option<&[String]> {
        self.artifact
            .as_ref()
            .map(|artifact| artifact.feature_names.as_slice())
    }

    /// Train on the given rows, evaluate on a held-out 20% split, persist the
    /// artifact, and return the holdout metrics.
    pub fn train(
        &mut self,
        features: Vec<Vec<f64>>,
        targets: Vec<f64>,
        feature_names: Vec<String>,
    ) -> Result<EvalMetrics, ModelError> {
        if features.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        if features.len() != targets.len() {
            return Err(ModelError::ShapeMismatch {
                rows: features.len(),
                targets: targets.len(),
            });
        }
        if features[0].len() != feature_names.len() {
            return Err(ModelError::Invalid(format!(
                "rows carry {} columns but {} feature names were given",
                features[0].len(),
                feature_names.len()
            )));
        }

        let n = features.len();
        let mut indices: Vec<usize> = (0..n).collect();
        let mut rng = StdRng::seed_from_u64(SPLIT_SEED);
        indices.shuffle(&mut rng);

        let n_test = ((n as f64) * TEST_FRACTION).round() as usize;
        let n_test = n_test.min(n.saturating_sub(1));
        let (test_idx, train_idx) = indices.split_at(n_test);

        let train_features: Vec<Vec<f64>> =
            train_idx.iter().map(|&i| features[i].clone()).collect();
        let train_targets: Vec<f64> = train_idx.iter().map(|&i| targets[i]).collect();

        tracing::info!(
            "training on {} samples ({} held out), {} features",
            train_features.len(),
            n_test,
            feature_names.len()
        );

        let booster = Booster::fit(&train_features, &train_targets, &self.params)?;

        let test_targets: Vec<f64> = test_idx.iter().map(|&i| targets[i]).collect();
        let test_predictions: Vec<f64> = test_idx
            .iter()
            .map(|&i| booster.predict(&features[i]))
            .collect();
        let metrics = EvalMetrics::compute(&test_targets, &test_predictions);

        tracing::info!(
            rmse = metrics.rmse,
            mae = metrics.mae,
            r2 = metrics.r2_score,
            "training complete"
        );

        let now = chrono::Utc::now();
        let artifact = ModelArtifact {
            booster,
            feature_names,
            metrics: metrics.clone(),
            version: now.format("%Y%m%d_%H%M%S").to_string(),
            trained_at: now.to_rfc3339(),
            training_samples: train_features.len(),
        };

        artifact.save(&self.model_path)?;
        self.artifact = Some(artifact);

        Ok(metrics)
    }

    /// Predict a single price in the model's native training units
    pub fn predict(&self, input: &PredictInput) -> Result<f64, ModelError> {
        let artifact = self.artifact.as_ref().ok_or(ModelError::Unavailable)?;

        let vector = match input {
            PredictInput::Named(house) => house.map_to_schema(&artifact.feature_names),
            PredictInput::Vector(values) => {
                if values.len() != artifact.booster.n_features {
                    return Err(ModelError::VectorWidth {
                        got: values.len(),
                        expected: artifact.booster.n_features,
                    });
                }
                values.clone()
            }
        };

        Ok(artifact.booster.predict(&vector))
    }

    /// Predict a batch sequentially
    pub fn predict_batch(&self, inputs: &[PredictInput]) -> Result<Vec<f64>, ModelError> {
        inputs.iter().map(|input| self.predict(input)).collect()
    }

    /// Persist the current artifact
    pub fn save(&self) -> Result<(), ModelError> {
        let artifact = self.artifact.as_ref().ok_or(ModelError::Unavailable)?;
        artifact.save(&self.model_path)
    }

    /// Load the artifact from the configured path
    pub fn load(&mut self) -> Result<(), ModelError> {
        let artifact = ModelArtifact::load(&self.model_path)?;
        self.artifact = Some(artifact);
        Ok(())
    }

    /// Load the artifact if none is held yet
    pub fn ensure_loaded(&mut self) -> Result<(), ModelError> {
        if self.artifact.is_none() {
            self.load()?;
        }
        Ok(())
    }

    /// Full metadata for the loaded artifact
    pub fn info(&self) -> Option<ModelInfo> {
        self.artifact.as_ref().map(|artifact| ModelInfo {
            version: artifact.version.clone(),
            trained_at: artifact.trained_at.clone(),
            metrics: artifact.metrics.clone(),
            feature_count: artifact.feature_names.len(),
            features: artifact.feature_names.clone(),
            training_samples: artifact.training_samples,
            model_path: self.model_path.display().to_string(),
        })
    }
}
