//! Persisted model artifact
//!
//! The artifact bundles the fitted ensemble with its feature schema and
//! training metadata. It is immutable once saved; a retrain writes a whole
//! new artifact over the old one.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::error::ModelError;
use crate::gbdt::Booster;
use crate::metrics::EvalMetrics;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub booster: Booster,

    /// The exact column order the ensemble consumes
    pub feature_names: Vec<String>,

    /// Holdout metrics from the training run
    pub metrics: EvalMetrics,

    /// Version stamp, `%Y%m%d_%H%M%S`
    pub version: String,

    /// RFC 3339 training timestamp
    pub trained_at: String,

    /// Number of rows in the training split
    pub training_samples: usize,
}

impl ModelArtifact {
    /// Serialize to a JSON file, creating parent directories
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ModelError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        tracing::info!("model saved to {}", path.display());
        Ok(())
    }

    /// Load and validate an artifact from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let json = fs::read_to_string(path)?;
        let artifact: ModelArtifact = serde_json::from_str(&json)?;

        if artifact.feature_names.len() != artifact.booster.n_features {
            return Err(ModelError::Invalid(format!(
                "feature schema has {} names but the booster expects {}",
                artifact.feature_names.len(),
                artifact.booster.n_features
            )));
        }
        artifact.booster.validate()?;

        tracing::info!("model loaded from {}", path.display());
        Ok(artifact)
    }
}
