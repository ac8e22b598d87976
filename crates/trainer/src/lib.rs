//! End-to-end training pipeline
//!
//! Generates or loads a dataset, preprocesses it according to its detected
//! flavor, fits the price model, and persists the artifact. Used both by the
//! `hestia-train` CLI and by the HTTP service's `/train` endpoint.

use serde::Serialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

use hestia_dataset::{
    generate_to_csv, preprocess, preprocess_generic, DatasetError, DatasetKind, GeneratorConfig,
    Table,
};
use hestia_model::{EvalMetrics, GbdtParams, ModelError, PriceModel};

#[derive(Debug, Error)]
pub enum TrainError {
    #[error("training data not found at {0}")]
    DataNotFound(PathBuf),

    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// Options for a single training run
#[derive(Clone, Debug)]
pub struct TrainOptions {
    pub data_path: PathBuf,
    pub model_path: PathBuf,
    /// Sample count when generating synthetic data
    pub n_samples: usize,
    /// Generate a synthetic dataset at `data_path` before training
    pub generate_sample: bool,
    pub params: GbdtParams,
}

impl TrainOptions {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(data_path: P, model_path: Q) -> Self {
        Self {
            data_path: data_path.as_ref().to_path_buf(),
            model_path: model_path.as_ref().to_path_buf(),
            n_samples: 1000,
            generate_sample: false,
            params: GbdtParams::default(),
        }
    }
}

/// Outcome of a training run
#[derive(Clone, Debug, Serialize)]
pub struct TrainReport {
    pub metrics: EvalMetrics,
    pub model_path: String,
    pub feature_names: Vec<String>,
    pub feature_count: usize,
    pub training_samples: usize,
}

/// Run the full pipeline: ensure data, preprocess, train, persist
pub fn run(options: &TrainOptions) -> Result<TrainReport, TrainError> {
    if options.generate_sample {
        tracing::info!(
            "generating {} synthetic samples at {}",
            options.n_samples,
            options.data_path.display()
        );
        generate_to_csv(
            &GeneratorConfig {
                n_samples: options.n_samples,
                ..GeneratorConfig::default()
            },
            &options.data_path,
        )?;
    }

    if !options.data_path.exists() {
        return Err(TrainError::DataNotFound(options.data_path.clone()));
    }

    let table = Table::read_csv(&options.data_path)?;
    tracing::info!(
        "loaded {} rows x {} columns from {}",
        table.n_rows(),
        table.n_cols(),
        options.data_path.display()
    );

    // Synthetic data is already canonical; everything else goes through a
    // preprocessor first.
    let training_table = if options.generate_sample {
        table
    } else {
        let kind = DatasetKind::detect(&options.data_path);
        tracing::info!("detected dataset kind: {:?}", kind);
        match preprocess(kind, &table) {
            Ok(processed) => {
                persist_processed(&options.data_path, &processed);
                processed
            }
            Err(err) if kind == DatasetKind::Generic => {
                // Soft fallback: train on the raw table rather than failing
                // the whole request.
                tracing::warn!("generic preprocessing failed ({err}), training on raw data");
                let mut raw = table;
                raw.impute_and_encode();
                raw
            }
            Err(err) => return Err(err.into()),
        }
    };

    let (features, targets, feature_names) = training_table.split_target()?;

    let mut model = PriceModel::with_params(&options.model_path, options.params.clone());
    let metrics = model.train(features, targets, feature_names.clone())?;

    let info = model.info().ok_or(ModelError::Unavailable)?;

    Ok(TrainReport {
        metrics,
        model_path: options.model_path.display().to_string(),
        feature_count: feature_names.len(),
        feature_names,
        training_samples: info.training_samples,
    })
}

/// Best effort: keep the processed table next to the input for inspection
fn persist_processed(data_path: &Path, processed: &Table) {
    let processed_path = data_path
        .parent()
        .map(|dir| dir.join("processed_data.csv"))
        .unwrap_or_else(|| PathBuf::from("processed_data.csv"));

    if let Err(err) = processed.write_csv(&processed_path) {
        tracing::warn!(
            "failed to write processed data to {}: {err}",
            processed_path.display()
        );
    } else {
        tracing::info!("processed data saved to {}", processed_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_data_without_generate() {
        let dir = tempfile::tempdir().unwrap();
        let options = TrainOptions::new(
            dir.path().join("absent.csv"),
            dir.path().join("model.json"),
        );

        let err = run(&options).unwrap_err();
        assert!(matches!(err, TrainError::DataNotFound(_)));
    }

    #[test]
    fn test_generate_and_train() {
        let dir = tempfile::tempdir().unwrap();
        let mut options = TrainOptions::new(
            dir.path().join("data").join("house_data.csv"),
            dir.path().join("models").join("model.json"),
        );
        options.generate_sample = true;
        options.n_samples = 300;
        options.params = GbdtParams {
            n_trees: 40,
            max_depth: 4,
            ..GbdtParams::default()
        };

        let report = run(&options).unwrap();

        assert!(options.data_path.exists());
        assert!(options.model_path.exists());
        assert_eq!(report.feature_count, 6);
        assert_eq!(
            report.feature_names,
            vec![
                "area",
                "bedrooms",
                "bathrooms",
                "floors",
                "year_built",
                "location_score"
            ]
        );
        assert!(report.metrics.rmse > 0.0);
    }

    #[test]
    fn test_generic_csv_goes_through_preprocessing() {
        let dir = tempfile::tempdir().unwrap();
        let data_path = dir.path().join("listings.csv");
        std::fs::write(
            &data_path,
            "GrLivArea,BedroomAbvGr,SalePrice\n1000,3,200000\n1500,4,300000\n900,2,180000\n\
             1200,3,240000\n1100,3,220000\n1400,4,280000\n800,2,160000\n1300,3,260000\n\
             950,2,190000\n1250,3,250000\n",
        )
        .unwrap();

        let mut options = TrainOptions::new(&data_path, dir.path().join("model.json"));
        options.params = GbdtParams {
            n_trees: 10,
            max_depth: 3,
            min_child_weight: 1.0,
            ..GbdtParams::default()
        };

        let report = run(&options).unwrap();

        // Preprocessing mapped the raw columns to the canonical schema
        assert_eq!(report.feature_count, 6);
        assert!(dir.path().join("processed_data.csv").exists());
    }
}
