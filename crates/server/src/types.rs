//! Request and response bodies for the HTTP API

use serde::{Deserialize, Serialize};

use hestia_model::{EvalMetrics, HouseInput};

/// A house described through the public form schema
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HouseFeatures {
    pub area: f64,
    pub bedrooms: f64,
    pub bathrooms: f64,
    #[serde(default = "default_floors")]
    pub floors: f64,
    #[serde(default)]
    pub year_built: Option<f64>,
    #[serde(default)]
    pub location_score: Option<f64>,
    /// Free-text location; feeds the score blend and the price premium
    #[serde(default)]
    pub location: Option<String>,
}

fn default_floors() -> f64 {
    1.0
}

impl HouseFeatures {
    /// Model-facing view, without the location text
    pub fn to_input(&self) -> HouseInput {
        HouseInput {
            area: self.area,
            bedrooms: self.bedrooms,
            bathrooms: self.bathrooms,
            floors: self.floors,
            year_built: self.year_built,
            location_score: self.location_score,
        }
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct PredictionResponse {
    pub predicted_price: f64,
    /// The effective feature values handed to the model
    pub features_used: HouseInput,
}

#[derive(Clone, Debug, Deserialize)]
pub struct BatchPredictionRequest {
    pub houses: Vec<HouseFeatures>,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<BatchPredictionItem>,
    pub count: usize,
}

#[derive(Clone, Debug, Serialize)]
pub struct BatchPredictionItem {
    pub predicted_price: f64,
    /// The request item as received
    pub features: HouseFeatures,
}

#[derive(Clone, Debug, Deserialize)]
pub struct TrainRequest {
    /// CSV to train on; defaults to the service's configured data path
    #[serde(default)]
    pub data_path: Option<String>,
    #[serde(default = "default_samples")]
    pub n_samples: usize,
    /// Generate a synthetic dataset at the data path before training
    #[serde(default)]
    pub generate_sample: bool,
}

fn default_samples() -> usize {
    1000
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainResponse {
    pub status: String,
    pub message: String,
    pub model_path: String,
    pub performance: TrainPerformance,
}

#[derive(Clone, Debug, Serialize)]
pub struct TrainPerformance {
    pub metrics: EvalMetrics,
    pub feature_count: usize,
    pub features: Vec<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct FeaturesResponse {
    pub features: Vec<String>,
    pub count: usize,
}
