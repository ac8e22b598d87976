//! Hestia price model
//!
//! Gradient-boosted regression over the canonical house-feature schema, with
//! JSON artifact persistence and prediction-time feature mapping between the
//! fixed form schema and whatever columns the model was trained on.

pub mod artifact;
pub mod error;
pub mod features;
pub mod gbdt;
pub mod metrics;
pub mod model;

pub use artifact::ModelArtifact;
pub use error::ModelError;
pub use features::{HouseInput, PredictInput, CANONICAL_FEATURES};
pub use gbdt::{Booster, GbdtParams};
pub use metrics::EvalMetrics;
pub use model::{ModelInfo, PriceModel};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
