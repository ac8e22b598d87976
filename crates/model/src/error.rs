use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the price model
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("no model has been trained or loaded")]
    Unavailable,

    #[error("model artifact not found at {0}")]
    NotFound(PathBuf),

    #[error("training data is empty")]
    EmptyDataset,

    #[error("feature rows ({rows}) do not match targets ({targets})")]
    ShapeMismatch { rows: usize, targets: usize },

    #[error("input vector has {got} values but the model expects {expected}")]
    VectorWidth { got: usize, expected: usize },

    #[error("invalid model: {0}")]
    Invalid(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
