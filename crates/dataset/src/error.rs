use thiserror::Error;

/// Errors from dataset loading and preprocessing
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("dataset is empty")]
    Empty,

    #[error("column not found: {0}")]
    MissingColumn(String),

    #[error("column {0} is not numeric")]
    NotNumeric(String),

    #[error("row {row} has {got} fields, expected {expected}")]
    RaggedRow {
        row: usize,
        got: usize,
        expected: usize,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
