//! Hestia dataset tooling
//!
//! Synthetic data generation, a small CSV-backed table type, and the
//! preprocessors that reconcile heterogeneous housing datasets with the
//! canonical six-feature schema.

pub mod error;
pub mod generate;
pub mod preprocess;
pub mod table;

pub use error::DatasetError;
pub use generate::{generate, generate_to_csv, GeneratorConfig};
pub use preprocess::{
    preprocess, preprocess_ames, preprocess_california, preprocess_generic, DatasetKind,
    CANONICAL_COLUMNS,
};
pub use table::{Cell, Table};
