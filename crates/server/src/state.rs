//! Shared service state

use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use hestia_model::PriceModel;

pub type SharedState = Arc<AppState>;

/// State shared across request handlers
pub struct AppState {
    /// The serving model; swapped wholesale after a successful `/train`
    pub model: RwLock<PriceModel>,
    pub model_path: PathBuf,
    pub data_path: PathBuf,
}

impl AppState {
    /// Build the state and try to load an existing artifact
    ///
    /// A missing artifact is not fatal: the service starts and answers
    /// predictions with 503 until a model is trained or appears on disk.
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(model_path: P, data_path: Q) -> Self {
        let model_path = model_path.as_ref().to_path_buf();
        let data_path = data_path.as_ref().to_path_buf();

        let mut model = PriceModel::new(&model_path);
        match model.load() {
            Ok(()) => tracing::info!("loaded model artifact from {}", model_path.display()),
            Err(err) => tracing::warn!("starting without a model: {err}"),
        }

        Self {
            model: RwLock::new(model),
            model_path,
            data_path,
        }
    }

    pub fn shared(self) -> SharedState {
        Arc::new(self)
    }

    pub fn model_loaded(&self) -> bool {
        self.model.read().is_loaded()
    }
}
