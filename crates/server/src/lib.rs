//! Hestia HTTP prediction service
//!
//! Serves the trained house-price model over an axum router, applying
//! location-derived score blending, a location price premium, and output
//! currency normalization at the API boundary.

pub mod handlers;
pub mod pricing;
pub mod state;
pub mod types;

pub use handlers::{build_router, start_server};
pub use state::{AppState, SharedState};
