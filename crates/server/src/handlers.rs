//! HTTP routes and handlers

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::Serialize;
use serde_json::json;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use hestia_model::{GbdtParams, ModelError, PredictInput, PriceModel};
use hestia_trainer::{TrainError, TrainOptions};

use crate::pricing;
use crate::state::SharedState;
use crate::types::{
    BatchPredictionItem, BatchPredictionRequest, BatchPredictionResponse, FeaturesResponse,
    HouseFeatures, PredictionResponse, TrainPerformance, TrainRequest, TrainResponse,
};

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug)]
struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn new<S: Into<String>>(status: StatusCode, message: S) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn not_found<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    fn internal<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    fn service_unavailable<S: Into<String>>(message: S) -> Self {
        Self::new(StatusCode::SERVICE_UNAVAILABLE, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, payload).into_response()
    }
}

fn model_error(err: ModelError) -> ApiError {
    match err {
        ModelError::Unavailable => {
            ApiError::service_unavailable("no trained model available, run training first")
        }
        ModelError::NotFound(path) => {
            ApiError::not_found(format!("model artifact not found at {}", path.display()))
        }
        other => ApiError::internal(other.to_string()),
    }
}

fn train_error(err: TrainError) -> ApiError {
    match err {
        TrainError::DataNotFound(path) => ApiError::not_found(format!(
            "training data not found at {}; set generate_sample to create a synthetic dataset",
            path.display()
        )),
        other => ApiError::internal(format!("training failed: {other}")),
    }
}

/// Bind and serve until the listener fails
pub async fn start_server(state: SharedState, addr: &str) -> Result<()> {
    let app = build_router(state);
    let listener = bind_listener(addr).await?;
    axum::serve(listener, app)
        .await
        .context("HTTP server terminated unexpectedly")
}

async fn bind_listener(addr: &str) -> Result<tokio::net::TcpListener> {
    if let Ok(socket_addr) = addr.parse::<SocketAddr>() {
        tokio::net::TcpListener::bind(socket_addr)
            .await
            .with_context(|| format!("failed to bind listener on {socket_addr}"))
    } else {
        tokio::net::TcpListener::bind(addr)
            .await
            .with_context(|| format!("failed to bind listener on {addr}"))
    }
}

pub fn build_router(state: SharedState) -> Router {
    Router::new()
        .route("/", get(handle_root))
        .route("/health", get(handle_health))
        .route("/model/info", get(handle_model_info))
        .route("/features", get(handle_features))
        .route("/predict", post(handle_predict))
        .route("/predict/batch", post(handle_predict_batch))
        .route("/train", post(handle_train))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn handle_root(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "message": "Hestia house price estimation service",
        "status": "running",
        "model_loaded": state.model_loaded(),
    }))
}

async fn handle_health(State(state): State<SharedState>) -> Json<serde_json::Value> {
    Json(json!({
        "status": "healthy",
        "model_loaded": state.model_loaded(),
        "model_path": state.model_path.display().to_string(),
    }))
}

async fn handle_model_info(State(state): State<SharedState>) -> Json<serde_json::Value> {
    // Pick up an artifact that appeared on disk after startup
    let _ = state.model.write().ensure_loaded();

    match state.model.read().info() {
        Some(info) => Json(json!({
            "status": "success",
            "model_info": info,
        })),
        None => Json(json!({
            "status": "no_model",
            "message": "no trained model available, run training first",
        })),
    }
}

async fn handle_features(
    State(state): State<SharedState>,
) -> Result<Json<FeaturesResponse>, ApiError> {
    state.model.write().ensure_loaded().map_err(model_error)?;

    let guard = state.model.read();
    let features = guard
        .feature_names()
        .ok_or_else(|| ApiError::service_unavailable("no trained model available"))?;

    Ok(Json(FeaturesResponse {
        count: features.len(),
        features: features.to_vec(),
    }))
}

async fn handle_predict(
    State(state): State<SharedState>,
    Json(request): Json<HouseFeatures>,
) -> Result<Json<PredictionResponse>, ApiError> {
    state
        .model
        .write()
        .ensure_loaded()
        .map_err(|_| ApiError::service_unavailable("no trained model available, run training first"))?;

    let mut input = request.to_input();
    let mut premium = 0.0;

    if let Some(location) = request.location.as_deref() {
        let assessment = pricing::assess_location(location);
        premium = assessment.premium;
        input.location_score = Some(match input.location_score {
            Some(score) => pricing::blend_scores(score, assessment.derived_score),
            None => assessment.derived_score,
        });
    }

    let raw = state
        .model
        .read()
        .predict(&PredictInput::Named(input.clone()))
        .map_err(model_error)?;

    let predicted_price = pricing::normalize_currency(raw * (1.0 + premium));

    Ok(Json(PredictionResponse {
        predicted_price,
        features_used: input,
    }))
}

async fn handle_predict_batch(
    State(state): State<SharedState>,
    Json(request): Json<BatchPredictionRequest>,
) -> Result<Json<BatchPredictionResponse>, ApiError> {
    state
        .model
        .write()
        .ensure_loaded()
        .map_err(|_| ApiError::service_unavailable("no trained model available, run training first"))?;

    let guard = state.model.read();
    let mut predictions = Vec::with_capacity(request.houses.len());
    for house in &request.houses {
        // Batch predictions are raw model outputs: no location premium and
        // no currency normalization.
        let predicted_price = guard
            .predict(&PredictInput::Named(house.to_input()))
            .map_err(model_error)?;
        predictions.push(BatchPredictionItem {
            predicted_price,
            features: house.clone(),
        });
    }

    Ok(Json(BatchPredictionResponse {
        count: predictions.len(),
        predictions,
    }))
}

async fn handle_train(
    State(state): State<SharedState>,
    Json(request): Json<TrainRequest>,
) -> Result<Json<TrainResponse>, ApiError> {
    let data_path = request
        .data_path
        .map(PathBuf::from)
        .unwrap_or_else(|| state.data_path.clone());

    let options = TrainOptions {
        data_path,
        model_path: state.model_path.clone(),
        n_samples: request.n_samples,
        generate_sample: request.generate_sample,
        params: GbdtParams::default(),
    };

    info!(
        "training requested: data={}, generate_sample={}",
        options.data_path.display(),
        options.generate_sample
    );

    let report = tokio::task::spawn_blocking(move || hestia_trainer::run(&options))
        .await
        .map_err(|err| ApiError::internal(format!("training task failed: {err}")))?
        .map_err(train_error)?;

    // Swap in the freshly persisted artifact
    let mut fresh = PriceModel::new(&state.model_path);
    fresh.load().map_err(model_error)?;
    *state.model.write() = fresh;

    Ok(Json(TrainResponse {
        status: "success".to_string(),
        message: format!("model trained on {} samples", report.training_samples),
        model_path: report.model_path.clone(),
        performance: TrainPerformance {
            metrics: report.metrics.clone(),
            feature_count: report.feature_count,
            features: report.feature_names.clone(),
        },
    }))
}
