//! Health check handler

use axum::{extract::State, Json};
use serde::Serialize;

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    endpoint: String,
    feature_count: usize,
    threshold: f64,
    version: &'static str,
    timestamp: i64,
}

pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        endpoint: state.config.endpoint_name.clone(),
        feature_count: state.preprocessor.feature_count(),
        threshold: state.gateway.threshold(),
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().timestamp(),
    })
}
