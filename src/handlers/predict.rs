//! Prediction handlers

use axum::{extract::State, extract::rejection::JsonRejection, Json};

use crate::{AppState, AppError, AppResult};
use crate::models::{BatchRequest, PredictionResult, TransactionRecord};

/// Score one transaction
pub async fn predict(
    State(state): State<AppState>,
    payload: Result<Json<TransactionRecord>, JsonRejection>,
) -> AppResult<Json<PredictionResult>> {
    let Json(record) = payload?;

    let vector = state.preprocessor.transform(&record)?;
    let result = state.gateway.predict_one(&vector).await?;

    if result.is_fraud {
        tracing::info!(fraud_score = result.fraud_score, "Transaction flagged as fraud");
    }

    Ok(Json(result))
}

/// Score a batch of transactions with a single upstream call
pub async fn predict_batch(
    State(state): State<AppState>,
    payload: Result<Json<BatchRequest>, JsonRejection>,
) -> AppResult<Json<Vec<PredictionResult>>> {
    let Json(batch) = payload?;

    if batch.is_empty() {
        return Err(AppError::Validation("batch must contain at least one record".to_string()));
    }
    if batch.len() > state.config.max_batch_size {
        return Err(AppError::Validation(format!(
            "batch of {} records exceeds the limit of {}",
            batch.len(),
            state.config.max_batch_size
        )));
    }

    let records = batch.into_records()?;
    let vectors = state.preprocessor.transform_batch(&records)?;
    let results = state.gateway.predict_batch(&vectors).await?;

    tracing::info!(
        records = results.len(),
        flagged = results.iter().filter(|r| r.is_fraud).count(),
        "Batch scored"
    );

    Ok(Json(results))
}
