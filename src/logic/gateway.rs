//! Prediction Gateway - feature vectors to fraud scores
//!
//! Serializes vectors to the CSV wire format (one record per line), makes
//! exactly one backend call per invocation, and maps each returned score to
//! a decision. No retries: a failed call is returned to the caller as is.

use std::sync::Arc;

use serde_json::Value;

use crate::models::{FeatureVector, PredictionResult};
use crate::{AppError, AppResult};

/// Remote model endpoint seam
#[axum::async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Send a CSV payload and return the raw response body
    async fn invoke(&self, payload: String) -> AppResult<String>;
}

pub struct PredictionGateway {
    backend: Arc<dyn InferenceBackend>,
    threshold: f64,
    feature_count: usize,
}

impl PredictionGateway {
    pub fn new(backend: Arc<dyn InferenceBackend>, threshold: f64, feature_count: usize) -> Self {
        Self { backend, threshold, feature_count }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub async fn predict_one(&self, vector: &FeatureVector) -> AppResult<PredictionResult> {
        self.check_length(0, vector)?;

        let scores = self.invoke_scores(vector.to_csv_line(), 1).await?;
        let result = PredictionResult::from_score(scores[0], self.threshold);

        tracing::debug!(fraud_score = result.fraud_score, is_fraud = result.is_fraud, "Transaction scored");
        Ok(result)
    }

    pub async fn predict_batch(&self, vectors: &[FeatureVector]) -> AppResult<Vec<PredictionResult>> {
        if vectors.is_empty() {
            return Err(AppError::Validation("batch must contain at least one record".to_string()));
        }
        for (i, vector) in vectors.iter().enumerate() {
            self.check_length(i, vector)?;
        }

        let payload = vectors
            .iter()
            .map(FeatureVector::to_csv_line)
            .collect::<Vec<_>>()
            .join("\n");

        let scores = self.invoke_scores(payload, vectors.len()).await?;
        let results: Vec<PredictionResult> = scores
            .into_iter()
            .map(|score| PredictionResult::from_score(score, self.threshold))
            .collect();

        tracing::debug!(
            records = results.len(),
            flagged = results.iter().filter(|r| r.is_fraud).count(),
            "Batch scored"
        );
        Ok(results)
    }

    fn check_length(&self, index: usize, vector: &FeatureVector) -> AppResult<()> {
        if vector.len() != self.feature_count {
            return Err(AppError::Validation(format!(
                "record {}: expected {} features, got {}",
                index,
                self.feature_count,
                vector.len()
            )));
        }
        Ok(())
    }

    async fn invoke_scores(&self, payload: String, expected: usize) -> AppResult<Vec<f64>> {
        let body = self.backend.invoke(payload).await?;
        let scores = parse_scores(&body)?;

        if scores.len() != expected {
            return Err(AppError::Upstream(format!(
                "endpoint returned {} scores for {} records",
                scores.len(),
                expected
            )));
        }
        Ok(scores)
    }
}

/// Parse a model response into scores.
///
/// Accepts CSV text (scores separated by newlines and/or commas), a JSON
/// array of numbers, or `{"predictions": [..]}` whose items are numbers or
/// objects with a `score` field.
pub fn parse_scores(body: &str) -> AppResult<Vec<f64>> {
    let body = body.trim();

    let scores = if body.starts_with('[') || body.starts_with('{') {
        parse_json_scores(body)?
    } else {
        body.split(|c: char| c == '\n' || c == ',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<f64>()
                    .map_err(|_| AppError::Upstream(format!("unparseable score {:?}", s)))
            })
            .collect::<AppResult<Vec<_>>>()?
    };

    if let Some(bad) = scores.iter().find(|s| !(0.0..=1.0).contains(*s)) {
        return Err(AppError::Upstream(format!("score {} is not a probability", bad)));
    }
    Ok(scores)
}

fn parse_json_scores(body: &str) -> AppResult<Vec<f64>> {
    let value: Value = serde_json::from_str(body)
        .map_err(|e| AppError::Upstream(format!("malformed JSON response: {}", e)))?;

    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut obj) => match obj.remove("predictions") {
            Some(Value::Array(items)) => items,
            _ => return Err(AppError::Upstream("JSON response has no predictions array".to_string())),
        },
        _ => return Err(AppError::Upstream("unexpected JSON response".to_string())),
    };

    items
        .iter()
        .map(|item| {
            let score = match item {
                Value::Number(n) => n.as_f64(),
                Value::Object(obj) => obj.get("score").and_then(Value::as_f64),
                _ => None,
            };
            score.ok_or_else(|| AppError::Upstream(format!("unexpected prediction item {}", item)))
        })
        .collect()
}
