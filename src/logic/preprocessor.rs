//! Preprocessor - raw transaction to scaled feature vector
//!
//! Applies the training-time scaling in artifact order. Pure: the same
//! record and artifact always give the same vector.

use std::sync::Arc;

use serde_json::Value;

use crate::models::{FeatureVector, PositionalRecord, TransactionRecord, TransformationArtifact};
use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Preprocessor {
    artifact: Arc<TransformationArtifact>,
}

impl Preprocessor {
    pub fn new(artifact: Arc<TransformationArtifact>) -> Self {
        Self { artifact }
    }

    pub fn feature_count(&self) -> usize {
        self.artifact.len()
    }

    pub fn transform(&self, record: &TransactionRecord) -> AppResult<FeatureVector> {
        let features = self.artifact.features();
        let mut out = Vec::with_capacity(features.len());

        match record {
            TransactionRecord::Named(fields) => {
                for feature in features {
                    let value = fields.get(&feature.name).ok_or_else(|| {
                        AppError::Validation(format!("missing feature '{}'", feature.name))
                    })?;
                    out.push(feature.apply(coerce(&feature.name, value)?));
                }
            }
            TransactionRecord::Positional(PositionalRecord { features: values }) => {
                if values.len() != features.len() {
                    return Err(AppError::Validation(format!(
                        "expected {} features, got {}",
                        features.len(),
                        values.len()
                    )));
                }
                for (feature, value) in features.iter().zip(values) {
                    out.push(feature.apply(coerce(&feature.name, value)?));
                }
            }
        }

        Ok(FeatureVector::new(out))
    }

    /// Transform every record; the first invalid record fails the batch
    pub fn transform_batch(&self, records: &[TransactionRecord]) -> AppResult<Vec<FeatureVector>> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                self.transform(record).map_err(|e| match e {
                    AppError::Validation(msg) => AppError::Validation(format!("record {}: {}", i, msg)),
                    other => other,
                })
            })
            .collect()
    }
}

/// Numbers, or strings holding a finite number
fn coerce(name: &str, value: &Value) -> AppResult<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };

    match parsed {
        Some(v) if v.is_finite() => Ok(v),
        _ => Err(AppError::Validation(format!(
            "feature '{}' must be a finite number, got {}",
            name, value
        ))),
    }
}
