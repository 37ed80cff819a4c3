//! Prediction output model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    /// Fraud probability in [0, 1]
    pub fraud_score: f64,
    pub is_fraud: bool,
}

impl PredictionResult {
    pub fn from_score(fraud_score: f64, threshold: f64) -> Self {
        Self {
            fraud_score,
            is_fraud: fraud_score >= threshold,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_threshold_is_inclusive() {
        assert!(PredictionResult::from_score(0.5, 0.5).is_fraud);
        assert!(!PredictionResult::from_score(0.4999, 0.5).is_fraud);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_value(PredictionResult::from_score(0.9, 0.5)).unwrap();
        assert_eq!(json, serde_json::json!({"fraud_score": 0.9, "is_fraud": true}));
    }
}
