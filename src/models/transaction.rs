//! Transaction input and feature vector models

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::{AppError, AppResult};

/// One raw transaction as supplied by the caller
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TransactionRecord {
    /// `{"features": [..]}` - values already in artifact order
    Positional(PositionalRecord),
    /// `{"amount": 150, "hour": 18, ..}` - extra fields are ignored
    Named(Map<String, Value>),
}

/// Only an object whose sole key is `features`; anything else is named
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PositionalRecord {
    pub features: Vec<Value>,
}

/// Batch body: a bare array, or `{"transactions": [..]}`
///
/// Elements stay raw until `into_records` so a bad one can be reported by index.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum BatchRequest {
    Records(Vec<Value>),
    Wrapped { transactions: Vec<Value> },
}

impl BatchRequest {
    pub fn len(&self) -> usize {
        match self {
            BatchRequest::Records(items) => items.len(),
            BatchRequest::Wrapped { transactions } => transactions.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn into_records(self) -> AppResult<Vec<TransactionRecord>> {
        let items = match self {
            BatchRequest::Records(items) => items,
            BatchRequest::Wrapped { transactions } => transactions,
        };

        items
            .into_iter()
            .enumerate()
            .map(|(i, item)| {
                if !item.is_object() {
                    return Err(AppError::Validation(format!(
                        "record {}: expected a JSON object, got {}",
                        i, item
                    )));
                }
                serde_json::from_value(item)
                    .map_err(|e| AppError::Validation(format!("record {}: {}", i, e)))
            })
            .collect()
    }
}

/// Scaled values in artifact order
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector(Vec<f64>);

impl FeatureVector {
    pub fn new(values: Vec<f64>) -> Self {
        Self(values)
    }

    #[cfg(test)]
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// One CSV line, no header, no trailing newline
    pub fn to_csv_line(&self) -> String {
        self.0
            .iter()
            .map(|v| v.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_record_forms() {
        let named: TransactionRecord = serde_json::from_value(json!({"amount": 150, "hour": 18})).unwrap();
        assert!(matches!(named, TransactionRecord::Named(ref m) if m.len() == 2));

        let positional: TransactionRecord = serde_json::from_value(json!({"features": [1, 2.5]})).unwrap();
        assert!(matches!(positional, TransactionRecord::Positional(ref p) if p.features.len() == 2));

        // Non-array "features" is just a named field
        let named: TransactionRecord = serde_json::from_value(json!({"features": "x"})).unwrap();
        assert!(matches!(named, TransactionRecord::Named(_)));

        // "features" next to other keys is an extra field of a named record
        let named: TransactionRecord =
            serde_json::from_value(json!({"amount": 150, "hour": 18, "features": [0, 0]})).unwrap();
        assert!(matches!(named, TransactionRecord::Named(ref m) if m.len() == 3));

        assert!(serde_json::from_value::<TransactionRecord>(json!([1, 2])).is_err());
    }

    #[test]
    fn test_batch_forms() {
        let bare: BatchRequest = serde_json::from_value(json!([{"a": 1}, {"a": 2}])).unwrap();
        assert_eq!(bare.len(), 2);
        assert_eq!(bare.into_records().unwrap().len(), 2);

        let wrapped: BatchRequest = serde_json::from_value(json!({"transactions": [{"a": 1}]})).unwrap();
        assert_eq!(wrapped.len(), 1);
        assert_eq!(wrapped.into_records().unwrap().len(), 1);
    }

    #[test]
    fn test_batch_element_errors_name_index() {
        let batch: BatchRequest = serde_json::from_value(json!([{"a": 1}, {"a": 2}, 7])).unwrap();
        match batch.into_records().unwrap_err() {
            AppError::Validation(msg) => assert!(msg.starts_with("record 2:"), "{}", msg),
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_csv_line() {
        let vector = FeatureVector::new(vec![1.0, -0.25, 3.5e-7]);
        assert_eq!(vector.to_csv_line(), "1,-0.25,0.00000035");
    }
}
