//! Configuration module

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::AppError;

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Server port
    pub port: u16,

    /// API key callers must send in `x-api-key` (None disables auth outside production)
    pub api_key: Option<String>,

    /// Remote model endpoint name
    pub endpoint_name: String,

    /// Optional inference component hosted on the endpoint
    pub inference_component: Option<String>,

    /// Region of the remote model service
    pub region: String,

    /// Base URL of the runtime API
    pub runtime_url: String,

    /// Bearer credential for the runtime API
    pub upstream_token: Option<String>,

    /// Outbound request timeout in seconds
    pub upstream_timeout_secs: u64,

    /// Path of the persisted transformation artifact
    pub artifact_path: PathBuf,

    /// Score at or above which a transaction is flagged as fraud
    pub fraud_threshold: f64,

    /// Maximum number of records accepted by /predict/batch
    pub max_batch_size: usize,

    /// Environment (development, production)
    pub environment: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Empty values count as unset, like an empty line in .env
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let endpoint_name = get("SAGEMAKER_ENDPOINT").ok_or_else(|| {
            AppError::Configuration("missing required environment variable: SAGEMAKER_ENDPOINT".to_string())
        })?;

        let region = get("AWS_REGION").unwrap_or_else(|| "ap-south-1".to_string());

        let runtime_url = get("SAGEMAKER_RUNTIME_URL")
            .unwrap_or_else(|| format!("https://runtime.sagemaker.{}.amazonaws.com", region))
            .trim_end_matches('/')
            .to_string();

        let config = Self {
            port: parse_or(&get, "PORT", 8080)?,
            api_key: get("API_KEY"),
            endpoint_name,
            inference_component: get("SAGEMAKER_INFERENCE"),
            region,
            runtime_url,
            upstream_token: get("SAGEMAKER_AUTH_TOKEN"),
            upstream_timeout_secs: parse_or(&get, "UPSTREAM_TIMEOUT_SECS", 30)?,
            artifact_path: get("ARTIFACT_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("artifacts/transform.json")),
            fraud_threshold: parse_or(&get, "FRAUD_THRESHOLD", 0.5)?,
            max_batch_size: parse_or(&get, "MAX_BATCH_SIZE", 1000)?,
            environment: get("ENVIRONMENT").unwrap_or_else(|| "development".to_string()),
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), AppError> {
        if !(0.0..=1.0).contains(&self.fraud_threshold) {
            return Err(AppError::Configuration(format!(
                "FRAUD_THRESHOLD must be within [0, 1], got {}",
                self.fraud_threshold
            )));
        }
        if self.max_batch_size == 0 {
            return Err(AppError::Configuration("MAX_BATCH_SIZE must be at least 1".to_string()));
        }
        if self.upstream_timeout_secs == 0 {
            return Err(AppError::Configuration("UPSTREAM_TIMEOUT_SECS must be at least 1".to_string()));
        }
        if self.is_production() && self.api_key.is_none() {
            return Err(AppError::Configuration("API_KEY is required in production".to_string()));
        }
        Ok(())
    }

    /// Check if running in production
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Full invocation URL of the remote endpoint
    pub fn invocation_url(&self) -> String {
        format!("{}/endpoints/{}/invocations", self.runtime_url, self.endpoint_name)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T, AppError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| AppError::Configuration(format!("invalid value for {}: {:?} ({})", key, raw, e))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup(&[("SAGEMAKER_ENDPOINT", "fraud-xgb")])).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.region, "ap-south-1");
        assert_eq!(config.fraud_threshold, 0.5);
        assert_eq!(config.max_batch_size, 1000);
        assert_eq!(config.artifact_path, PathBuf::from("artifacts/transform.json"));
        assert!(config.api_key.is_none());
        assert_eq!(
            config.invocation_url(),
            "https://runtime.sagemaker.ap-south-1.amazonaws.com/endpoints/fraud-xgb/invocations"
        );
    }

    #[test]
    fn test_missing_endpoint_is_configuration_error() {
        let err = Config::from_lookup(lookup(&[])).unwrap_err();
        assert!(matches!(err, AppError::Configuration(_)));
    }

    #[test]
    fn test_runtime_url_override() {
        let config = Config::from_lookup(lookup(&[
            ("SAGEMAKER_ENDPOINT", "fraud-xgb"),
            ("SAGEMAKER_RUNTIME_URL", "http://127.0.0.1:9000/"),
        ]))
        .unwrap();
        assert_eq!(config.invocation_url(), "http://127.0.0.1:9000/endpoints/fraud-xgb/invocations");
    }

    #[test]
    fn test_invalid_values_rejected() {
        for (key, value) in [
            ("FRAUD_THRESHOLD", "1.5"),
            ("FRAUD_THRESHOLD", "high"),
            ("MAX_BATCH_SIZE", "0"),
            ("PORT", "99999"),
            ("UPSTREAM_TIMEOUT_SECS", "0"),
        ] {
            let result = Config::from_lookup(lookup(&[("SAGEMAKER_ENDPOINT", "e"), (key, value)]));
            assert!(
                matches!(result, Err(AppError::Configuration(_))),
                "{}={} should be rejected",
                key,
                value
            );
        }
    }

    #[test]
    fn test_production_requires_api_key() {
        let result = Config::from_lookup(lookup(&[
            ("SAGEMAKER_ENDPOINT", "e"),
            ("ENVIRONMENT", "production"),
        ]));
        assert!(matches!(result, Err(AppError::Configuration(_))));

        let config = Config::from_lookup(lookup(&[
            ("SAGEMAKER_ENDPOINT", "e"),
            ("ENVIRONMENT", "production"),
            ("API_KEY", "s3cret"),
        ]))
        .unwrap();
        assert!(config.is_production());
    }
}
