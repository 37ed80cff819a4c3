//! SageMaker runtime client
//!
//! HTTP client for the remote model endpoint's invocation API.

use std::time::Duration;

use reqwest::header::{ACCEPT, CONTENT_TYPE};

use super::gateway::InferenceBackend;
use crate::config::Config;
use crate::{AppError, AppResult};

const INFERENCE_COMPONENT_HEADER: &str = "X-Amzn-SageMaker-Inference-Component";

/// Longest upstream error body echoed into logs
const MAX_ERROR_BODY: usize = 512;

pub struct SageMakerClient {
    http_client: reqwest::Client,
    invocation_url: String,
    inference_component: Option<String>,
    auth_token: Option<String>,
}

impl SageMakerClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.upstream_timeout_secs))
            .build()
            .map_err(|e| AppError::Configuration(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            invocation_url: config.invocation_url(),
            inference_component: config.inference_component.clone(),
            auth_token: config.upstream_token.clone(),
        })
    }

    pub fn invocation_url(&self) -> &str {
        &self.invocation_url
    }
}

#[axum::async_trait]
impl InferenceBackend for SageMakerClient {
    async fn invoke(&self, payload: String) -> AppResult<String> {
        let mut request = self.http_client
            .post(&self.invocation_url)
            .header(CONTENT_TYPE, "text/csv")
            .header(ACCEPT, "text/csv")
            .body(payload);

        if let Some(component) = &self.inference_component {
            request = request.header(INFERENCE_COMPONENT_HEADER, component);
        }
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let mut body = response.text().await.unwrap_or_default();
            body.truncate(
                body.char_indices()
                    .nth(MAX_ERROR_BODY)
                    .map(|(i, _)| i)
                    .unwrap_or(body.len()),
            );
            return Err(AppError::Upstream(format!(
                "endpoint returned {}: {}",
                status.as_u16(),
                body.trim()
            )));
        }

        Ok(response.text().await?)
    }
}
