//! Error handling

use axum::{
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Caller errors
    #[error("validation error: {0}")]
    Validation(String),

    #[error("missing or invalid API key")]
    Unauthorized,

    // Startup errors (artifact, environment)
    #[error("configuration error: {0}")]
    Configuration(String),

    // Remote model endpoint errors
    #[error("upstream error: {0}")]
    Upstream(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Configuration(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::Validation(msg) => {
                tracing::debug!("Rejected request: {}", msg);
                msg.as_str()
            }
            AppError::Unauthorized => "Invalid or missing API key",
            AppError::Upstream(msg) => {
                tracing::error!("Upstream model error: {}", msg);
                "Upstream model error"
            }
            AppError::Configuration(msg) => {
                tracing::error!("Configuration error: {}", msg);
                "Server misconfigured"
            }
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            AppError::Upstream(format!("request timed out: {}", err))
        } else {
            AppError::Upstream(err.to_string())
        }
    }
}

impl From<axum::extract::rejection::JsonRejection> for AppError {
    fn from(rejection: axum::extract::rejection::JsonRejection) -> Self {
        AppError::Validation(rejection.body_text())
    }
}
