//! Authentication middleware

use axum::{
    extract::{State, Request},
    middleware::Next,
    response::Response,
};
use sha2::{Sha256, Digest};

use crate::{AppState, AppError};

pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware: Require the configured API key.
///
/// Runs before the body is extracted, so a rejected request is never
/// preprocessed or forwarded. With no key configured (development only)
/// every request passes.
pub async fn require_api_key(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let Some(expected) = state.config.api_key.as_deref() else {
        return Ok(next.run(req).await);
    };

    let provided = req.headers()
        .get(API_KEY_HEADER)
        .ok_or(AppError::Unauthorized)?
        .to_str()
        .map_err(|_| AppError::Unauthorized)?;

    // Compare fixed-length digests rather than the raw strings
    if hash_key(provided) != hash_key(expected) {
        tracing::warn!(path = %req.uri().path(), "Rejected request with invalid API key");
        return Err(AppError::Unauthorized);
    }

    Ok(next.run(req).await)
}

fn hash_key(key: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(key.as_bytes());
    hasher.finalize().into()
}
