//! Fraud Gateway Server
//!
//! Scores credit card transactions against a remote, pre-trained model.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                       FRAUD GATEWAY                          │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌───────────┐   ┌──────────────┐   ┌─────────────────────┐ │
//! │  │  API      │──▶│ Preprocessor │──▶│ Prediction Gateway  │ │
//! │  │  (Axum)   │   │ (artifact    │   │ (CSV payload,       │ │
//! │  │  API key  │   │  scaling)    │   │  one call per req)  │ │
//! │  └───────────┘   └──────────────┘   └──────────┬──────────┘ │
//! │                                                ▼            │
//! │                                    ┌─────────────────────┐  │
//! │                                    │ SageMaker runtime   │  │
//! │                                    └─────────────────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod models;
mod logic;
mod handlers;
mod middleware;
mod error;


use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
    middleware as axum_middleware,
    http::Method,
};
use tokio::signal;
use tower_http::{
    cors::{CorsLayer, Any},
    trace::TraceLayer,
    compression::CompressionLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use logic::{InferenceBackend, PredictionGateway, Preprocessor, SageMakerClient};
use models::TransformationArtifact;

pub use error::{AppError, AppResult};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let json_logs = std::env::var("LOG_FORMAT").map(|f| f == "json").unwrap_or(false);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| "fraud_gateway=info,tower_http=info".into()))
        .with(json_logs.then(|| tracing_subscriber::fmt::layer().json()))
        .with((!json_logs).then(|| tracing_subscriber::fmt::layer()))
        .init();

    tracing::info!("Fraud Gateway starting...");

    // Load configuration and artifact; any failure aborts before serving
    let config = config::Config::from_env()?;
    let artifact = Arc::new(TransformationArtifact::load(&config.artifact_path)?);
    let client = SageMakerClient::new(&config)?;

    tracing::info!(
        endpoint = %config.endpoint_name,
        region = %config.region,
        url = %client.invocation_url(),
        inference_component = config.inference_component.as_deref().unwrap_or("-"),
        "Remote model endpoint configured"
    );
    tracing::info!(
        features = artifact.len(),
        fingerprint = %artifact.fingerprint(),
        threshold = config.fraud_threshold,
        "Preprocessor ready"
    );
    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set; authentication is disabled");
    }

    let port = config.port;
    let state = AppState::new(config, artifact, Arc::new(client));

    // Build router
    let app = create_router(state);

    // Start server
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<config::Config>,
    pub preprocessor: Arc<Preprocessor>,
    pub gateway: Arc<PredictionGateway>,
}

impl AppState {
    pub fn new(
        config: config::Config,
        artifact: Arc<TransformationArtifact>,
        backend: Arc<dyn InferenceBackend>,
    ) -> Self {
        let gateway = PredictionGateway::new(backend, config.fraud_threshold, artifact.len());
        Self {
            config: Arc::new(config),
            preprocessor: Arc::new(Preprocessor::new(artifact)),
            gateway: Arc::new(gateway),
        }
    }
}

/// Create the main router with all routes
fn create_router(state: AppState) -> Router {
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/health", get(handlers::health::check));

    // Scoring routes (API key auth)
    let scoring_routes = Router::new()
        .route("/predict", post(handlers::predict::predict))
        .route("/predict/batch", post(handlers::predict::predict_batch))
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::auth::require_api_key
        ));

    // Combine all routes
    Router::new()
        .merge(public_routes)
        .merge(scoring_routes)
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST])
                .allow_headers(Any)
        )
        .with_state(state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
