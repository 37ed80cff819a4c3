//! Scoring pipeline: preprocessing, gateway, remote endpoint client

pub mod preprocessor;
pub mod gateway;
pub mod sagemaker;

pub use preprocessor::Preprocessor;
pub use gateway::{InferenceBackend, PredictionGateway};
pub use sagemaker::SageMakerClient;
