//! Transformation artifact - scaling parameters persisted at training time
//!
//! The feature order stored here is the order the remote model was trained
//! on. Nothing verifies it against the model; a reordered artifact yields
//! wrong scores without any error.

use std::collections::HashSet;
use std::path::Path;

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::{AppError, AppResult};

/// Linear transform for one feature: `(raw - center) / spread`
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureTransform {
    pub name: String,
    pub center: f64,
    pub spread: f64,
}

impl FeatureTransform {
    pub fn apply(&self, raw: f64) -> f64 {
        (raw - self.center) / self.spread
    }
}

/// Immutable, validated artifact shared by every request
#[derive(Debug, Clone)]
pub struct TransformationArtifact {
    features: Vec<FeatureTransform>,
}

// ----------------------------------------------------------------------------
// On-disk layouts
// ----------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ArtifactFile {
    /// `{"features": [{"name": .., "center": .., "spread": ..}, ..]}`
    PerFeature { features: Vec<FeatureSpec> },
    /// Exported standard scaler: `{"feature_order": [..], "mean": [..], "scale": [..]}`
    Columnar {
        feature_order: Vec<String>,
        mean: Vec<f64>,
        scale: Vec<f64>,
    },
}

#[derive(Debug, Deserialize)]
struct FeatureSpec {
    name: String,
    #[serde(flatten)]
    params: ScaleParams,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ScaleParams {
    Linear { center: f64, spread: f64 },
    Standard { mean: f64, std: f64 },
    MinMax { min: f64, max: f64 },
}

impl ScaleParams {
    fn center_spread(&self) -> (f64, f64) {
        match *self {
            ScaleParams::Linear { center, spread } => (center, spread),
            ScaleParams::Standard { mean, std } => (mean, std),
            ScaleParams::MinMax { min, max } => (min, max - min),
        }
    }
}

impl TransformationArtifact {
    /// Load and validate an artifact file
    pub fn load<P: AsRef<Path>>(path: P) -> AppResult<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|e| {
            AppError::Configuration(format!("cannot read artifact {}: {}", path.display(), e))
        })?;

        let artifact = Self::from_json_str(&raw).map_err(|e| match e {
            AppError::Configuration(msg) => {
                AppError::Configuration(format!("{}: {}", path.display(), msg))
            }
            other => other,
        })?;

        tracing::info!(
            path = %path.display(),
            features = artifact.len(),
            fingerprint = %artifact.fingerprint(),
            "Transformation artifact loaded"
        );
        Ok(artifact)
    }

    /// Parse and validate an artifact from its JSON text
    pub fn from_json_str(raw: &str) -> AppResult<Self> {
        let file: ArtifactFile = serde_json::from_str(raw)
            .map_err(|e| AppError::Configuration(format!("malformed artifact: {}", e)))?;

        let features = match file {
            ArtifactFile::PerFeature { features } => features
                .into_iter()
                .map(|spec| {
                    let (center, spread) = spec.params.center_spread();
                    FeatureTransform { name: spec.name, center, spread }
                })
                .collect(),
            ArtifactFile::Columnar { feature_order, mean, scale } => {
                if feature_order.len() != mean.len() || feature_order.len() != scale.len() {
                    return Err(AppError::Configuration(format!(
                        "feature_order has {} entries but mean has {} and scale has {}",
                        feature_order.len(),
                        mean.len(),
                        scale.len()
                    )));
                }
                feature_order
                    .into_iter()
                    .zip(mean)
                    .zip(scale)
                    .map(|((name, center), spread)| FeatureTransform { name, center, spread })
                    .collect()
            }
        };

        Self::new(features)
    }

    /// Build an artifact from already-parsed transforms
    pub fn new(features: Vec<FeatureTransform>) -> AppResult<Self> {
        if features.is_empty() {
            return Err(AppError::Configuration("artifact declares no features".to_string()));
        }

        let mut seen = HashSet::with_capacity(features.len());
        for feature in &features {
            if feature.name.trim().is_empty() {
                return Err(AppError::Configuration("artifact contains an unnamed feature".to_string()));
            }
            if !seen.insert(feature.name.as_str()) {
                return Err(AppError::Configuration(format!(
                    "feature '{}' is declared more than once",
                    feature.name
                )));
            }
            if !feature.center.is_finite() || !feature.spread.is_finite() {
                return Err(AppError::Configuration(format!(
                    "feature '{}' has non-finite parameters",
                    feature.name
                )));
            }
            if feature.spread == 0.0 {
                return Err(AppError::Configuration(format!(
                    "feature '{}' has zero spread",
                    feature.name
                )));
            }
        }

        Ok(Self { features })
    }

    pub fn features(&self) -> &[FeatureTransform] {
        &self.features
    }

    pub fn feature_names(&self) -> impl Iterator<Item = &str> {
        self.features.iter().map(|f| f.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    /// SHA-256 of the ordered feature names, for comparing deployments in logs
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        for name in self.feature_names() {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
        }
        let digest = format!("{:x}", hasher.finalize());
        digest[..16].to_string()
    }
}
