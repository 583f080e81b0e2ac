//! Crop classification
//!
//! The pipeline treats the classifier as opaque: a 7-element feature vector
//! goes in, one crop label comes out. The shipped implementation is a
//! nearest-centroid model read from a JSON artifact produced offline.

use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Feature names in the order the model was trained on
pub const FEATURE_NAMES: [&str; 7] = ["N", "P", "K", "temperature", "humidity", "ph", "rainfall"];

/// `[N, P, K, temperature, humidity, pH, rainfall]`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureVector([f64; 7]);

impl FeatureVector {
    pub fn new(values: [f64; 7]) -> Self {
        Self(values)
    }

    pub fn values(&self) -> &[f64; 7] {
        &self.0
    }
}

#[derive(Debug, Error)]
pub enum ClassifierError {
    #[error("failed to read model artifact {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse model artifact: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),
    #[error("feature {0} is not a finite number")]
    NonFinite(&'static str),
}

pub trait CropClassifier: Send + Sync {
    fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError>;
}

#[derive(Debug, Deserialize)]
struct Artifact {
    features: Vec<String>,
    scale: [f64; 7],
    classes: Vec<CropCentroid>,
}

#[derive(Debug, Deserialize)]
struct CropCentroid {
    label: String,
    centroid: [f64; 7],
}

/// Nearest-centroid classifier over scale-normalized features
#[derive(Debug)]
pub struct CentroidClassifier {
    scale: [f64; 7],
    classes: Vec<CropCentroid>,
}

impl CentroidClassifier {
    pub fn load(path: &Path) -> Result<Self, ClassifierError> {
        let text = std::fs::read_to_string(path).map_err(|source| ClassifierError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ClassifierError> {
        let artifact: Artifact = serde_json::from_str(text)?;

        if artifact.features.iter().map(String::as_str).ne(FEATURE_NAMES) {
            return Err(ClassifierError::InvalidArtifact(format!(
                "feature order {:?} does not match {FEATURE_NAMES:?}",
                artifact.features
            )));
        }
        if artifact.classes.is_empty() {
            return Err(ClassifierError::InvalidArtifact("no classes".to_string()));
        }
        if artifact.scale.iter().any(|s| !s.is_finite() || *s <= 0.0) {
            return Err(ClassifierError::InvalidArtifact(
                "scales must be positive".to_string(),
            ));
        }
        if let Some(bad) = artifact
            .classes
            .iter()
            .find(|c| c.label.trim().is_empty() || c.centroid.iter().any(|v| !v.is_finite()))
        {
            return Err(ClassifierError::InvalidArtifact(format!(
                "bad class entry {:?}",
                bad.label
            )));
        }

        Ok(Self {
            scale: artifact.scale,
            classes: artifact.classes,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.classes.iter().map(|c| c.label.as_str())
    }

    fn distance(&self, features: &[f64; 7], centroid: &[f64; 7]) -> f64 {
        features
            .iter()
            .zip(centroid)
            .zip(&self.scale)
            .map(|((x, c), s)| ((x - c) / s).powi(2))
            .sum()
    }
}

impl CropClassifier for CentroidClassifier {
    fn classify(&self, features: &FeatureVector) -> Result<String, ClassifierError> {
        let values = features.values();
        if let Some(i) = values.iter().position(|v| !v.is_finite()) {
            return Err(ClassifierError::NonFinite(FEATURE_NAMES[i]));
        }

        self.classes
            .iter()
            .map(|c| (c, self.distance(values, &c.centroid)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(c, _)| c.label.clone())
            .ok_or_else(|| ClassifierError::InvalidArtifact("no classes".to_string()))
    }
}
