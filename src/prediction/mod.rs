//! Prediction Adapter: uniform predict contracts over the two trained models.
//!
//! The classifiers themselves are opaque behind [`TabularClassifier`] and
//! [`ImageClassifier`]; this module owns input shaping (feature ordering,
//! image resize/normalize) and output interpretation (class, confidence).

pub mod forest;
#[cfg(feature = "onnx-models")]
pub mod onnx;
pub mod preprocess;
pub mod tabular;
pub mod ulcer;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{DiabetesRisk, UlcerFinding};

pub use forest::RandomForestModel;
pub use preprocess::{preprocess_image, ImageTensor};
pub use tabular::{DiabetesPredictor, DIABETES_FEATURE_ORDER};
pub use ulcer::UlcerPredictor;

#[derive(Error, Debug)]
pub enum PredictionError {
    #[error("Model artifact not found: {0}")]
    ModelNotFound(PathBuf),

    #[error("Model load failed: {0}")]
    ModelLoad(String),

    #[error("Invalid model input: {0}")]
    InvalidInput(String),

    #[error("Image decode failed: {0}")]
    ImageDecode(String),

    #[error("Inference failed: {0}")]
    Inference(String),
}

/// Class-probability model over a fixed-order numeric feature row.
pub trait TabularClassifier: Send + Sync {
    /// Probability per class, indexed by class label (0 = low, 1 = high).
    fn predict_proba(&self, row: &[f64]) -> Result<Vec<f64>, PredictionError>;
}

/// Image model over a normalized HWC tensor.
pub trait ImageClassifier: Send + Sync {
    /// Raw output scores: one sigmoid score, or two softmax class scores
    /// where index 1 is the ulcer class.
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, PredictionError>;
}

/// Outcome of the tabular path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiabetesPrediction {
    pub prediction: DiabetesRisk,
    /// Confidence in whichever class won, 0-100.
    pub probability: f64,
}

/// Outcome of the image path.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UlcerPrediction {
    pub prediction: UlcerFinding,
    /// Confidence in the reported finding, 0-100.
    pub probability: f64,
    /// Ulcer-class score the finding was derived from.
    pub ulcer_score: f64,
}

pub(crate) fn ensure_artifact_exists(path: &Path) -> Result<(), PredictionError> {
    if path.is_file() {
        Ok(())
    } else {
        Err(PredictionError::ModelNotFound(path.to_path_buf()))
    }
}

/// Load the image classifier artifact configured for this build.
#[cfg(feature = "onnx-models")]
pub fn load_image_classifier(path: &Path) -> Result<Box<dyn ImageClassifier>, PredictionError> {
    Ok(Box::new(onnx::OnnxImageClassifier::load(path)?))
}

/// Load the image classifier artifact configured for this build.
#[cfg(not(feature = "onnx-models"))]
pub fn load_image_classifier(path: &Path) -> Result<Box<dyn ImageClassifier>, PredictionError> {
    ensure_artifact_exists(path)?;
    Err(PredictionError::ModelLoad(format!(
        "{} requires the `onnx-models` feature",
        path.display()
    )))
}
