//! ONNX Runtime backend for the ulcer image classifier.

use std::path::Path;
use std::sync::Mutex;

use ort::session::Session;
use ort::value::TensorRef;

use super::{ensure_artifact_exists, ImageClassifier, ImageTensor, PredictionError};

/// Converted ulcer CNN, fed a `[1, size, size, 3]` float tensor.
///
/// `Session::run` needs `&mut self`, so the session sits behind a mutex.
pub struct OnnxImageClassifier {
    session: Mutex<Session>,
}

impl OnnxImageClassifier {
    pub fn load(path: &Path) -> Result<Self, PredictionError> {
        ensure_artifact_exists(path)?;

        let session = Session::builder()
            .map_err(|e: ort::Error| PredictionError::ModelLoad(e.to_string()))?
            .with_intra_threads(2)
            .map_err(|e: ort::Error| PredictionError::ModelLoad(e.to_string()))?
            .commit_from_file(path)
            .map_err(|e: ort::Error| PredictionError::ModelLoad(format!("ONNX load failed: {e}")))?;

        tracing::info!(path = %path.display(), "Ulcer model loaded");

        Ok(Self {
            session: Mutex::new(session),
        })
    }
}

impl ImageClassifier for OnnxImageClassifier {
    fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, PredictionError> {
        let size = input.size as usize;
        let array = ndarray::Array4::from_shape_vec((1, size, size, 3), input.data.clone())
            .map_err(|e| PredictionError::InvalidInput(e.to_string()))?;
        let tensor = TensorRef::from_array_view(&array)
            .map_err(|e| PredictionError::Inference(e.to_string()))?;

        let mut session = self
            .session
            .lock()
            .map_err(|_| PredictionError::Inference("Session lock poisoned".to_string()))?;

        let outputs = session
            .run(ort::inputs![tensor])
            .map_err(|e| PredictionError::Inference(format!("ONNX inference failed: {e}")))?;

        // [1, 1] sigmoid or [1, 2] softmax
        let (shape, scores) = outputs[0]
            .try_extract_tensor::<f32>()
            .map_err(|e| PredictionError::Inference(format!("Output extraction: {e}")))?;
        if shape.first().copied() != Some(1) {
            return Err(PredictionError::Inference(format!(
                "Unexpected output shape: {shape:?}"
            )));
        }

        Ok(scores.to_vec())
    }
}
