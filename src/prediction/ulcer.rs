use tracing::debug;

use super::preprocess::preprocess_image;
use super::{ImageClassifier, PredictionError, UlcerPrediction};
use crate::models::UlcerFinding;

/// Image path of the prediction adapter.
pub struct UlcerPredictor {
    classifier: Box<dyn ImageClassifier>,
    input_size: u32,
    threshold: f64,
}

impl UlcerPredictor {
    pub fn new(classifier: Box<dyn ImageClassifier>, input_size: u32, threshold: f64) -> Self {
        Self {
            classifier,
            input_size,
            threshold,
        }
    }

    /// Classify raw image bytes (JPEG or PNG).
    pub fn predict(&self, image_bytes: &[u8]) -> Result<UlcerPrediction, PredictionError> {
        let tensor = preprocess_image(image_bytes, self.input_size)?;
        let scores = self.classifier.classify(&tensor)?;
        interpret_scores(&scores, self.threshold)
    }
}

/// Reduce raw classifier output to a finding.
///
/// A single output is a sigmoid ulcer score; two outputs are softmax class
/// scores with the ulcer class at index 1. Scores strictly above
/// `threshold` are ulcers. Confidence is that of the reported finding.
pub fn interpret_scores(scores: &[f32], threshold: f64) -> Result<UlcerPrediction, PredictionError> {
    let score = match scores {
        [single] => *single,
        [_, ulcer] => *ulcer,
        other => {
            return Err(PredictionError::Inference(format!(
                "expected 1 or 2 output scores, got {}",
                other.len()
            )))
        }
    };
    let score = f64::from(score);
    if !score.is_finite() || !(0.0..=1.0).contains(&score) {
        return Err(PredictionError::Inference(format!(
            "ulcer score out of range: {score}"
        )));
    }

    let (prediction, confidence) = if score > threshold {
        (UlcerFinding::UlcerDetected, score)
    } else {
        (UlcerFinding::Normal, 1.0 - score)
    };
    debug!(score, finding = prediction.as_str(), "Ulcer classifier output");

    Ok(UlcerPrediction {
        prediction,
        probability: confidence * 100.0,
        ulcer_score: score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prediction::ImageTensor;
    use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    struct FixedScores(Vec<f32>);

    impl ImageClassifier for FixedScores {
        fn classify(&self, _input: &ImageTensor) -> Result<Vec<f32>, PredictionError> {
            Ok(self.0.clone())
        }
    }

    /// Records the tensor shape it was handed.
    struct ShapeProbe(Arc<Mutex<Option<[usize; 4]>>>);

    impl ImageClassifier for ShapeProbe {
        fn classify(&self, input: &ImageTensor) -> Result<Vec<f32>, PredictionError> {
            *self.0.lock().unwrap() = Some(input.shape());
            Ok(vec![0.1])
        }
    }

    fn foot_png() -> Vec<u8> {
        let img = RgbImage::from_pixel(300, 200, Rgb([180, 120, 100]));
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    #[test]
    fn high_score_is_ulcer_with_score_confidence() {
        let predictor = UlcerPredictor::new(Box::new(FixedScores(vec![0.73])), 128, 0.5);
        let result = predictor.predict(&foot_png()).unwrap();
        assert_eq!(result.prediction, UlcerFinding::UlcerDetected);
        assert!((result.probability - 73.0).abs() < 1e-4);
    }

    #[test]
    fn low_score_is_normal_with_complement_confidence() {
        let predictor = UlcerPredictor::new(Box::new(FixedScores(vec![0.2])), 128, 0.5);
        let result = predictor.predict(&foot_png()).unwrap();
        assert_eq!(result.prediction, UlcerFinding::Normal);
        assert!((result.probability - 80.0).abs() < 1e-4);
    }

    #[test]
    fn classifier_sees_configured_input_size() {
        let seen = Arc::new(Mutex::new(None));
        let predictor = UlcerPredictor::new(Box::new(ShapeProbe(seen.clone())), 128, 0.5);
        predictor.predict(&foot_png()).unwrap();
        assert_eq!(*seen.lock().unwrap(), Some([1, 128, 128, 3]));
    }

    #[test]
    fn two_class_output_uses_ulcer_index() {
        let result = interpret_scores(&[0.1, 0.9], 0.5).unwrap();
        assert_eq!(result.prediction, UlcerFinding::UlcerDetected);
        assert!((result.probability - 90.0).abs() < 1e-4);
    }

    #[test]
    fn threshold_itself_is_normal() {
        let result = interpret_scores(&[0.5], 0.5).unwrap();
        assert_eq!(result.prediction, UlcerFinding::Normal);
        assert!((result.probability - 50.0).abs() < 1e-9);
    }

    #[test]
    fn bad_output_is_inference_error() {
        for scores in [vec![], vec![0.1, 0.2, 0.7], vec![1.5], vec![f32::NAN]] {
            assert!(matches!(
                interpret_scores(&scores, 0.5),
                Err(PredictionError::Inference(_))
            ));
        }
    }

    #[test]
    fn undecodable_image_never_reaches_classifier() {
        let seen = Arc::new(Mutex::new(None));
        let predictor = UlcerPredictor::new(Box::new(ShapeProbe(seen.clone())), 128, 0.5);
        let result = predictor.predict(b"GIF89a-not-really");
        assert!(matches!(result, Err(PredictionError::ImageDecode(_))));
        assert!(seen.lock().unwrap().is_none());
    }
}
