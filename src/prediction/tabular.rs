use tracing::debug;

use super::{DiabetesPrediction, PredictionError, TabularClassifier};
use crate::models::{DiabetesFeatures, DiabetesRisk};

/// Column order the trained diabetes classifier expects.
pub const DIABETES_FEATURE_ORDER: [&str; 8] = [
    "Pregnancies",
    "Glucose",
    "BloodPressure",
    "SkinThickness",
    "Insulin",
    "BMI",
    "DiabetesPedigreeFunction",
    "Age",
];

/// Assemble the classifier row in [`DIABETES_FEATURE_ORDER`].
pub fn feature_row(features: &DiabetesFeatures, age: i64) -> [f64; 8] {
    [
        features.pregnancies as f64,
        features.glucose,
        features.blood_pressure,
        features.skin_thickness,
        features.insulin,
        features.bmi,
        features.diabetes_pedigree,
        age as f64,
    ]
}

/// Tabular path of the prediction adapter.
pub struct DiabetesPredictor {
    classifier: Box<dyn TabularClassifier>,
}

impl DiabetesPredictor {
    pub fn new(classifier: Box<dyn TabularClassifier>) -> Self {
        Self { classifier }
    }

    /// Predict the risk class and report the winning class's probability
    /// as a percentage.
    ///
    /// For a low-risk result the confidence is P(low), not P(high).
    pub fn predict(
        &self,
        features: &DiabetesFeatures,
        age: i64,
    ) -> Result<DiabetesPrediction, PredictionError> {
        let row = feature_row(features, age);
        if let Some(i) = row.iter().position(|v| !v.is_finite()) {
            return Err(PredictionError::InvalidInput(format!(
                "{} is not a finite number",
                DIABETES_FEATURE_ORDER[i]
            )));
        }

        let proba = self.classifier.predict_proba(&row)?;
        interpret_probabilities(&proba)
    }
}

/// Map class probabilities to (class, max probability × 100).
pub fn interpret_probabilities(proba: &[f64]) -> Result<DiabetesPrediction, PredictionError> {
    if proba.len() != 2 {
        return Err(PredictionError::Inference(format!(
            "expected 2 class probabilities, got {}",
            proba.len()
        )));
    }
    if proba.iter().any(|p| !p.is_finite() || *p < 0.0 || *p > 1.0) {
        return Err(PredictionError::Inference(format!(
            "class probabilities out of range: {proba:?}"
        )));
    }

    // Ties resolve to the lower class, like an argmax over class order.
    let (prediction, winning) = if proba[1] > proba[0] {
        (DiabetesRisk::High, proba[1])
    } else {
        (DiabetesRisk::Low, proba[0])
    };
    debug!(?proba, class = prediction.class_label(), "Diabetes classifier output");

    Ok(DiabetesPrediction {
        prediction,
        probability: winning * 100.0,
    })
}
