use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::DiabetesRisk;

/// Clinical inputs for a diabetes risk assessment.
///
/// Age is not repeated here: it belongs to the patient and is appended
/// when the classifier row is assembled.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DiabetesFeatures {
    pub pregnancies: i64,
    pub glucose: f64,
    pub blood_pressure: f64,
    pub skin_thickness: f64,
    pub insulin: f64,
    pub bmi: f64,
    pub diabetes_pedigree: f64,
}

/// One stored diabetes risk assessment. Immutable once inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesRecord {
    pub id: i64,
    pub patient_id: i64,
    pub features: DiabetesFeatures,
    pub prediction: DiabetesRisk,
    /// Confidence of the winning class, 0-100.
    pub probability: f64,
    pub created_at: NaiveDateTime,
}
