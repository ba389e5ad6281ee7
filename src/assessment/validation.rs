//! Form-level input checks, applied before any prediction runs.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::AssessmentError;
use crate::models::{DiabetesFeatures, Gender, NewPatient};

pub const MAX_NAME_LEN: usize = 200;
pub const AGE_RANGE: (i64, i64) = (18, 100);
pub const ALLOWED_IMAGE_EXTENSIONS: [&str; 3] = ["jpg", "jpeg", "png"];

/// Diabetes assessment form submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiabetesAssessmentRequest {
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub features: DiabetesFeatures,
}

/// Ulcer assessment form submission, with the uploaded image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UlcerAssessmentRequest {
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    /// Name of the file as uploaded; only used for its extension and the
    /// staged file name.
    pub file_name: String,
    pub image: Vec<u8>,
}

pub fn validate_patient(name: &str, age: i64, gender: Gender) -> Result<NewPatient, AssessmentError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(invalid("Patient name is required"));
    }
    if name.chars().count() > MAX_NAME_LEN {
        return Err(invalid(format!(
            "Patient name exceeds {MAX_NAME_LEN} characters"
        )));
    }
    let (min_age, max_age) = AGE_RANGE;
    if !(min_age..=max_age).contains(&age) {
        return Err(invalid(format!(
            "Age must be between {min_age} and {max_age}, got {age}"
        )));
    }
    Ok(NewPatient {
        name: name.to_string(),
        age,
        gender,
    })
}

pub fn validate_features(features: &DiabetesFeatures) -> Result<(), AssessmentError> {
    if !(0..=20).contains(&features.pregnancies) {
        return Err(invalid(format!(
            "Number of pregnancies must be between 0 and 20, got {}",
            features.pregnancies
        )));
    }

    let checks = [
        ("Glucose level", features.glucose, 300.0),
        ("Blood pressure", features.blood_pressure, 200.0),
        ("Skin thickness", features.skin_thickness, 100.0),
        ("Insulin level", features.insulin, 846.0),
        ("BMI", features.bmi, 67.1),
        ("Diabetes pedigree function", features.diabetes_pedigree, 2.5),
    ];
    for (label, value, max) in checks {
        if !value.is_finite() || !(0.0..=max).contains(&value) {
            return Err(invalid(format!(
                "{label} must be between 0 and {max}, got {value}"
            )));
        }
    }
    Ok(())
}

pub fn validate_upload(file_name: &str, bytes: &[u8]) -> Result<(), AssessmentError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    match extension {
        Some(ext) if ALLOWED_IMAGE_EXTENSIONS.contains(&ext.as_str()) => {}
        _ => {
            return Err(invalid(format!(
                "Unsupported image type for '{file_name}': expected jpg, jpeg or png"
            )))
        }
    }
    if bytes.is_empty() {
        return Err(invalid("Uploaded image is empty"));
    }
    Ok(())
}

fn invalid(message: impl Into<String>) -> AssessmentError {
    AssessmentError::InvalidInput(message.into())
}
