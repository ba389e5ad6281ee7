//! Foot Ulcer Detection view.

use std::path::PathBuf;

use serde::Serialize;

use super::format_confidence;
use crate::assessment::UlcerAssessmentRequest;
use crate::core_state::AppState;
use crate::models::UlcerFinding;

#[derive(Debug, Clone, Serialize)]
pub struct UlcerAssessmentView {
    pub patient_id: i64,
    pub record_id: i64,
    pub result: UlcerFinding,
    /// "Attention Needed" or "Normal".
    pub status: &'static str,
    pub confidence: String,
    /// Staged copy of the upload, shown next to the result.
    pub image_path: PathBuf,
    pub report_path: PathBuf,
}

pub fn run_ulcer_assessment(
    state: &AppState,
    request: UlcerAssessmentRequest,
) -> Result<UlcerAssessmentView, String> {
    let outcome = state
        .controller
        .run_ulcer(&request)
        .map_err(|e| e.to_string())?;

    let finding = outcome.record.prediction;
    Ok(UlcerAssessmentView {
        patient_id: outcome.patient.id,
        record_id: outcome.record.id,
        result: finding,
        status: match finding {
            UlcerFinding::UlcerDetected => "Attention Needed",
            UlcerFinding::Normal => "Normal",
        },
        confidence: format_confidence(outcome.record.probability),
        image_path: PathBuf::from(outcome.record.image_path),
        report_path: outcome.report_path,
    })
}
