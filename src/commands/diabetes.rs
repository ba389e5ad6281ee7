//! Diabetes Risk Assessment view.

use std::path::PathBuf;

use serde::Serialize;

use super::format_confidence;
use crate::assessment::DiabetesAssessmentRequest;
use crate::core_state::AppState;
use crate::models::DiabetesRisk;

#[derive(Debug, Clone, Serialize)]
pub struct DiabetesAssessmentView {
    pub patient_id: i64,
    pub record_id: i64,
    /// "High Risk" or "Low Risk".
    pub risk_level: String,
    /// "Attention Needed" or "Normal".
    pub status: &'static str,
    pub prediction: i64,
    pub confidence: String,
    pub report_path: PathBuf,
}

pub fn run_diabetes_assessment(
    state: &AppState,
    request: DiabetesAssessmentRequest,
) -> Result<DiabetesAssessmentView, String> {
    let outcome = state
        .controller
        .run_diabetes(&request)
        .map_err(|e| e.to_string())?;

    let risk = outcome.record.prediction;
    Ok(DiabetesAssessmentView {
        patient_id: outcome.patient.id,
        record_id: outcome.record.id,
        risk_level: format!("{} Risk", risk.label()),
        status: match risk {
            DiabetesRisk::High => "Attention Needed",
            DiabetesRisk::Low => "Normal",
        },
        prediction: risk.class_label(),
        confidence: format_confidence(outcome.record.probability),
        report_path: outcome.report_path,
    })
}
