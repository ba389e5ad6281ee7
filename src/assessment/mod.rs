//! Session Controller: one assessment from form input to written report.

pub mod controller;
pub mod staging;
pub mod validation;

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::db::DatabaseError;
use crate::prediction::PredictionError;
use crate::report::ReportError;

pub use controller::{AssessmentController, AssessmentOutcome};
pub use validation::{DiabetesAssessmentRequest, UlcerAssessmentRequest};

/// Stages of an assessment, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AssessmentStep {
    CollectInput,
    SaveImage,
    Predict,
    Persist,
    ComposeReport,
    Done,
}

impl AssessmentStep {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CollectInput => "collect_input",
            Self::SaveImage => "save_image",
            Self::Predict => "predict",
            Self::Persist => "persist",
            Self::ComposeReport => "compose_report",
            Self::Done => "done",
        }
    }
}

impl fmt::Display for AssessmentStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Error, Debug)]
pub enum AssessmentError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Assessment failed: {0}")]
    AssessmentFailed(#[from] PredictionError),

    #[error("Failed to save uploaded image: {0}")]
    ImageStaging(#[from] std::io::Error),

    #[error("Failed to store assessment: {0}")]
    Persistence(#[from] DatabaseError),

    /// The assessment is already stored; only the report is missing.
    #[error("Report generation failed for patient {patient_id}: {source}")]
    ReportGeneration {
        patient_id: i64,
        record_id: i64,
        #[source]
        source: ReportError,
    },
}

impl AssessmentError {
    /// Stage the assessment stopped at.
    pub fn step(&self) -> AssessmentStep {
        match self {
            Self::InvalidInput(_) => AssessmentStep::CollectInput,
            Self::ImageStaging(_) => AssessmentStep::SaveImage,
            Self::AssessmentFailed(_) => AssessmentStep::Predict,
            Self::Persistence(_) => AssessmentStep::Persist,
            Self::ReportGeneration { .. } => AssessmentStep::ComposeReport,
        }
    }

    /// Whether the patient and record were written before the failure.
    pub fn is_persisted(&self) -> bool {
        matches!(self, Self::ReportGeneration { .. })
    }
}
