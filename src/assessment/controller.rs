use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::staging::{remove_staged, stage_upload};
use super::validation::{
    validate_features, validate_patient, validate_upload, DiabetesAssessmentRequest,
    UlcerAssessmentRequest,
};
use super::{AssessmentError, AssessmentStep};
use crate::db::PatientStore;
use crate::models::{DiabetesRecord, Patient, UlcerRecord};
use crate::prediction::{DiabetesPredictor, UlcerPredictor};
use crate::report::ReportComposer;

/// A completed assessment: what was stored and where its report went.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssessmentOutcome<R> {
    pub patient: Patient,
    pub record: R,
    pub report_path: PathBuf,
}

/// Drives one assessment through predict, persist and report.
///
/// Holds no per-request state; every call is independent and nothing is
/// retried. Patient and record are written in a single transaction.
pub struct AssessmentController {
    store: PatientStore,
    diabetes: DiabetesPredictor,
    ulcer: UlcerPredictor,
    reports: ReportComposer,
    uploads_dir: PathBuf,
}

impl AssessmentController {
    pub fn new(
        store: PatientStore,
        diabetes: DiabetesPredictor,
        ulcer: UlcerPredictor,
        reports: ReportComposer,
        uploads_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            store,
            diabetes,
            ulcer,
            reports,
            uploads_dir: uploads_dir.into(),
        }
    }

    pub fn store(&self) -> &PatientStore {
        &self.store
    }

    pub fn reports(&self) -> &ReportComposer {
        &self.reports
    }

    pub fn run_diabetes(
        &self,
        request: &DiabetesAssessmentRequest,
    ) -> Result<AssessmentOutcome<DiabetesRecord>, AssessmentError> {
        self.diabetes_steps(request)
            .inspect_err(|e| log_abort("diabetes", e))
    }

    pub fn run_ulcer(
        &self,
        request: &UlcerAssessmentRequest,
    ) -> Result<AssessmentOutcome<UlcerRecord>, AssessmentError> {
        self.ulcer_steps(request).inspect_err(|e| log_abort("ulcer", e))
    }

    fn diabetes_steps(
        &self,
        request: &DiabetesAssessmentRequest,
    ) -> Result<AssessmentOutcome<DiabetesRecord>, AssessmentError> {
        enter(AssessmentStep::CollectInput);
        let patient = validate_patient(&request.name, request.age, request.gender)?;
        validate_features(&request.features)?;

        enter(AssessmentStep::Predict);
        let prediction = self.diabetes.predict(&request.features, patient.age)?;

        enter(AssessmentStep::Persist);
        let recorded = self.store.record_diabetes_assessment(
            &patient,
            &request.features,
            prediction.prediction,
            prediction.probability,
        )?;
        info!(
            patient_id = recorded.patient.id,
            record_id = recorded.record.id,
            risk = recorded.record.prediction.label(),
            probability = recorded.record.probability,
            "Diabetes assessment stored"
        );

        enter(AssessmentStep::ComposeReport);
        let report_path = self
            .reports
            .generate_report(&recorded.patient, Some(&recorded.record), None)
            .map_err(|source| AssessmentError::ReportGeneration {
                patient_id: recorded.patient.id,
                record_id: recorded.record.id,
                source,
            })?;

        enter(AssessmentStep::Done);
        Ok(AssessmentOutcome {
            patient: recorded.patient,
            record: recorded.record,
            report_path,
        })
    }

    fn ulcer_steps(
        &self,
        request: &UlcerAssessmentRequest,
    ) -> Result<AssessmentOutcome<UlcerRecord>, AssessmentError> {
        enter(AssessmentStep::CollectInput);
        let patient = validate_patient(&request.name, request.age, request.gender)?;
        validate_upload(&request.file_name, &request.image)?;

        enter(AssessmentStep::SaveImage);
        let staged = stage_upload(&self.uploads_dir, &request.file_name, &request.image)?;

        enter(AssessmentStep::Predict);
        let prediction = match self.ulcer.predict(&request.image) {
            Ok(p) => p,
            Err(e) => {
                discard_upload(&staged);
                return Err(e.into());
            }
        };

        enter(AssessmentStep::Persist);
        let image_path = staged.to_string_lossy();
        let recorded = match self.store.record_ulcer_assessment(
            &patient,
            &image_path,
            prediction.prediction,
            prediction.probability,
        ) {
            Ok(r) => r,
            Err(e) => {
                discard_upload(&staged);
                return Err(e.into());
            }
        };
        info!(
            patient_id = recorded.patient.id,
            record_id = recorded.record.id,
            finding = recorded.record.prediction.as_str(),
            probability = recorded.record.probability,
            "Ulcer assessment stored"
        );

        enter(AssessmentStep::ComposeReport);
        let report_path = self
            .reports
            .generate_report(&recorded.patient, None, Some(&recorded.record))
            .map_err(|source| AssessmentError::ReportGeneration {
                patient_id: recorded.patient.id,
                record_id: recorded.record.id,
                source,
            })?;

        enter(AssessmentStep::Done);
        Ok(AssessmentOutcome {
            patient: recorded.patient,
            record: recorded.record,
            report_path,
        })
    }
}

fn enter(step: AssessmentStep) {
    debug!(%step, "Assessment step");
}

fn log_abort(kind: &str, e: &AssessmentError) {
    if e.is_persisted() {
        warn!(kind, step = %e.step(), error = %e, "Assessment stored without report");
    } else {
        error!(kind, step = %e.step(), error = %e, "Assessment aborted");
    }
}

/// No record points at the upload, so it goes.
fn discard_upload(path: &Path) {
    if let Err(e) = remove_staged(path) {
        warn!(path = %path.display(), error = %e, "Failed to remove staged upload");
    }
}
