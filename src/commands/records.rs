//! Patient Records view: name search with each match's full history.

use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use serde::Serialize;

use super::format_confidence;
use crate::core_state::AppState;
use crate::models::{DiabetesRecord, Gender, PatientRecords, UlcerRecord};

#[derive(Debug, Clone, Serialize)]
pub struct PatientRecordView {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub created_at: NaiveDateTime,
    pub diabetes_records: Vec<DiabetesRecordView>,
    pub ulcer_records: Vec<UlcerRecordView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct DiabetesRecordView {
    pub id: i64,
    pub created_at: NaiveDateTime,
    /// "High" or "Low".
    pub risk: &'static str,
    pub confidence: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct UlcerRecordView {
    pub id: i64,
    pub created_at: NaiveDateTime,
    pub result: String,
    pub confidence: String,
    pub image_path: String,
    /// The image is only shown while the staged file still exists.
    pub image_available: bool,
}

impl From<&DiabetesRecord> for DiabetesRecordView {
    fn from(r: &DiabetesRecord) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            risk: r.prediction.label(),
            confidence: format_confidence(r.probability),
        }
    }
}

impl From<&UlcerRecord> for UlcerRecordView {
    fn from(r: &UlcerRecord) -> Self {
        Self {
            id: r.id,
            created_at: r.created_at,
            result: r.prediction.to_string(),
            confidence: format_confidence(r.probability),
            image_path: r.image_path.clone(),
            image_available: Path::new(&r.image_path).is_file(),
        }
    }
}

impl From<PatientRecords> for PatientRecordView {
    fn from(records: PatientRecords) -> Self {
        let patient = records.patient;
        Self {
            id: patient.id,
            name: patient.name,
            age: patient.age,
            gender: patient.gender,
            created_at: patient.created_at,
            diabetes_records: records.diabetes_records.iter().map(Into::into).collect(),
            ulcer_records: records.ulcer_records.iter().map(Into::into).collect(),
        }
    }
}

/// Case-insensitive name search. Blank text matches nobody; so does an
/// unknown name.
pub fn search_patients(state: &AppState, query: &str) -> Result<Vec<PatientRecordView>, String> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let patients = state
        .store()
        .find_patients_by_name(query)
        .map_err(|e| e.to_string())?;
    tracing::debug!(matches = patients.len(), "Patient search");

    patients
        .iter()
        .map(|p| {
            state
                .store()
                .get_patient_records(p.id)
                .map(PatientRecordView::from)
                .map_err(|e| e.to_string())
        })
        .collect()
}

pub fn get_patient_records(state: &AppState, patient_id: i64) -> Result<PatientRecordView, String> {
    state
        .store()
        .get_patient_records(patient_id)
        .map(PatientRecordView::from)
        .map_err(|e| e.to_string())
}

/// Write a fresh report from the patient's latest stored assessments.
pub fn regenerate_report(state: &AppState, patient_id: i64) -> Result<PathBuf, String> {
    let records = state
        .store()
        .get_patient_records(patient_id)
        .map_err(|e| e.to_string())?;
    state
        .reports()
        .regenerate_latest(&records)
        .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_state::tests::stub_state;
    use crate::models::{DiabetesFeatures, DiabetesRisk, UlcerFinding};

    fn features() -> DiabetesFeatures {
        DiabetesFeatures {
            pregnancies: 1,
            glucose: 95.0,
            blood_pressure: 70.0,
            skin_thickness: 20.0,
            insulin: 79.0,
            bmi: 22.5,
            diabetes_pedigree: 0.3,
        }
    }

    #[test]
    fn search_returns_history_per_match() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        let store = state.store();
        let id = store.add_patient("Jane Doe", 34, Gender::Female).unwrap();
        store
            .add_diabetes_record(id, &features(), DiabetesRisk::Low, 91.3)
            .unwrap();
        store
            .add_ulcer_record(id, "/gone/foot.png", UlcerFinding::Normal, 80.0)
            .unwrap();
        store.add_patient("John Smith", 60, Gender::Male).unwrap();

        let results = search_patients(&state, "doe").unwrap();
        assert_eq!(results.len(), 1);
        let jane = &results[0];
        assert_eq!(jane.diabetes_records[0].risk, "Low");
        assert_eq!(jane.diabetes_records[0].confidence, "91.3%");
        assert_eq!(jane.ulcer_records[0].result, "Normal");
        assert!(!jane.ulcer_records[0].image_available);
    }

    #[test]
    fn unknown_name_is_empty_not_error() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        state.store().add_patient("Jane Doe", 34, Gender::Female).unwrap();
        assert!(search_patients(&state, "zzz").unwrap().is_empty());
    }

    #[test]
    fn blank_query_matches_nobody() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        state.store().add_patient("Jane Doe", 34, Gender::Female).unwrap();
        assert!(search_patients(&state, "   ").unwrap().is_empty());
    }

    #[test]
    fn unknown_patient_id_is_error() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        assert!(get_patient_records(&state, 404).is_err());
        assert!(regenerate_report(&state, 404).is_err());
    }

    #[test]
    fn regenerate_writes_new_report() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        let id = state
            .store()
            .add_patient("Jane Doe", 34, Gender::Female)
            .unwrap();
        state
            .store()
            .add_diabetes_record(id, &features(), DiabetesRisk::Low, 91.3)
            .unwrap();

        let path = regenerate_report(&state, id).unwrap();
        assert!(path.exists());
        assert!(path.starts_with(state.reports().output_dir()));
    }
}
