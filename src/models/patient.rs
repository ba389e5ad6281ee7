use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::Gender;
use super::{DiabetesRecord, UlcerRecord};

/// Identity record. One row per assessment session; never merged by name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Patient {
    pub id: i64,
    pub name: String,
    pub age: i64,
    pub gender: Gender,
    pub created_at: NaiveDateTime,
}

/// Fields supplied when registering a patient.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPatient {
    pub name: String,
    pub age: i64,
    pub gender: Gender,
}

/// A patient with their full assessment history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatientRecords {
    pub patient: Patient,
    pub diabetes_records: Vec<DiabetesRecord>,
    pub ulcer_records: Vec<UlcerRecord>,
}

/// Row counts shown on the home view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreSummary {
    pub patients: i64,
    pub diabetes_records: i64,
    pub ulcer_records: i64,
}
