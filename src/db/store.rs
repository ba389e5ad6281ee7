//! Patient Store: durable record of patients and their assessments.
//!
//! Explicitly constructed and passed to whoever needs it; there is no
//! process-wide handle. Every operation opens its own connection and closes
//! it on return. Concurrent writers are serialized by SQLite's file lock only.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime, Timelike};
use rusqlite::Connection;

use super::repository;
use super::sqlite::{open_connection, open_database};
use super::DatabaseError;
use crate::models::*;

/// A freshly persisted assessment: the new patient row and its record.
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedAssessment<R> {
    pub patient: Patient,
    pub record: R,
}

#[derive(Debug, Clone)]
pub struct PatientStore {
    db_path: PathBuf,
}

impl PatientStore {
    /// Open (or create) the store at `db_path`, creating tables if absent.
    ///
    /// The parent directory must already exist.
    pub fn open(db_path: impl Into<PathBuf>) -> Result<Self, DatabaseError> {
        let db_path = db_path.into();
        // Schema setup happens once; the connection is dropped straight away.
        open_database(&db_path)?;
        tracing::info!(path = %db_path.display(), "Patient store ready");
        Ok(Self { db_path })
    }

    fn connect(&self) -> Result<Connection, DatabaseError> {
        open_connection(&self.db_path)
    }

    /// Single-row insert. Every call creates a new patient, even for a
    /// returning name.
    pub fn add_patient(&self, name: &str, age: i64, gender: Gender) -> Result<i64, DatabaseError> {
        let conn = self.connect()?;
        let patient = NewPatient {
            name: name.to_string(),
            age,
            gender,
        };
        repository::insert_patient(&conn, &patient, &now())
    }

    pub fn add_diabetes_record(
        &self,
        patient_id: i64,
        features: &DiabetesFeatures,
        prediction: DiabetesRisk,
        probability: f64,
    ) -> Result<i64, DatabaseError> {
        let conn = self.connect()?;
        repository::insert_diabetes_record(
            &conn,
            patient_id,
            features,
            prediction,
            probability,
            &now(),
        )
    }

    pub fn add_ulcer_record(
        &self,
        patient_id: i64,
        image_path: &str,
        prediction: UlcerFinding,
        probability: f64,
    ) -> Result<i64, DatabaseError> {
        let conn = self.connect()?;
        repository::insert_ulcer_record(
            &conn,
            patient_id,
            image_path,
            prediction,
            probability,
            &now(),
        )
    }

    pub fn get_patient_records(&self, patient_id: i64) -> Result<PatientRecords, DatabaseError> {
        let conn = self.connect()?;
        repository::get_patient_records(&conn, patient_id)
    }

    /// Case-insensitive substring search. No match is an empty list.
    pub fn find_patients_by_name(&self, substring: &str) -> Result<Vec<Patient>, DatabaseError> {
        let conn = self.connect()?;
        repository::find_patients_by_name(&conn, substring)
    }

    pub fn summary(&self) -> Result<StoreSummary, DatabaseError> {
        let conn = self.connect()?;
        repository::get_store_summary(&conn)
    }

    /// Insert the patient and its diabetes record in one transaction.
    ///
    /// Either both rows land or neither does, so a failed record insert
    /// never leaves an orphaned patient behind.
    pub fn record_diabetes_assessment(
        &self,
        patient: &NewPatient,
        features: &DiabetesFeatures,
        prediction: DiabetesRisk,
        probability: f64,
    ) -> Result<RecordedAssessment<DiabetesRecord>, DatabaseError> {
        let mut conn = self.connect()?;
        let created_at = now();
        let tx = conn.transaction()?;

        let patient_id = repository::insert_patient(&tx, patient, &created_at)?;
        let record_id = repository::insert_diabetes_record(
            &tx,
            patient_id,
            features,
            prediction,
            probability,
            &created_at,
        )?;
        tx.commit()?;

        Ok(RecordedAssessment {
            patient: stored_patient(patient_id, patient, created_at),
            record: DiabetesRecord {
                id: record_id,
                patient_id,
                features: *features,
                prediction,
                probability,
                created_at,
            },
        })
    }

    /// Insert the patient and its ulcer record in one transaction.
    pub fn record_ulcer_assessment(
        &self,
        patient: &NewPatient,
        image_path: &str,
        prediction: UlcerFinding,
        probability: f64,
    ) -> Result<RecordedAssessment<UlcerRecord>, DatabaseError> {
        let mut conn = self.connect()?;
        let created_at = now();
        let tx = conn.transaction()?;

        let patient_id = repository::insert_patient(&tx, patient, &created_at)?;
        let record_id = repository::insert_ulcer_record(
            &tx,
            patient_id,
            image_path,
            prediction,
            probability,
            &created_at,
        )?;
        tx.commit()?;

        Ok(RecordedAssessment {
            patient: stored_patient(patient_id, patient, created_at),
            record: UlcerRecord {
                id: record_id,
                patient_id,
                image_path: image_path.to_string(),
                prediction,
                probability,
                created_at,
            },
        })
    }
}

fn stored_patient(id: i64, patient: &NewPatient, created_at: NaiveDateTime) -> Patient {
    Patient {
        id,
        name: patient.name.clone(),
        age: patient.age,
        gender: patient.gender,
        created_at,
    }
}

/// Current local time truncated to the second, matching the stored layout.
fn now() -> NaiveDateTime {
    let now = Local::now().naive_local();
    now.with_nanosecond(0).unwrap_or(now)
}
