use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert a diabetes assessment. Returns the record id.
pub fn insert_diabetes_record(
    conn: &Connection,
    patient_id: i64,
    features: &DiabetesFeatures,
    prediction: DiabetesRisk,
    probability: f64,
    created_at: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    super::check_probability(probability)?;
    conn.execute(
        "INSERT INTO diabetes_records (patient_id, pregnancies, glucose, blood_pressure,
         skin_thickness, insulin, bmi, diabetes_pedigree, prediction, probability, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        params![
            patient_id,
            features.pregnancies,
            features.glucose,
            features.blood_pressure,
            features.skin_thickness,
            features.insulin,
            features.bmi,
            features.diabetes_pedigree,
            prediction.class_label(),
            probability,
            format_timestamp(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All diabetes assessments for a patient, in insertion order.
pub fn get_diabetes_records(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<DiabetesRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, pregnancies, glucose, blood_pressure, skin_thickness,
         insulin, bmi, diabetes_pedigree, prediction, probability, created_at
         FROM diabetes_records
         WHERE patient_id = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_diabetes_record)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_diabetes_records(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM diabetes_records", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_diabetes_record(row: &rusqlite::Row) -> Result<DiabetesRecord, rusqlite::Error> {
    let prediction: i64 = row.get(9)?;
    let created_str: String = row.get(11)?;

    Ok(DiabetesRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        features: DiabetesFeatures {
            pregnancies: row.get(2)?,
            glucose: row.get(3)?,
            blood_pressure: row.get(4)?,
            skin_thickness: row.get(5)?,
            insulin: row.get(6)?,
            bmi: row.get(7)?,
            diabetes_pedigree: row.get(8)?,
        },
        prediction: DiabetesRisk::from_class_label(prediction).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(9, rusqlite::types::Type::Integer, Box::new(e))
        })?,
        probability: row.get(10)?,
        created_at: parse_timestamp(&created_str),
    })
}
