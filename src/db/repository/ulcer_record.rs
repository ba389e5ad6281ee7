use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert an ulcer assessment. Returns the record id.
pub fn insert_ulcer_record(
    conn: &Connection,
    patient_id: i64,
    image_path: &str,
    prediction: UlcerFinding,
    probability: f64,
    created_at: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    super::check_probability(probability)?;
    conn.execute(
        "INSERT INTO ulcer_records (patient_id, image_path, prediction, probability, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            patient_id,
            image_path,
            prediction.as_str(),
            probability,
            format_timestamp(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

/// All ulcer assessments for a patient, in insertion order.
pub fn get_ulcer_records(
    conn: &Connection,
    patient_id: i64,
) -> Result<Vec<UlcerRecord>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, patient_id, image_path, prediction, probability, created_at
         FROM ulcer_records
         WHERE patient_id = ?1
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![patient_id], row_to_ulcer_record)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_ulcer_records(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM ulcer_records", [], |row| row.get(0))?;
    Ok(count)
}

fn row_to_ulcer_record(row: &rusqlite::Row) -> Result<UlcerRecord, rusqlite::Error> {
    let prediction_str: String = row.get(3)?;
    let created_str: String = row.get(5)?;

    Ok(UlcerRecord {
        id: row.get(0)?,
        patient_id: row.get(1)?,
        image_path: row.get(2)?,
        prediction: UlcerFinding::from_str(&prediction_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        probability: row.get(4)?,
        created_at: parse_timestamp(&created_str),
    })
}
