use rusqlite::Connection;

use super::{
    count_diabetes_records, count_patients, count_ulcer_records, get_diabetes_records,
    get_patient, get_ulcer_records,
};
use crate::db::DatabaseError;
use crate::models::{PatientRecords, StoreSummary};

/// A patient together with every diabetes and ulcer assessment on file.
pub fn get_patient_records(
    conn: &Connection,
    patient_id: i64,
) -> Result<PatientRecords, DatabaseError> {
    let patient = get_patient(conn, patient_id)?.ok_or_else(|| DatabaseError::NotFound {
        entity_type: "patient".into(),
        id: patient_id.to_string(),
    })?;

    Ok(PatientRecords {
        diabetes_records: get_diabetes_records(conn, patient_id)?,
        ulcer_records: get_ulcer_records(conn, patient_id)?,
        patient,
    })
}

pub fn get_store_summary(conn: &Connection) -> Result<StoreSummary, DatabaseError> {
    Ok(StoreSummary {
        patients: count_patients(conn)?,
        diabetes_records: count_diabetes_records(conn)?,
        ulcer_records: count_ulcer_records(conn)?,
    })
}
