use std::str::FromStr;

use chrono::NaiveDateTime;
use rusqlite::{params, Connection};

use super::{format_timestamp, parse_timestamp};
use crate::db::DatabaseError;
use crate::models::*;

/// Insert a patient row. Returns the auto-assigned patient id.
pub fn insert_patient(
    conn: &Connection,
    patient: &NewPatient,
    created_at: &NaiveDateTime,
) -> Result<i64, DatabaseError> {
    conn.execute(
        "INSERT INTO patients (name, age, gender, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![
            patient.name,
            patient.age,
            patient.gender.as_str(),
            format_timestamp(created_at),
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_patient(conn: &Connection, id: i64) -> Result<Option<Patient>, DatabaseError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, created_at FROM patients WHERE id = ?1",
    )?;
    let mut rows = stmt.query_map(params![id], row_to_patient)?;
    match rows.next() {
        Some(row) => Ok(Some(row?)),
        None => Ok(None),
    }
}

/// Case-insensitive substring match on patient name, in insertion order.
///
/// `%` and `_` in the query are matched literally. SQLite's LIKE folds case
/// for ASCII letters only.
pub fn find_patients_by_name(
    conn: &Connection,
    substring: &str,
) -> Result<Vec<Patient>, DatabaseError> {
    let pattern = format!("%{}%", escape_like(substring));
    let mut stmt = conn.prepare(
        "SELECT id, name, age, gender, created_at
         FROM patients
         WHERE name LIKE ?1 ESCAPE '\\'
         ORDER BY id ASC",
    )?;
    let rows = stmt.query_map(params![pattern], row_to_patient)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(DatabaseError::from)
}

pub fn count_patients(conn: &Connection) -> Result<i64, DatabaseError> {
    let count = conn.query_row("SELECT COUNT(*) FROM patients", [], |row| row.get(0))?;
    Ok(count)
}

fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn row_to_patient(row: &rusqlite::Row) -> Result<Patient, rusqlite::Error> {
    let gender_str: String = row.get(3)?;
    let created_str: String = row.get(4)?;

    Ok(Patient {
        id: row.get(0)?,
        name: row.get(1)?,
        age: row.get(2)?,
        gender: Gender::from_str(&gender_str).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?,
        created_at: parse_timestamp(&created_str),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::sqlite::open_memory_database;

    fn test_db() -> Connection {
        open_memory_database().unwrap()
    }

    fn new_patient(name: &str, age: i64, gender: Gender) -> NewPatient {
        NewPatient {
            name: name.into(),
            age,
            gender,
        }
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2026-03-02 09:15:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn insert_and_retrieve_patient() {
        let conn = test_db();
        let id = insert_patient(&conn, &new_patient("Jane Doe", 34, Gender::Female), &now())
            .unwrap();

        let patient = get_patient(&conn, id).unwrap().unwrap();
        assert_eq!(patient.id, id);
        assert_eq!(patient.name, "Jane Doe");
        assert_eq!(patient.age, 34);
        assert_eq!(patient.gender, Gender::Female);
        assert_eq!(patient.created_at, now());
    }

    #[test]
    fn ids_are_assigned_sequentially() {
        let conn = test_db();
        let a = insert_patient(&conn, &new_patient("A", 30, Gender::Male), &now()).unwrap();
        let b = insert_patient(&conn, &new_patient("B", 31, Gender::Other), &now()).unwrap();
        assert!(b > a);
    }

    #[test]
    fn same_name_creates_distinct_rows() {
        let conn = test_db();
        let first = insert_patient(&conn, &new_patient("Sam Lee", 50, Gender::Male), &now())
            .unwrap();
        let second = insert_patient(&conn, &new_patient("Sam Lee", 50, Gender::Male), &now())
            .unwrap();
        assert_ne!(first, second);
        assert_eq!(count_patients(&conn).unwrap(), 2);
    }

    #[test]
    fn missing_patient_is_none() {
        let conn = test_db();
        assert!(get_patient(&conn, 42).unwrap().is_none());
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let conn = test_db();
        insert_patient(&conn, &new_patient("Jane Doe", 34, Gender::Female), &now()).unwrap();
        insert_patient(&conn, &new_patient("John Doe", 40, Gender::Male), &now()).unwrap();
        insert_patient(&conn, &new_patient("Amara Obi", 29, Gender::Female), &now()).unwrap();

        let does = find_patients_by_name(&conn, "DOE").unwrap();
        assert_eq!(does.len(), 2);
        assert_eq!(does[0].name, "Jane Doe");
        assert_eq!(does[1].name, "John Doe");

        let janes = find_patients_by_name(&conn, "ane d").unwrap();
        assert_eq!(janes.len(), 1);
    }

    #[test]
    fn search_without_match_is_empty_not_error() {
        let conn = test_db();
        insert_patient(&conn, &new_patient("Jane Doe", 34, Gender::Female), &now()).unwrap();
        let results = find_patients_by_name(&conn, "zzz").unwrap();
        assert!(results.is_empty());
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let conn = test_db();
        insert_patient(&conn, &new_patient("Jane Doe", 34, Gender::Female), &now()).unwrap();
        insert_patient(&conn, &new_patient("100% Match", 34, Gender::Other), &now()).unwrap();

        assert!(find_patients_by_name(&conn, "_").unwrap().is_empty());
        let percent = find_patients_by_name(&conn, "%").unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% Match");
    }

    #[test]
    fn corrupt_gender_surfaces_as_error() {
        let conn = test_db();
        conn.execute(
            "INSERT INTO patients (name, age, gender) VALUES ('X', 30, 'unknown')",
            [],
        )
        .unwrap();
        assert!(find_patients_by_name(&conn, "X").is_err());
    }
}
