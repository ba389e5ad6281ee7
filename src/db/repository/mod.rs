//! Repository layer: table-scoped database operations.
//!
//! Free functions over a borrowed `Connection`, one sub-module per table.
//! Connection lifetime and transactions are the caller's concern
//! (see [`super::PatientStore`]).

mod diabetes_record;
mod history;
mod patient;
mod ulcer_record;

use chrono::NaiveDateTime;

use super::DatabaseError;

pub use diabetes_record::*;
pub use history::*;
pub use patient::*;
pub use ulcer_record::*;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

pub(crate) fn format_timestamp(ts: &NaiveDateTime) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

pub(crate) fn parse_timestamp(s: &str) -> NaiveDateTime {
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT).unwrap_or_default()
}

/// Assessment confidence is a percentage.
fn check_probability(probability: f64) -> Result<(), DatabaseError> {
    if probability.is_finite() && (0.0..=100.0).contains(&probability) {
        Ok(())
    } else {
        Err(DatabaseError::ConstraintViolation(format!(
            "probability must be within 0-100, got {probability}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_round_trips_to_the_second() {
        let ts = NaiveDateTime::parse_from_str("2026-10-16 14:03:59", TIMESTAMP_FORMAT).unwrap();
        assert_eq!(parse_timestamp(&format_timestamp(&ts)), ts);
    }

    #[test]
    fn sqlite_default_timestamp_parses() {
        // CURRENT_TIMESTAMP yields the same layout
        let ts = parse_timestamp("2026-01-05 08:00:00");
        assert_eq!(format_timestamp(&ts), "2026-01-05 08:00:00");
    }

    #[test]
    fn probability_bounds() {
        assert!(check_probability(0.0).is_ok());
        assert!(check_probability(100.0).is_ok());
        assert!(check_probability(100.01).is_err());
        assert!(check_probability(f64::NAN).is_err());
    }
}
