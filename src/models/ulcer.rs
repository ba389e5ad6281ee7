use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::enums::UlcerFinding;

/// One stored image-based ulcer assessment. Immutable once inserted.
///
/// The store keeps only the path; whoever saved the image owns the file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UlcerRecord {
    pub id: i64,
    pub patient_id: i64,
    pub image_path: String,
    pub prediction: UlcerFinding,
    /// Confidence of the reported finding, 0-100.
    pub probability: f64,
    pub created_at: NaiveDateTime,
}
