use std::path::{Path, PathBuf};

use chrono::{Local, NaiveDateTime};
use tracing::{info, warn};

use super::document::{Block, ReportDocument, TableRow};
use super::pdf::render_pdf;
use super::ReportError;
use crate::models::{DiabetesRecord, Patient, PatientRecords, UlcerRecord};

pub const REPORT_TITLE: &str = "DiaCare AI Medical Report";
pub const DISCLAIMER: &str = "This report was generated automatically by DiaCare AI system. \
Please consult with a healthcare professional for proper medical advice.";

const IMAGE_WIDTH_IN: f32 = 4.0;
const IMAGE_HEIGHT_IN: f32 = 3.0;

/// Writes one PDF per call into `output_dir`.
#[derive(Debug, Clone)]
pub struct ReportComposer {
    output_dir: PathBuf,
}

impl ReportComposer {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Render and write a report stamped with the current local time.
    pub fn generate_report(
        &self,
        patient: &Patient,
        diabetes: Option<&DiabetesRecord>,
        ulcer: Option<&UlcerRecord>,
    ) -> Result<PathBuf, ReportError> {
        self.generate_report_at(patient, diabetes, ulcer, Local::now().naive_local())
    }

    /// Render and write a report stamped with `generated_at`.
    ///
    /// Two reports for the same name within the same second land on the same
    /// file name; the later one wins.
    pub fn generate_report_at(
        &self,
        patient: &Patient,
        diabetes: Option<&DiabetesRecord>,
        ulcer: Option<&UlcerRecord>,
        generated_at: NaiveDateTime,
    ) -> Result<PathBuf, ReportError> {
        let document = compose_report(patient, diabetes, ulcer, generated_at);
        let rendered = render_pdf(&document)?;

        std::fs::create_dir_all(&self.output_dir)?;
        let path = self
            .output_dir
            .join(report_file_name(&patient.name, &generated_at));
        std::fs::write(&path, &rendered.bytes)?;

        info!(
            patient_id = patient.id,
            path = %path.display(),
            pages = rendered.pages,
            "Report written"
        );
        Ok(path)
    }

    /// Re-render a report from the patient's most recent stored records.
    pub fn regenerate_latest(&self, records: &PatientRecords) -> Result<PathBuf, ReportError> {
        self.generate_report(
            &records.patient,
            records.diabetes_records.last(),
            records.ulcer_records.last(),
        )
    }
}

/// Build the report content. Sections without a result are left out.
///
/// A referenced ulcer image that no longer exists is dropped from the
/// document; the result table is still included.
pub fn compose_report(
    patient: &Patient,
    diabetes: Option<&DiabetesRecord>,
    ulcer: Option<&UlcerRecord>,
    generated_at: NaiveDateTime,
) -> ReportDocument {
    let mut doc = ReportDocument::new(REPORT_TITLE);
    doc.push(Block::Title(REPORT_TITLE.into()));
    doc.push(Block::Spacer(12.0));

    doc.push(Block::Heading("Patient Information".into()));
    doc.push(Block::Table(vec![
        TableRow::new("Name:", patient.name.as_str()),
        TableRow::new("Age:", patient.age.to_string()),
        TableRow::new("Gender:", patient.gender.as_str()),
        TableRow::new("Date:", generated_at.format("%Y-%m-%d %H:%M:%S").to_string()),
    ]));
    doc.push(Block::Spacer(20.0));

    if let Some(record) = diabetes {
        doc.push(Block::Heading("Diabetes Risk Assessment".into()));
        doc.push(Block::Table(vec![
            TableRow::new("Risk Level:", record.prediction.label()),
            TableRow::new("Confidence:", format_percent(record.probability)),
            TableRow::new("Glucose Level:", format_measure(record.features.glucose)),
            TableRow::new("BMI:", format_measure(record.features.bmi)),
            TableRow::new(
                "Blood Pressure:",
                format_measure(record.features.blood_pressure),
            ),
        ]));
        doc.push(Block::Spacer(20.0));
    }

    if let Some(record) = ulcer {
        doc.push(Block::Heading("Foot Ulcer Detection".into()));
        let image_path = Path::new(&record.image_path);
        if image_path.is_file() {
            doc.push(Block::Image {
                path: image_path.to_path_buf(),
                width_in: IMAGE_WIDTH_IN,
                height_in: IMAGE_HEIGHT_IN,
            });
            doc.push(Block::Spacer(12.0));
        } else {
            warn!(
                record_id = record.id,
                path = %record.image_path,
                "Ulcer image missing, omitting from report"
            );
        }
        doc.push(Block::Table(vec![
            TableRow::new("Detection Result:", record.prediction.as_str()),
            TableRow::new("Confidence:", format_percent(record.probability)),
        ]));
    }

    doc.push(Block::Spacer(30.0));
    doc.push(Block::Note(DISCLAIMER.into()));
    doc
}

/// `{sanitized name}_Report_{YYYYMMDD_HHMMSS}.pdf`
pub fn report_file_name(patient_name: &str, generated_at: &NaiveDateTime) -> String {
    format!(
        "{}_Report_{}.pdf",
        sanitize_name(patient_name),
        generated_at.format("%Y%m%d_%H%M%S")
    )
}

/// Spaces become underscores; anything outside `[A-Za-z0-9_-]` is dropped
/// so a name can never escape the reports directory.
fn sanitize_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| if c == ' ' { '_' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
        .collect();
    let cleaned = cleaned.trim_matches('_');
    if cleaned.is_empty() {
        "patient".to_string()
    } else {
        cleaned.to_string()
    }
}

fn format_percent(probability: f64) -> String {
    format!("{probability:.1}%")
}

/// Whole values keep one decimal place ("180.0"), others print as entered.
fn format_measure(value: f64) -> String {
    if value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{DiabetesFeatures, DiabetesRisk, Gender, UlcerFinding};
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 10, 16)
            .unwrap()
            .and_hms_opt(14, 3, 59)
            .unwrap()
    }

    fn jane() -> Patient {
        Patient {
            id: 1,
            name: "Jane Doe".into(),
            age: 34,
            gender: Gender::Female,
            created_at: at(),
        }
    }

    fn diabetes_record() -> DiabetesRecord {
        DiabetesRecord {
            id: 1,
            patient_id: 1,
            features: DiabetesFeatures {
                pregnancies: 2,
                glucose: 180.0,
                blood_pressure: 90.0,
                skin_thickness: 30.0,
                insulin: 100.0,
                bmi: 35.0,
                diabetes_pedigree: 0.8,
            },
            prediction: DiabetesRisk::High,
            probability: 82.0,
            created_at: at(),
        }
    }

    fn ulcer_record(image_path: &str) -> UlcerRecord {
        UlcerRecord {
            id: 1,
            patient_id: 1,
            image_path: image_path.into(),
            prediction: UlcerFinding::UlcerDetected,
            probability: 73.0,
            created_at: at(),
        }
    }

    #[test]
    fn diabetes_report_carries_risk_and_confidence() {
        let doc = compose_report(&jane(), Some(&diabetes_record()), None, at());
        assert_eq!(doc.table_value("Risk Level:"), Some("High"));
        assert_eq!(doc.table_value("Confidence:"), Some("82.0%"));
        assert_eq!(doc.table_value("Glucose Level:"), Some("180.0"));
        assert_eq!(doc.table_value("Date:"), Some("2026-10-16 14:03:59"));
        assert_eq!(
            doc.headings(),
            vec!["Patient Information", "Diabetes Risk Assessment"]
        );
        assert!(doc.contains_text(DISCLAIMER));
    }

    #[test]
    fn missing_image_is_omitted_but_table_remains() {
        let doc = compose_report(
            &jane(),
            None,
            Some(&ulcer_record("/definitely/not/here.png")),
            at(),
        );
        assert!(!doc.has_image());
        assert_eq!(doc.table_value("Detection Result:"), Some("Ulcer Detected"));
        assert_eq!(doc.table_value("Confidence:"), Some("73.0%"));
        assert!(doc.headings().contains(&"Foot Ulcer Detection"));
    }

    #[test]
    fn existing_image_is_embedded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foot.png");
        image::RgbImage::from_pixel(40, 30, image::Rgb([190, 140, 110]))
            .save(&path)
            .unwrap();

        let record = ulcer_record(path.to_str().unwrap());
        let doc = compose_report(&jane(), None, Some(&record), at());
        assert!(doc.has_image());
    }

    #[test]
    fn sections_without_results_are_absent() {
        let doc = compose_report(&jane(), None, None, at());
        assert_eq!(doc.headings(), vec!["Patient Information"]);
        assert_eq!(doc.table_value("Name:"), Some("Jane Doe"));
    }

    #[test]
    fn writes_named_pdf_into_new_directory() {
        let dir = tempfile::tempdir().unwrap();
        let composer = ReportComposer::new(dir.path().join("reports"));
        let path = composer
            .generate_report_at(&jane(), Some(&diabetes_record()), None, at())
            .unwrap();

        assert_eq!(
            path.file_name().unwrap().to_str().unwrap(),
            "Jane_Doe_Report_20261016_140359.pdf"
        );
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn regenerate_uses_latest_records() {
        let dir = tempfile::tempdir().unwrap();
        let composer = ReportComposer::new(dir.path());
        let mut older = diabetes_record();
        older.prediction = DiabetesRisk::Low;
        let records = PatientRecords {
            patient: jane(),
            diabetes_records: vec![older, diabetes_record()],
            ulcer_records: Vec::new(),
        };
        let path = composer.regenerate_latest(&records).unwrap();
        assert!(path.starts_with(dir.path()));
        assert!(path.exists());
    }

    #[test]
    fn names_are_sanitized() {
        assert_eq!(sanitize_name("Jane Doe"), "Jane_Doe");
        assert_eq!(sanitize_name("../../etc/passwd"), "etcpasswd");
        assert_eq!(sanitize_name("  "), "patient");
        assert_eq!(sanitize_name("Zoë O'Neil"), "Zo_ONeil");
    }

    #[test]
    fn dropped_characters_leave_no_edge_underscores() {
        assert_eq!(sanitize_name("李明 Zoë"), "Zo");
        assert_eq!(sanitize_name("Ama 李"), "Ama");
        assert_eq!(sanitize_name("李 明"), "patient");
        assert_eq!(report_file_name("李明 Zoë", &at()), "Zo_Report_20261016_140359.pdf");
    }

    #[test]
    fn measures_format_like_entered_numbers() {
        assert_eq!(format_measure(180.0), "180.0");
        assert_eq!(format_measure(33.6), "33.6");
        assert_eq!(format_percent(82.0), "82.0%");
    }
}
