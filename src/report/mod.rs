//! Report Composer: assessment outcomes rendered to PDF files on disk.

pub mod composer;
pub mod document;
pub mod pdf;

use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;

pub use composer::{compose_report, ReportComposer};
pub use document::{Block, ReportDocument, TableRow};
pub use pdf::render_pdf;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF generation failed: {0}")]
    Pdf(String),
}

/// A previously generated report file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportFile {
    pub file_name: String,
    pub path: PathBuf,
    pub size_bytes: u64,
}

/// PDF reports in `dir`, newest first.
///
/// Report names end in a sortable timestamp, so descending name order puts
/// the latest report per patient first. A missing directory means no reports
/// have been generated yet.
pub fn list_reports(dir: &Path) -> Result<Vec<ReportFile>, ReportError> {
    if !dir.exists() {
        return Ok(Vec::new());
    }

    let mut reports = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let is_pdf = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e == "pdf");
        if !is_pdf || !path.is_file() {
            continue;
        }
        reports.push(ReportFile {
            file_name: entry.file_name().to_string_lossy().into_owned(),
            size_bytes: entry.metadata()?.len(),
            path,
        });
    }
    reports.sort_by(|a, b| b.file_name.cmp(&a.file_name));
    Ok(reports)
}
