//! Report Manager view: previously generated PDFs.

use crate::core_state::AppState;
use crate::report::{list_reports, ReportFile};

pub fn list_generated_reports(state: &AppState) -> Result<Vec<ReportFile>, String> {
    list_reports(state.reports().output_dir()).map_err(|e| e.to_string())
}

/// Bytes of one listed report, for download.
///
/// Only bare file names from [`list_generated_reports`] are accepted.
pub fn read_report(state: &AppState, file_name: &str) -> Result<Vec<u8>, String> {
    let reports = list_generated_reports(state)?;
    let report = reports
        .into_iter()
        .find(|r| r.file_name == file_name)
        .ok_or_else(|| format!("Report not found: {file_name}"))?;
    std::fs::read(&report.path).map_err(|e| format!("Cannot read report: {e}"))
}
