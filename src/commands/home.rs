//! Home view: application identity and store totals.

use serde::Serialize;

use crate::config::{APP_NAME, APP_VERSION};
use crate::core_state::AppState;
use crate::models::StoreSummary;
use crate::report::list_reports;

#[derive(Debug, Clone, Serialize)]
pub struct HomeData {
    pub app_name: &'static str,
    pub version: &'static str,
    pub modules: Vec<&'static str>,
    pub summary: StoreSummary,
    pub report_count: usize,
}

pub fn get_home_data(state: &AppState) -> Result<HomeData, String> {
    let summary = state.store().summary().map_err(|e| e.to_string())?;
    let report_count = list_reports(state.reports().output_dir())
        .map_err(|e| e.to_string())?
        .len();

    Ok(HomeData {
        app_name: APP_NAME,
        version: APP_VERSION,
        modules: vec![
            "Diabetes Risk Assessment",
            "Foot Ulcer Detection",
            "Patient Records",
            "Report Manager",
        ],
        summary,
        report_count,
    })
}
