pub mod assessment;
pub mod commands;
pub mod config;
pub mod core_state;
pub mod db;
pub mod models;
pub mod prediction;
pub mod report;

use std::path::PathBuf;

use tracing_subscriber::EnvFilter;

pub use core_state::{bootstrap, AppState, StartupError};

/// Install the global subscriber. `RUST_LOG` wins over the default filter.
pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .init();
}

/// Start up against the configured data directory and report its state.
///
/// `DIACARE_CONFIG` names a JSON config file; otherwise the layout comes
/// from the environment.
pub fn run() -> Result<(), StartupError> {
    init_tracing();

    let config = match std::env::var_os("DIACARE_CONFIG") {
        Some(path) => config::AppConfig::load(&PathBuf::from(path))?,
        None => config::AppConfig::from_env(),
    };
    let state = bootstrap(config)?;

    let home = commands::home::get_home_data(&state).map_err(std::io::Error::other)?;
    tracing::info!(
        patients = home.summary.patients,
        diabetes_records = home.summary.diabetes_records,
        ulcer_records = home.summary.ulcer_records,
        reports = home.report_count,
        "{} ready",
        home.app_name
    );
    Ok(())
}
