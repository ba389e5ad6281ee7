//! Application state shared by every command.
//!
//! Built once at startup by [`bootstrap`] and handed to the command layer
//! by reference. There is no global handle.

use thiserror::Error;

use crate::assessment::AssessmentController;
use crate::config::AppConfig;
use crate::db::{DatabaseError, PatientStore};
use crate::prediction::{
    load_image_classifier, DiabetesPredictor, ImageClassifier, PredictionError,
    RandomForestModel, TabularClassifier, UlcerPredictor,
};
use crate::report::ReportComposer;

/// Anything that stops the application from starting. All fatal.
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Failed to load model: {0}")]
    ModelLoad(#[from] PredictionError),

    #[error("Failed to open patient store: {0}")]
    Database(#[from] DatabaseError),

    #[error("Failed to prepare data directories: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

pub struct AppState {
    pub config: AppConfig,
    pub controller: AssessmentController,
}

impl AppState {
    /// Assemble state around already-constructed classifiers.
    pub fn with_classifiers(
        config: AppConfig,
        tabular: Box<dyn TabularClassifier>,
        image: Box<dyn ImageClassifier>,
    ) -> Result<Self, StartupError> {
        config.validate().map_err(StartupError::InvalidConfig)?;
        prepare_dirs(&config)?;
        let store = PatientStore::open(&config.database_path)?;

        let controller = AssessmentController::new(
            store,
            DiabetesPredictor::new(tabular),
            UlcerPredictor::new(image, config.image_input_size, config.ulcer_threshold),
            ReportComposer::new(&config.reports_dir),
            &config.uploads_dir,
        );
        Ok(Self { config, controller })
    }

    pub fn store(&self) -> &PatientStore {
        self.controller.store()
    }

    pub fn reports(&self) -> &ReportComposer {
        self.controller.reports()
    }
}

/// Create directories, migrate the store, and load both models.
///
/// A missing or malformed model artifact fails here rather than on the
/// first request.
pub fn bootstrap(config: AppConfig) -> Result<AppState, StartupError> {
    tracing::info!("{} starting v{}", crate::config::APP_NAME, crate::config::APP_VERSION);

    let tabular = RandomForestModel::load(&config.diabetes_model_path)?;
    let image = load_image_classifier(&config.ulcer_model_path)?;

    let state = AppState::with_classifiers(config, Box::new(tabular), image)?;
    tracing::info!(
        db = %state.config.database_path.display(),
        reports = %state.config.reports_dir.display(),
        "Startup complete"
    );
    Ok(state)
}

fn prepare_dirs(config: &AppConfig) -> Result<(), std::io::Error> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    std::fs::create_dir_all(&config.reports_dir)?;
    std::fs::create_dir_all(&config.uploads_dir)?;
    Ok(())
}
