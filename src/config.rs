use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Application-level constants
pub const APP_NAME: &str = "DiaCare";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default square input size of the ulcer image model.
pub const DEFAULT_IMAGE_INPUT_SIZE: u32 = 128;
/// Ulcer scores strictly above this are reported as ulcers.
pub const DEFAULT_ULCER_THRESHOLD: f64 = 0.5;

/// Get the application data directory
/// ~/DiaCare/ on all platforms, or the working directory if no home exists.
pub fn app_data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
}

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "info,diacare_lib=debug"
}

/// Where everything lives on disk, plus the two model tunables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    pub database_path: PathBuf,
    pub reports_dir: PathBuf,
    /// Staged ulcer uploads. Ulcer records point into this directory.
    pub uploads_dir: PathBuf,
    pub diabetes_model_path: PathBuf,
    pub ulcer_model_path: PathBuf,
    #[serde(default = "default_image_input_size")]
    pub image_input_size: u32,
    #[serde(default = "default_ulcer_threshold")]
    pub ulcer_threshold: f64,
}

fn default_image_input_size() -> u32 {
    DEFAULT_IMAGE_INPUT_SIZE
}

fn default_ulcer_threshold() -> f64 {
    DEFAULT_ULCER_THRESHOLD
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::for_data_dir(app_data_dir())
    }
}

impl AppConfig {
    /// Standard layout under a single data directory.
    pub fn for_data_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            database_path: dir.join("diacare.sqlite3"),
            reports_dir: dir.join("reports"),
            uploads_dir: dir.join("temp"),
            diabetes_model_path: dir.join("model").join("diabetes_model.json"),
            ulcer_model_path: dir.join("model").join("foot_ulcer_model.onnx"),
            image_input_size: DEFAULT_IMAGE_INPUT_SIZE,
            ulcer_threshold: DEFAULT_ULCER_THRESHOLD,
        }
    }

    /// Layout from `DIACARE_HOME` (or [`app_data_dir`]) with per-path
    /// environment overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var_os(key).map(PathBuf::from))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<PathBuf>) -> Self {
        let home = lookup("DIACARE_HOME").unwrap_or_else(app_data_dir);
        let mut config = Self::for_data_dir(home);

        let overrides: [(&str, &mut PathBuf); 5] = [
            ("DIACARE_DB", &mut config.database_path),
            ("DIACARE_REPORTS_DIR", &mut config.reports_dir),
            ("DIACARE_UPLOADS_DIR", &mut config.uploads_dir),
            ("DIACARE_DIABETES_MODEL", &mut config.diabetes_model_path),
            ("DIACARE_ULCER_MODEL", &mut config.ulcer_model_path),
        ];
        for (key, slot) in overrides {
            if let Some(path) = lookup(key) {
                *slot = path;
            }
        }
        config
    }

    /// Reject tunables the ulcer model cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.image_input_size == 0 {
            return Err("image_input_size must be greater than 0".into());
        }
        if !(self.ulcer_threshold.is_finite()
            && self.ulcer_threshold > 0.0
            && self.ulcer_threshold < 1.0)
        {
            return Err(format!(
                "ulcer_threshold must lie strictly between 0 and 1, got {}",
                self.ulcer_threshold
            ));
        }
        Ok(())
    }

    /// Read a JSON config file. Omitted tunables take their defaults.
    pub fn load(path: &Path) -> Result<Self, std::io::Error> {
        let bytes = std::fs::read(path)?;
        serde_json::from_slice(&bytes)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))
    }
}
