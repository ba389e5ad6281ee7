//! Uploaded images are written to the uploads directory before prediction.
//!
//! The staged file is what ulcer records point at, so it outlives the
//! assessment unless prediction fails.

use std::path::{Path, PathBuf};

use chrono::Local;
use uuid::Uuid;

/// Write `bytes` under `uploads_dir` as
/// `{YYYYMMDD_HHMMSS}_{8 hex}_{sanitized original name}`.
pub fn stage_upload(
    uploads_dir: &Path,
    original_name: &str,
    bytes: &[u8],
) -> Result<PathBuf, std::io::Error> {
    std::fs::create_dir_all(uploads_dir)?;

    let token = Uuid::new_v4().simple().to_string();
    let file_name = format!(
        "{}_{}_{}",
        Local::now().format("%Y%m%d_%H%M%S"),
        &token[..8],
        sanitize_file_name(original_name)
    );
    let path = uploads_dir.join(file_name);
    std::fs::write(&path, bytes)?;

    tracing::debug!(path = %path.display(), size = bytes.len(), "Upload staged");
    Ok(path)
}

/// Remove a staged upload. Already gone counts as removed.
pub fn remove_staged(path: &Path) -> Result<(), std::io::Error> {
    match std::fs::remove_file(path) {
        Err(e) if e.kind() != std::io::ErrorKind::NotFound => Err(e),
        _ => Ok(()),
    }
}

/// Keep only the final path component, restricted to `[A-Za-z0-9._-]`.
fn sanitize_file_name(name: &str) -> String {
    let base = Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("");
    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.').to_string();
    if cleaned.is_empty() {
        "upload".to_string()
    } else {
        cleaned
    }
}
