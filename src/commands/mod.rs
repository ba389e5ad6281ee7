//! Command layer: one module per view.
//!
//! Commands take the shared [`AppState`] by reference and return
//! serializable view models, with errors flattened to display strings.

pub mod diabetes;
pub mod home;
pub mod records;
pub mod reports;
pub mod ulcer;

use crate::core_state::AppState;

/// Health check, verifies the store answers.
pub fn health_check(state: &AppState) -> Result<String, String> {
    tracing::debug!("Health check called");
    state.store().summary().map_err(|e| e.to_string())?;
    Ok("ok".to_string())
}

/// Confidence as shown everywhere in the UI.
pub(crate) fn format_confidence(probability: f64) -> String {
    format!("{probability:.1}%")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_state::tests::stub_state;

    #[test]
    fn health_check_ok() {
        let (_dir, state) = stub_state(vec![0.5, 0.5], 0.1);
        assert_eq!(health_check(&state).unwrap(), "ok");
    }

    #[test]
    fn confidence_has_one_decimal() {
        assert_eq!(format_confidence(82.0), "82.0%");
        assert_eq!(format_confidence(79.99999), "80.0%");
    }
}
