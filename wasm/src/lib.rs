//! WebAssembly module for the PestCheck platform
//!
//! Provides client-side computation for the browser shell:
//! - severity mapping for the heat-map report flow
//! - coordinate and form validation before a payload is built
//! - inference-result screening for the confirm panel

use rust_decimal::Decimal;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    // Set up panic hook for better error messages in browser console
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Map the farmer-facing 0-5 damage level to the backend severity string
#[wasm_bindgen]
pub fn map_report_level(level: u8) -> Result<String, JsValue> {
    Severity::from_report_level(level)
        .map(|severity| severity.as_str().to_string())
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Validate a coordinate pair before it goes into a report payload
#[wasm_bindgen]
pub fn validate_report_coordinates(latitude: f64, longitude: f64) -> bool {
    let (Ok(lat), Ok(lng)) = (Decimal::try_from(latitude), Decimal::try_from(longitude)) else {
        return false;
    };
    validate_coordinates(lat, lng).is_ok()
}

/// Whether an inference payload should open the confirm panel
///
/// Empty and placeholder pest names mean the model found nothing; the UI
/// shows a retryable error instead of the panel.
#[wasm_bindgen]
pub fn inference_identified(inference_json: &str) -> Result<bool, JsValue> {
    let inference: InferenceResult = serde_json::from_str(inference_json)
        .map_err(|e| JsValue::from_str(&format!("Invalid inference JSON: {}", e)))?;
    Ok(inference.identified())
}

/// Validate a username for the registration form
#[wasm_bindgen]
pub fn is_valid_username(username: &str) -> bool {
    validate_username(username).is_ok()
}

/// Whether a role string may see the admin navigation items
#[wasm_bindgen]
pub fn role_is_admin(role: &str) -> bool {
    role.parse::<Role>().map(|r| r.is_admin()).unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_map_report_level() {
        assert_eq!(map_report_level(0).unwrap(), "low");
        assert_eq!(map_report_level(2).unwrap(), "low");
        assert_eq!(map_report_level(3).unwrap(), "medium");
        assert_eq!(map_report_level(4).unwrap(), "high");
        assert_eq!(map_report_level(5).unwrap(), "critical");
        // Out-of-range goes through the shared type: building the JsValue
        // error requires a wasm runtime.
        assert!(Severity::from_report_level(6).is_err());
    }

    #[test]
    fn test_validate_report_coordinates() {
        assert!(validate_report_coordinates(14.5, 121.0));
        assert!(!validate_report_coordinates(95.0, 121.0));
    }

    #[test]
    fn test_inference_identified() {
        let hit = r#"{"pest_name":"Brown Planthopper","confidence":0.92,"severity":"high"}"#;
        assert!(inference_identified(hit).unwrap());

        let miss = r#"{"pest_name":"","confidence":0.0,"severity":"low"}"#;
        assert!(!inference_identified(miss).unwrap());
    }

    #[test]
    fn test_role_is_admin() {
        assert!(role_is_admin("admin"));
        assert!(role_is_admin("super_admin"));
        assert!(!role_is_admin("farmer"));
        assert!(!role_is_admin("not_a_role"));
    }
}
