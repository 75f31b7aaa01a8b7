//! Detection models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::Severity;

/// A reported pest identification event tied to a location, crop, and severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Detection {
    pub id: Uuid,
    pub pest_name: String,
    pub crop_type: String,
    pub severity: Severity,
    /// Model confidence in the identification, 0.0-1.0
    pub confidence: f64,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: Option<String>,
    pub status: DetectionStatus,
    pub farm_id: Option<Uuid>,
    pub detected_at: DateTime<Utc>,
}

/// Moderation status of a detection
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DetectionStatus {
    Pending,
    Verified,
    Rejected,
    Resolved,
}

/// Inference payload returned by the non-persisting preview endpoint
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct InferenceResult {
    pub pest_name: String,
    pub confidence: f64,
    pub severity: Severity,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scientific_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub control_methods: Option<String>,
}

impl InferenceResult {
    /// Whether the model actually identified a pest.
    ///
    /// The inference service signals "nothing found" with an empty or
    /// placeholder pest name rather than an error status.
    pub fn identified(&self) -> bool {
        let name = self.pest_name.trim().to_lowercase();
        !name.is_empty() && name != "unknown" && name != "no pest detected"
    }
}

/// Aggregate statistics for the dashboard
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectionStatistics {
    pub total_detections: u64,
    pub pending_count: u64,
    pub verified_count: u64,
    pub resolved_count: u64,
    pub by_severity: Vec<SeverityCount>,
    pub by_crop: Vec<CropCount>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeverityCount {
    pub severity: Severity,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CropCount {
    pub crop_type: String,
    pub count: u64,
}

/// One heat-map point: a detection's position weighted by severity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HeatMapPoint {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub severity: Severity,
    pub pest_name: String,
    pub detected_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result_named(name: &str) -> InferenceResult {
        InferenceResult {
            pest_name: name.to_string(),
            confidence: 0.5,
            severity: Severity::Low,
            scientific_name: None,
            control_methods: None,
        }
    }

    #[test]
    fn empty_and_placeholder_names_are_not_identifications() {
        assert!(!result_named("").identified());
        assert!(!result_named("   ").identified());
        assert!(!result_named("unknown").identified());
        assert!(!result_named("Unknown").identified());
        assert!(!result_named("No Pest Detected").identified());
    }

    #[test]
    fn real_pest_name_is_an_identification() {
        assert!(result_named("Brown Planthopper").identified());
    }
}
