//! Farm and farm request models

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A registered farm
///
/// Farms are never created directly: an approved [`FarmRequest`] becomes a
/// farm on the server side.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Farm {
    pub id: Uuid,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    /// Farm size in hectares
    pub size: Decimal,
    pub crop_type: String,
    pub is_verified: bool,
    pub user_name: String,
    pub created_at: DateTime<Utc>,
}

/// A pending, admin-reviewed submission that becomes a farm upon approval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FarmRequest {
    pub id: Uuid,
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub size: Decimal,
    pub crop_type: String,
    pub status: FarmRequestStatus,
    pub review_notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Review status of a farm request
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FarmRequestStatus {
    Pending,
    Approved,
    Rejected,
}
