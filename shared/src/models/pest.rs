//! Pest reference library models

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Reference content about a pest species, shown in the pest library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PestInfo {
    pub id: Uuid,
    pub name: String,
    pub scientific_name: Option<String>,
    pub crop_affected: String,
    pub description: String,
    pub symptoms: Option<String>,
    pub control_methods: Option<String>,
    pub prevention: Option<String>,
    pub is_published: bool,
}
