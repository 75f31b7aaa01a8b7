//! Admin moderation endpoints
//!
//! Each admin screen fetches its whole collection with a large page-size
//! override, filters client-side (see [`crate::filter`]), and re-fetches
//! after every mutating action. One method per route and action sub-route.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::api::RestClient;
use crate::error::ApiResult;
use crate::http::{decode, decode_list};
use shared::{
    ActivityLog, Alert, AlertType, Detection, Farm, FarmRequest, Pagination, PestInfo, Role, User,
};

/// Review decision payload for farm request approval/rejection
#[derive(Debug, Clone, Serialize)]
pub struct ReviewInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_notes: Option<String>,
}

/// Payload for creating or updating pest library content
#[derive(Debug, Clone, Serialize)]
pub struct PestInfoInput {
    pub name: String,
    pub scientific_name: Option<String>,
    pub crop_affected: String,
    pub description: String,
    pub symptoms: Option<String>,
    pub control_methods: Option<String>,
    pub prevention: Option<String>,
    pub is_published: bool,
}

/// Payload for creating or updating a broadcast alert
#[derive(Debug, Clone, Serialize)]
pub struct AlertInput {
    pub title: String,
    pub message: String,
    pub alert_type: AlertType,
    pub target_area: Option<String>,
    pub is_active: bool,
    pub expires_at: Option<DateTime<Utc>>,
}

impl RestClient {
    // ------------------------------------------------------------------
    // Users
    // ------------------------------------------------------------------

    pub async fn admin_users(&self) -> ApiResult<Vec<User>> {
        let body = self.transport().get(&unpaginated("admin/users/")).await?;
        decode_list(body)
    }

    pub async fn admin_verify_user(&self, id: Uuid) -> ApiResult<User> {
        let path = format!("admin/users/{}/verify_user/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_change_role(&self, id: Uuid, role: Role) -> ApiResult<User> {
        let path = format!("admin/users/{}/change_role/", id);
        let body = self
            .transport()
            .post_json(&path, &serde_json::json!({ "role": role.as_str() }))
            .await?;
        decode(body)
    }

    pub async fn admin_delete_user(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("admin/users/{}/", id);
        self.transport().delete(&path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Farms and farm requests
    // ------------------------------------------------------------------

    pub async fn admin_farms(&self) -> ApiResult<Vec<Farm>> {
        let body = self.transport().get(&unpaginated("admin/farms/")).await?;
        decode_list(body)
    }

    pub async fn admin_verify_farm(&self, id: Uuid) -> ApiResult<Farm> {
        let path = format!("admin/farms/{}/verify_farm/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_delete_farm(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("admin/farms/{}/", id);
        self.transport().delete(&path).await?;
        Ok(())
    }

    pub async fn admin_farm_requests(&self) -> ApiResult<Vec<FarmRequest>> {
        let body = self
            .transport()
            .get(&unpaginated("admin/farm-requests/"))
            .await?;
        decode_list(body)
    }

    /// Approve a farm request; the server converts it into a farm.
    pub async fn admin_approve_farm_request(
        &self,
        id: Uuid,
        review: &ReviewInput,
    ) -> ApiResult<FarmRequest> {
        let path = format!("admin/farm-requests/{}/approve/", id);
        let body = self.transport().post_json(&path, review).await?;
        decode(body)
    }

    pub async fn admin_reject_farm_request(
        &self,
        id: Uuid,
        review: &ReviewInput,
    ) -> ApiResult<FarmRequest> {
        let path = format!("admin/farm-requests/{}/reject/", id);
        let body = self.transport().post_json(&path, review).await?;
        decode(body)
    }

    // ------------------------------------------------------------------
    // Detections
    // ------------------------------------------------------------------

    pub async fn admin_detections(&self) -> ApiResult<Vec<Detection>> {
        let body = self
            .transport()
            .get(&unpaginated("admin/detections/"))
            .await?;
        decode_list(body)
    }

    pub async fn admin_verify_detection(&self, id: Uuid) -> ApiResult<Detection> {
        let path = format!("admin/detections/{}/verify_detection/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_reject_detection(&self, id: Uuid) -> ApiResult<Detection> {
        let path = format!("admin/detections/{}/reject_detection/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_delete_detection(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("admin/detections/{}/", id);
        self.transport().delete(&path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Pest library content
    // ------------------------------------------------------------------

    pub async fn admin_pests(&self) -> ApiResult<Vec<PestInfo>> {
        let body = self.transport().get(&unpaginated("admin/pests/")).await?;
        decode_list(body)
    }

    pub async fn admin_create_pest(&self, input: &PestInfoInput) -> ApiResult<PestInfo> {
        let body = self.transport().post_json("admin/pests/", input).await?;
        decode(body)
    }

    pub async fn admin_update_pest(&self, id: Uuid, input: &PestInfoInput) -> ApiResult<PestInfo> {
        let path = format!("admin/pests/{}/", id);
        let body = self.transport().put_json(&path, input).await?;
        decode(body)
    }

    pub async fn admin_toggle_publish_pest(&self, id: Uuid) -> ApiResult<PestInfo> {
        let path = format!("admin/pests/{}/toggle_publish/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_delete_pest(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("admin/pests/{}/", id);
        self.transport().delete(&path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Alerts
    // ------------------------------------------------------------------

    pub async fn admin_alerts(&self) -> ApiResult<Vec<Alert>> {
        let body = self.transport().get(&unpaginated("admin/alerts/")).await?;
        decode_list(body)
    }

    pub async fn admin_create_alert(&self, input: &AlertInput) -> ApiResult<Alert> {
        let body = self.transport().post_json("admin/alerts/", input).await?;
        decode(body)
    }

    pub async fn admin_update_alert(&self, id: Uuid, input: &AlertInput) -> ApiResult<Alert> {
        let path = format!("admin/alerts/{}/", id);
        let body = self.transport().put_json(&path, input).await?;
        decode(body)
    }

    pub async fn admin_toggle_alert_active(&self, id: Uuid) -> ApiResult<Alert> {
        let path = format!("admin/alerts/{}/toggle_active/", id);
        let body = self.transport().post_json(&path, &serde_json::json!({})).await?;
        decode(body)
    }

    pub async fn admin_delete_alert(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("admin/alerts/{}/", id);
        self.transport().delete(&path).await?;
        Ok(())
    }

    // ------------------------------------------------------------------
    // Activity logs
    // ------------------------------------------------------------------

    pub async fn admin_activity_logs(&self) -> ApiResult<Vec<ActivityLog>> {
        let body = self
            .transport()
            .get(&unpaginated("admin/activity-logs/"))
            .await?;
        decode_list(body)
    }
}

/// Append the large page-size override that defeats server pagination.
fn unpaginated(path: &str) -> String {
    let pagination = Pagination::unpaginated();
    format!("{}?page_size={}", path, pagination.page_size)
}
