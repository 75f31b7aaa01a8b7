//! Detection endpoints
//!
//! The two-step capture flow talks to a pair of endpoints with the same
//! multipart shape: `detections/preview/` runs inference without persisting,
//! and `detections/` persists a record the user confirmed. The confirm
//! payload carries the same image plus the inference fields echoed back.

use rust_decimal::Decimal;
use serde::Serialize;
use uuid::Uuid;

use super::{PestCheckApi, RestClient};
use crate::error::{ApiError, ApiResult};
use crate::http::{decode, decode_list, FormField};
use shared::{
    validation, Detection, DetectionStatistics, DetectionStatus, HeatMapPoint, InferenceResult,
    Severity,
};

/// An image captured or selected by the user
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedImage {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub content_type: String,
}

impl CapturedImage {
    pub fn jpeg(bytes: Vec<u8>, filename: impl Into<String>) -> Self {
        Self {
            bytes,
            filename: filename.into(),
            content_type: "image/jpeg".to_string(),
        }
    }
}

/// Payload for the non-persisting preview call
#[derive(Debug, Clone)]
pub struct PreviewRequest {
    pub image: CapturedImage,
    pub crop_type: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: Option<String>,
}

impl PreviewRequest {
    pub fn validate(&self) -> ApiResult<()> {
        validation::validate_crop_type(&self.crop_type)
            .and_then(|_| validation::validate_coordinates(self.latitude, self.longitude))
            .map_err(|msg| ApiError::Validation {
                message: msg.to_string(),
                retryable: true,
            })
    }

    fn form_fields(&self) -> Vec<(String, FormField)> {
        let mut fields = vec![
            (
                "image".to_string(),
                FormField::File {
                    bytes: self.image.bytes.clone(),
                    filename: self.image.filename.clone(),
                    content_type: self.image.content_type.clone(),
                },
            ),
            ("crop_type".to_string(), FormField::Text(self.crop_type.clone())),
            ("latitude".to_string(), FormField::Text(self.latitude.to_string())),
            (
                "longitude".to_string(),
                FormField::Text(self.longitude.to_string()),
            ),
        ];
        if let Some(address) = &self.address {
            fields.push(("address".to_string(), FormField::Text(address.clone())));
        }
        fields
    }
}

/// Payload for the persisting confirm call
///
/// Only constructible from a preview request plus the inference result it
/// produced, so a detection cannot be persisted without a prior preview.
#[derive(Debug, Clone)]
pub struct CreateDetectionRequest {
    preview: PreviewRequest,
    inference: InferenceResult,
}

impl CreateDetectionRequest {
    pub fn from_preview(preview: PreviewRequest, inference: InferenceResult) -> Self {
        Self { preview, inference }
    }

    pub fn inference(&self) -> &InferenceResult {
        &self.inference
    }

    pub fn preview(&self) -> &PreviewRequest {
        &self.preview
    }

    fn form_fields(&self) -> Vec<(String, FormField)> {
        let mut fields = self.preview.form_fields();
        fields.push((
            "pest_name".to_string(),
            FormField::Text(self.inference.pest_name.clone()),
        ));
        fields.push((
            "confidence".to_string(),
            FormField::Text(self.inference.confidence.to_string()),
        ));
        fields.push((
            "severity".to_string(),
            FormField::Text(self.inference.severity.as_str().to_string()),
        ));
        if let Some(name) = &self.inference.scientific_name {
            fields.push(("scientific_name".to_string(), FormField::Text(name.clone())));
        }
        if let Some(methods) = &self.inference.control_methods {
            fields.push((
                "control_methods".to_string(),
                FormField::Text(methods.clone()),
            ));
        }
        fields
    }
}

/// A manually reported infestation from the heat-map flow
///
/// Carries the farmer-facing 0-5 damage level; it is collapsed to the
/// backend severity enum when the payload is built.
#[derive(Debug, Clone)]
pub struct ManualReport {
    pub pest_name: String,
    pub crop_type: String,
    pub report_level: u8,
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub description: Option<String>,
}

impl ManualReport {
    pub fn severity(&self) -> ApiResult<Severity> {
        Severity::from_report_level(self.report_level).map_err(|e| ApiError::Validation {
            message: e.to_string(),
            retryable: true,
        })
    }

    pub fn validate(&self) -> ApiResult<()> {
        validation::validate_report_level(self.report_level)
            .and_then(|_| validation::validate_crop_type(&self.crop_type))
            .and_then(|_| validation::validate_coordinates(self.latitude, self.longitude))
            .map_err(|msg| ApiError::Validation {
                message: msg.to_string(),
                retryable: true,
            })
    }

    fn to_payload(&self) -> ApiResult<serde_json::Value> {
        let severity = self.severity()?;
        Ok(serde_json::json!({
            "pest_name": self.pest_name,
            "crop_type": self.crop_type,
            "severity": severity.as_str(),
            "latitude": self.latitude,
            "longitude": self.longitude,
            "description": self.description,
        }))
    }
}

/// Partial update body for `PATCH /detections/{id}/`
#[derive(Debug, Clone, Default, Serialize)]
pub struct DetectionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DetectionStatus>,
}

impl DetectionPatch {
    /// The patch sent when a farmer marks an infestation as dealt with.
    pub fn resolved() -> Self {
        Self {
            active: Some(false),
            status: Some(DetectionStatus::Resolved),
        }
    }
}

/// Everything the dashboard renders
#[derive(Debug, Clone)]
pub struct DashboardOverview {
    pub statistics: DetectionStatistics,
    pub heatmap: Vec<HeatMapPoint>,
}

/// Fetch statistics and heat-map data concurrently, waiting for both.
pub async fn load_dashboard<A: PestCheckApi + ?Sized>(
    api: &A,
    heatmap_days: u32,
) -> ApiResult<DashboardOverview> {
    let (statistics, heatmap) =
        tokio::try_join!(api.detection_statistics(), api.heatmap_data(heatmap_days))?;
    Ok(DashboardOverview {
        statistics,
        heatmap,
    })
}

impl RestClient {
    pub(super) async fn preview_detection_impl(
        &self,
        request: &PreviewRequest,
    ) -> ApiResult<InferenceResult> {
        request.validate()?;
        let body = self
            .transport()
            .post_multipart("detections/preview/", request.form_fields())
            .await?;
        decode(body)
    }

    pub(super) async fn create_detection_impl(
        &self,
        request: &CreateDetectionRequest,
    ) -> ApiResult<Detection> {
        let body = self
            .transport()
            .post_multipart("detections/", request.form_fields())
            .await?;
        decode(body)
    }

    pub(super) async fn submit_report_impl(&self, report: &ManualReport) -> ApiResult<Detection> {
        report.validate()?;
        let payload = report.to_payload()?;
        let body = self.transport().post_json("detections/", &payload).await?;
        decode(body)
    }

    pub(super) async fn my_detections_impl(&self, page_size: u32) -> ApiResult<Vec<Detection>> {
        let path = format!("detections/?my_detections=true&page_size={}", page_size);
        let body = self.transport().get(&path).await?;
        decode_list(body)
    }

    pub(super) async fn detection_statistics_impl(&self) -> ApiResult<DetectionStatistics> {
        let body = self.transport().get("detections/statistics/").await?;
        decode(body)
    }

    pub(super) async fn heatmap_data_impl(&self, days: u32) -> ApiResult<Vec<HeatMapPoint>> {
        let path = format!("detections/heatmap_data/?days={}", days);
        let body = self.transport().get(&path).await?;
        decode_list(body)
    }

    pub(super) async fn update_detection_impl(
        &self,
        id: Uuid,
        patch: &DetectionPatch,
    ) -> ApiResult<Detection> {
        let path = format!("detections/{}/", id);
        let body = self.transport().patch_json(&path, patch).await?;
        decode(body)
    }
}
