//! Typed API surface for the PestCheck backend
//!
//! The [`PestCheckApi`] trait is the seam between screens and the network:
//! the real [`RestClient`] and the in-memory mock both implement it, and the
//! active one is chosen by dependency injection at startup rather than by
//! URL string matching.

pub mod alerts;
pub mod auth;
pub mod detections;
pub mod farms;
pub mod notifications;
pub mod pests;

use async_trait::async_trait;
use uuid::Uuid;

use crate::config::ApiConfig;
use crate::error::ApiResult;
use crate::http::HttpTransport;
use crate::session::Session;
use shared::{
    Alert, Detection, DetectionStatistics, Farm, FarmRequest, HeatMapPoint, Notification, PestInfo,
};

pub use auth::{AuthResponse, LoginInput, RegisterInput, TokenPair};
pub use detections::{
    load_dashboard, CapturedImage, CreateDetectionRequest, DashboardOverview, DetectionPatch,
    ManualReport, PreviewRequest,
};
pub use farms::FarmRequestInput;

/// Everything the user-facing screens can ask of the backend
#[async_trait]
pub trait PestCheckApi: Send + Sync {
    // Auth
    async fn login(&self, input: &LoginInput) -> ApiResult<AuthResponse>;
    async fn register(&self, input: &RegisterInput) -> ApiResult<AuthResponse>;

    // Detections
    /// Run inference on an image without persisting anything server-side.
    async fn preview_detection(
        &self,
        request: &PreviewRequest,
    ) -> ApiResult<shared::InferenceResult>;
    /// Persist a detection the user confirmed from a preview result.
    async fn create_detection(&self, request: &CreateDetectionRequest) -> ApiResult<Detection>;
    /// Persist a manually reported infestation from the heat-map flow.
    async fn submit_report(&self, report: &ManualReport) -> ApiResult<Detection>;
    async fn my_detections(&self, page_size: u32) -> ApiResult<Vec<Detection>>;
    async fn detection_statistics(&self) -> ApiResult<DetectionStatistics>;
    async fn heatmap_data(&self, days: u32) -> ApiResult<Vec<HeatMapPoint>>;
    async fn update_detection(&self, id: Uuid, patch: &DetectionPatch) -> ApiResult<Detection>;

    // Farms
    async fn farms(&self) -> ApiResult<Vec<Farm>>;
    async fn submit_farm_request(&self, input: &FarmRequestInput) -> ApiResult<FarmRequest>;

    // Alerts and notifications
    async fn active_alerts(&self) -> ApiResult<Vec<Alert>>;
    async fn notifications(&self) -> ApiResult<Vec<Notification>>;
    async fn unread_count(&self) -> ApiResult<u64>;
    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<()>;
    async fn mark_all_notifications_read(&self) -> ApiResult<()>;

    // Reference content
    async fn pest_library(&self) -> ApiResult<Vec<PestInfo>>;
}

/// REST implementation of [`PestCheckApi`]
#[derive(Clone)]
pub struct RestClient {
    transport: HttpTransport,
}

impl RestClient {
    pub fn new(config: &ApiConfig, session: Session) -> ApiResult<Self> {
        Ok(Self {
            transport: HttpTransport::new(config, session)?,
        })
    }

    pub fn session(&self) -> &Session {
        self.transport.session()
    }

    pub(crate) fn transport(&self) -> &HttpTransport {
        &self.transport
    }
}

#[async_trait]
impl PestCheckApi for RestClient {
    async fn login(&self, input: &LoginInput) -> ApiResult<AuthResponse> {
        self.login_impl(input).await
    }

    async fn register(&self, input: &RegisterInput) -> ApiResult<AuthResponse> {
        self.register_impl(input).await
    }

    async fn preview_detection(
        &self,
        request: &PreviewRequest,
    ) -> ApiResult<shared::InferenceResult> {
        self.preview_detection_impl(request).await
    }

    async fn create_detection(&self, request: &CreateDetectionRequest) -> ApiResult<Detection> {
        self.create_detection_impl(request).await
    }

    async fn submit_report(&self, report: &ManualReport) -> ApiResult<Detection> {
        self.submit_report_impl(report).await
    }

    async fn my_detections(&self, page_size: u32) -> ApiResult<Vec<Detection>> {
        self.my_detections_impl(page_size).await
    }

    async fn detection_statistics(&self) -> ApiResult<DetectionStatistics> {
        self.detection_statistics_impl().await
    }

    async fn heatmap_data(&self, days: u32) -> ApiResult<Vec<HeatMapPoint>> {
        self.heatmap_data_impl(days).await
    }

    async fn update_detection(&self, id: Uuid, patch: &DetectionPatch) -> ApiResult<Detection> {
        self.update_detection_impl(id, patch).await
    }

    async fn farms(&self) -> ApiResult<Vec<Farm>> {
        self.farms_impl().await
    }

    async fn submit_farm_request(&self, input: &FarmRequestInput) -> ApiResult<FarmRequest> {
        self.submit_farm_request_impl(input).await
    }

    async fn active_alerts(&self) -> ApiResult<Vec<Alert>> {
        self.active_alerts_impl().await
    }

    async fn notifications(&self) -> ApiResult<Vec<Notification>> {
        self.notifications_impl().await
    }

    async fn unread_count(&self) -> ApiResult<u64> {
        self.unread_count_impl().await
    }

    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<()> {
        self.mark_notification_read_impl(id).await
    }

    async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        self.mark_all_notifications_read_impl().await
    }

    async fn pest_library(&self) -> ApiResult<Vec<PestInfo>> {
        self.pest_library_impl().await
    }
}
