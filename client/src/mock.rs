//! In-memory mock backend
//!
//! Implements [`PestCheckApi`] against seeded data, selected by dependency
//! injection when `api.backend = "mock"`. It honors the same behavioral
//! contracts as the real backend: preview never persists, create returns
//! the stored record, mark-read flips the flag idempotently.
//!
//! Tests use the injection hooks (`set_next_preview`, `fail_next_*`) and
//! the call counters to assert what did and did not hit the "server".

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::api::{
    AuthResponse, CreateDetectionRequest, DetectionPatch, FarmRequestInput, LoginInput,
    ManualReport, PestCheckApi, PreviewRequest, RegisterInput, TokenPair,
};
use crate::error::{ApiError, ApiResult};
use shared::{
    Alert, AlertType, CropCount, Detection, DetectionStatistics, DetectionStatus, Farm,
    FarmRequest, FarmRequestStatus, HeatMapPoint, InferenceResult, Notification, NotificationType,
    PestInfo, Role, Severity, SeverityCount, User,
};

#[derive(Default)]
struct MockState {
    detections: Vec<Detection>,
    farms: Vec<Farm>,
    farm_requests: Vec<FarmRequest>,
    alerts: Vec<Alert>,
    notifications: Vec<Notification>,
    pests: Vec<PestInfo>,
    next_preview: Option<InferenceResult>,
    fail_next_preview: Option<ApiError>,
    fail_next_create: Option<ApiError>,
    preview_calls: u32,
    create_calls: u32,
    alert_fetches: u32,
    notification_fetches: u32,
}

/// Seeded in-memory backend
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MockBackend {
    pub fn new() -> Self {
        let state = MockState {
            pests: seed_pests(),
            alerts: seed_alerts(),
            notifications: seed_notifications(),
            ..MockState::default()
        };
        Self {
            state: Mutex::new(state),
        }
    }

    // ------------------------------------------------------------------
    // Test hooks
    // ------------------------------------------------------------------

    /// Force the next preview call to return this inference result.
    pub fn set_next_preview(&self, result: InferenceResult) {
        self.lock().next_preview = Some(result);
    }

    /// Force the next preview call to fail with this error.
    pub fn fail_next_preview(&self, error: ApiError) {
        self.lock().fail_next_preview = Some(error);
    }

    /// Force the next create call to fail with this error.
    pub fn fail_next_create(&self, error: ApiError) {
        self.lock().fail_next_create = Some(error);
    }

    /// How many preview calls have been made.
    pub fn preview_calls(&self) -> u32 {
        self.lock().preview_calls
    }

    /// How many persisting create calls have been made.
    pub fn create_calls(&self) -> u32 {
        self.lock().create_calls
    }

    /// How many detections are persisted.
    pub fn detection_count(&self) -> usize {
        self.lock().detections.len()
    }

    /// How many times the alert list has been fetched.
    pub fn alert_fetches(&self) -> u32 {
        self.lock().alert_fetches
    }

    /// How many times the notification list has been fetched.
    pub fn notification_fetches(&self) -> u32 {
        self.lock().notification_fetches
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().expect("mock state poisoned")
    }
}

#[async_trait]
impl PestCheckApi for MockBackend {
    async fn login(&self, input: &LoginInput) -> ApiResult<AuthResponse> {
        if input.username.is_empty() || input.password.is_empty() {
            return Err(ApiError::InvalidCredentials);
        }
        Ok(auth_response(&input.username))
    }

    async fn register(&self, input: &RegisterInput) -> ApiResult<AuthResponse> {
        Ok(auth_response(&input.username))
    }

    async fn preview_detection(&self, request: &PreviewRequest) -> ApiResult<InferenceResult> {
        let mut state = self.lock();
        state.preview_calls += 1;
        if let Some(error) = state.fail_next_preview.take() {
            return Err(error);
        }
        if let Some(canned) = state.next_preview.take() {
            return Ok(canned);
        }
        // Default behavior: identify the seeded pest for the crop, if any.
        let found = state
            .pests
            .iter()
            .find(|pest| pest.crop_affected.eq_ignore_ascii_case(&request.crop_type));
        Ok(match found {
            Some(pest) => InferenceResult {
                pest_name: pest.name.clone(),
                confidence: 0.9,
                severity: Severity::High,
                scientific_name: pest.scientific_name.clone(),
                control_methods: pest.control_methods.clone(),
            },
            None => InferenceResult {
                pest_name: String::new(),
                confidence: 0.0,
                severity: Severity::Low,
                scientific_name: None,
                control_methods: None,
            },
        })
    }

    async fn create_detection(&self, request: &CreateDetectionRequest) -> ApiResult<Detection> {
        let mut state = self.lock();
        state.create_calls += 1;
        if let Some(error) = state.fail_next_create.take() {
            return Err(error);
        }
        let preview = request.preview();
        let inference = request.inference();
        let record = Detection {
            id: Uuid::new_v4(),
            pest_name: inference.pest_name.clone(),
            crop_type: preview.crop_type.clone(),
            severity: inference.severity,
            confidence: inference.confidence,
            latitude: preview.latitude,
            longitude: preview.longitude,
            address: preview.address.clone(),
            status: DetectionStatus::Pending,
            farm_id: None,
            detected_at: Utc::now(),
        };
        state.detections.push(record.clone());
        Ok(record)
    }

    async fn submit_report(&self, report: &ManualReport) -> ApiResult<Detection> {
        report.validate()?;
        let record = Detection {
            id: Uuid::new_v4(),
            pest_name: report.pest_name.clone(),
            crop_type: report.crop_type.clone(),
            severity: report.severity()?,
            confidence: 1.0,
            latitude: report.latitude,
            longitude: report.longitude,
            address: None,
            status: DetectionStatus::Pending,
            farm_id: None,
            detected_at: Utc::now(),
        };
        self.lock().detections.push(record.clone());
        Ok(record)
    }

    async fn my_detections(&self, _page_size: u32) -> ApiResult<Vec<Detection>> {
        Ok(self.lock().detections.clone())
    }

    async fn detection_statistics(&self) -> ApiResult<DetectionStatistics> {
        let state = self.lock();
        let count_status = |status: DetectionStatus| {
            state
                .detections
                .iter()
                .filter(|d| d.status == status)
                .count() as u64
        };
        let by_severity = [
            Severity::Low,
            Severity::Medium,
            Severity::High,
            Severity::Critical,
        ]
        .into_iter()
        .map(|severity| SeverityCount {
            severity,
            count: state
                .detections
                .iter()
                .filter(|d| d.severity == severity)
                .count() as u64,
        })
        .collect();
        let mut by_crop: Vec<CropCount> = Vec::new();
        for detection in &state.detections {
            match by_crop.iter_mut().find(|c| c.crop_type == detection.crop_type) {
                Some(entry) => entry.count += 1,
                None => by_crop.push(CropCount {
                    crop_type: detection.crop_type.clone(),
                    count: 1,
                }),
            }
        }
        Ok(DetectionStatistics {
            total_detections: state.detections.len() as u64,
            pending_count: count_status(DetectionStatus::Pending),
            verified_count: count_status(DetectionStatus::Verified),
            resolved_count: count_status(DetectionStatus::Resolved),
            by_severity,
            by_crop,
        })
    }

    async fn heatmap_data(&self, _days: u32) -> ApiResult<Vec<HeatMapPoint>> {
        Ok(self
            .lock()
            .detections
            .iter()
            .map(|d| HeatMapPoint {
                latitude: d.latitude,
                longitude: d.longitude,
                severity: d.severity,
                pest_name: d.pest_name.clone(),
                detected_at: d.detected_at,
            })
            .collect())
    }

    async fn update_detection(&self, id: Uuid, patch: &DetectionPatch) -> ApiResult<Detection> {
        let mut state = self.lock();
        let detection = state
            .detections
            .iter_mut()
            .find(|d| d.id == id)
            .ok_or_else(|| ApiError::NotFound("Detection".to_string()))?;
        if let Some(status) = patch.status {
            detection.status = status;
        }
        Ok(detection.clone())
    }

    async fn farms(&self) -> ApiResult<Vec<Farm>> {
        Ok(self.lock().farms.clone())
    }

    async fn submit_farm_request(&self, input: &FarmRequestInput) -> ApiResult<FarmRequest> {
        input.validate()?;
        let request = FarmRequest {
            id: Uuid::new_v4(),
            name: input.name.clone(),
            latitude: input.latitude,
            longitude: input.longitude,
            size: input.size,
            crop_type: input.crop_type.clone(),
            status: FarmRequestStatus::Pending,
            review_notes: None,
            created_at: Utc::now(),
        };
        self.lock().farm_requests.push(request.clone());
        Ok(request)
    }

    async fn active_alerts(&self) -> ApiResult<Vec<Alert>> {
        let now = Utc::now();
        let mut state = self.lock();
        state.alert_fetches += 1;
        Ok(state
            .alerts
            .iter()
            .filter(|alert| alert.is_live(now))
            .cloned()
            .collect())
    }

    async fn notifications(&self) -> ApiResult<Vec<Notification>> {
        let mut state = self.lock();
        state.notification_fetches += 1;
        Ok(state.notifications.clone())
    }

    async fn unread_count(&self) -> ApiResult<u64> {
        Ok(self
            .lock()
            .notifications
            .iter()
            .filter(|n| !n.is_read)
            .count() as u64)
    }

    async fn mark_notification_read(&self, id: Uuid) -> ApiResult<()> {
        let mut state = self.lock();
        if let Some(notification) = state.notifications.iter_mut().find(|n| n.id == id) {
            notification.is_read = true;
        }
        Ok(())
    }

    async fn mark_all_notifications_read(&self) -> ApiResult<()> {
        for notification in self.lock().notifications.iter_mut() {
            notification.is_read = true;
        }
        Ok(())
    }

    async fn pest_library(&self) -> ApiResult<Vec<PestInfo>> {
        Ok(self
            .lock()
            .pests
            .iter()
            .filter(|p| p.is_published)
            .cloned()
            .collect())
    }
}

fn auth_response(username: &str) -> AuthResponse {
    AuthResponse {
        user: User {
            id: Uuid::new_v4(),
            username: username.to_string(),
            email: Some(format!("{}@example.com", username)),
            role: Role::Farmer,
            is_verified: true,
            created_at: Utc::now(),
        },
        tokens: TokenPair {
            access: "mock-access-token".to_string(),
            refresh: "mock-refresh-token".to_string(),
        },
    }
}

fn seed_pests() -> Vec<PestInfo> {
    vec![
        PestInfo {
            id: Uuid::new_v4(),
            name: "Brown Planthopper".to_string(),
            scientific_name: Some("Nilaparvata lugens".to_string()),
            crop_affected: "rice".to_string(),
            description: "Sap-sucking insect causing hopperburn in rice paddies".to_string(),
            symptoms: Some("Yellowing and drying of leaves in circular patches".to_string()),
            control_methods: Some("Drain fields; apply buprofezin if threshold exceeded".to_string()),
            prevention: Some("Avoid excessive nitrogen; plant resistant varieties".to_string()),
            is_published: true,
        },
        PestInfo {
            id: Uuid::new_v4(),
            name: "Fall Armyworm".to_string(),
            scientific_name: Some("Spodoptera frugiperda".to_string()),
            crop_affected: "corn".to_string(),
            description: "Caterpillar feeding on whorls and ears of maize".to_string(),
            symptoms: Some("Ragged leaf feeding and frass in the whorl".to_string()),
            control_methods: Some("Handpick egg masses; targeted insecticide at early instar"
                .to_string()),
            prevention: Some("Early planting; intercropping with legumes".to_string()),
            is_published: true,
        },
        PestInfo {
            id: Uuid::new_v4(),
            name: "Coffee Berry Borer".to_string(),
            scientific_name: Some("Hypothenemus hampei".to_string()),
            crop_affected: "coffee".to_string(),
            description: "Beetle boring into coffee cherries".to_string(),
            symptoms: Some("Small round holes at the berry apex".to_string()),
            control_methods: Some("Strip harvest; deploy alcohol traps".to_string()),
            prevention: Some("Sanitation picking after harvest".to_string()),
            is_published: false,
        },
    ]
}

fn seed_alerts() -> Vec<Alert> {
    vec![Alert {
        id: Uuid::new_v4(),
        title: "Planthopper outbreak".to_string(),
        message: "Elevated brown planthopper activity reported in the central plains".to_string(),
        alert_type: AlertType::Warning,
        target_area: Some("Central Plains".to_string()),
        is_active: true,
        expires_at: None,
        created_at: Utc::now(),
    }]
}

fn seed_notifications() -> Vec<Notification> {
    vec![
        Notification {
            id: Uuid::new_v4(),
            notification_type: NotificationType::DetectionVerified,
            title: "Detection verified".to_string(),
            message: "An expert verified your brown planthopper detection".to_string(),
            is_read: false,
            created_at: Utc::now(),
        },
        Notification {
            id: Uuid::new_v4(),
            notification_type: NotificationType::System,
            title: "Welcome to PestCheck".to_string(),
            message: "Photograph a pest to get started".to_string(),
            is_read: true,
            created_at: Utc::now(),
        },
    ]
}
