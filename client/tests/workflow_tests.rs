//! Detection workflow tests
//!
//! Covers the capture/preview/confirm state machine:
//! - no pending result until a successful preview
//! - no persisting call without a confirmed preview in the same instance
//! - confirm failure keeps the machine in awaiting_confirmation
//! - retry hints derived from the failure category

use std::sync::Arc;

use rust_decimal::Decimal;

use pestcheck_client::api::CapturedImage;
use pestcheck_client::error::ApiError;
use pestcheck_client::mock::MockBackend;
use pestcheck_client::workflow::{CaptureLocation, DetectionWorkflow, WorkflowState};
use shared::{InferenceResult, Severity};

fn sample_image() -> CapturedImage {
    CapturedImage::jpeg(vec![0xff, 0xd8, 0xff, 0xe0], "leaf.jpg")
}

fn sample_location() -> CaptureLocation {
    CaptureLocation {
        latitude: Decimal::new(145, 1),
        longitude: Decimal::new(1210, 1),
        address: Some("Nakhon Pathom".to_string()),
    }
}

fn planthopper() -> InferenceResult {
    InferenceResult {
        pest_name: "Brown Planthopper".to_string(),
        confidence: 0.92,
        severity: Severity::High,
        scientific_name: Some("Nilaparvata lugens".to_string()),
        control_methods: Some("Drain fields".to_string()),
    }
}

fn empty_result() -> InferenceResult {
    InferenceResult {
        pest_name: String::new(),
        confidence: 0.0,
        severity: Severity::Low,
        scientific_name: None,
        control_methods: None,
    }
}

// ============================================================================
// Happy path
// ============================================================================

#[tokio::test]
async fn full_capture_confirm_flow_persists_exactly_one_detection() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(planthopper());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.pending_result().is_none());

    workflow.select_image(sample_image()).unwrap();
    assert_eq!(workflow.state(), WorkflowState::Previewing);
    // No pending result until a successful preview response arrives.
    assert!(workflow.pending_result().is_none());

    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert_eq!(workflow.state(), WorkflowState::AwaitingConfirmation);
    let pending = workflow.pending_result().unwrap();
    assert_eq!(pending.pest_name, "Brown Planthopper");
    assert_eq!(pending.confidence, 0.92);
    assert_eq!(pending.severity, Severity::High);

    // Preview is side-effect free on the persisted store.
    assert_eq!(mock.detection_count(), 0);

    workflow.confirm().await.unwrap();
    assert_eq!(workflow.state(), WorkflowState::Confirmed);
    assert_eq!(mock.detection_count(), 1);

    let confirmed = workflow.confirmed().unwrap();
    assert_eq!(confirmed.record.pest_name, "Brown Planthopper");
    assert_eq!(confirmed.record.crop_type, "rice");
    // Display-only inference fields survive the merge with the server record.
    assert_eq!(
        confirmed.inference.control_methods.as_deref(),
        Some("Drain fields")
    );
}

#[tokio::test]
async fn reset_returns_to_idle_after_confirmation() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(planthopper());
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    workflow.confirm().await.unwrap();

    workflow.reset().unwrap();
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.pending_result().is_none());
    assert!(workflow.confirmed().is_none());
}

// ============================================================================
// Empty / placeholder preview results
// ============================================================================

#[tokio::test]
async fn empty_pest_name_fails_retryably_without_persisting() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(empty_result());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();

    assert_eq!(workflow.state(), WorkflowState::Failed);
    let error = workflow.error().unwrap();
    assert!(error.message.contains("No pest detected"));
    assert!(error.can_retry);
    // No confirm panel: no pending result to confirm.
    assert!(workflow.pending_result().is_none());
    assert_eq!(mock.create_calls(), 0);
    assert_eq!(mock.detection_count(), 0);
}

#[tokio::test]
async fn placeholder_pest_name_is_treated_as_no_detection() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(InferenceResult {
        pest_name: "Unknown".to_string(),
        ..empty_result()
    });
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert_eq!(workflow.state(), WorkflowState::Failed);
    assert!(workflow.pending_result().is_none());
}

// ============================================================================
// The persist-only-after-confirmation invariant
// ============================================================================

#[tokio::test]
async fn reject_then_confirm_is_unreachable() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(planthopper());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert_eq!(workflow.state(), WorkflowState::AwaitingConfirmation);

    workflow.reject().unwrap();
    assert_eq!(workflow.state(), WorkflowState::Idle);
    assert!(workflow.pending_result().is_none());

    // Confirm without an intervening successful preview must not reach the
    // persisting endpoint.
    assert!(workflow.confirm().await.is_err());
    assert_eq!(mock.create_calls(), 0);
    assert_eq!(mock.detection_count(), 0);
}

#[tokio::test]
async fn confirm_is_rejected_in_every_state_without_a_pending_result() {
    let mock = Arc::new(MockBackend::new());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    assert!(workflow.confirm().await.is_err());
    workflow.select_image(sample_image()).unwrap();
    assert!(workflow.confirm().await.is_err());
    assert_eq!(mock.create_calls(), 0);
}

#[tokio::test]
async fn selecting_a_new_image_discards_the_previous_error() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(empty_result());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert_eq!(workflow.state(), WorkflowState::Failed);

    workflow.select_image(sample_image()).unwrap();
    assert_eq!(workflow.state(), WorkflowState::Previewing);
    assert!(workflow.error().is_none());
}

#[tokio::test]
async fn select_image_is_invalid_while_awaiting_confirmation() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(planthopper());
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert!(workflow.select_image(sample_image()).is_err());
}

// ============================================================================
// Failure semantics
// ============================================================================

#[tokio::test]
async fn confirm_failure_keeps_awaiting_confirmation_with_banner() {
    let mock = Arc::new(MockBackend::new());
    mock.set_next_preview(planthopper());
    let mut workflow = DetectionWorkflow::new(mock.clone());

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();

    mock.fail_next_create(ApiError::Server {
        status: 500,
        message: "boom".to_string(),
    });
    workflow.confirm().await.unwrap();

    // The attempt failed but the pending result is still confirmable.
    assert_eq!(workflow.state(), WorkflowState::AwaitingConfirmation);
    let error = workflow.error().unwrap();
    assert!(!error.can_retry);
    assert!(workflow.pending_result().is_some());

    // Retrying the confirm action itself succeeds.
    workflow.confirm().await.unwrap();
    assert_eq!(workflow.state(), WorkflowState::Confirmed);
    assert_eq!(mock.detection_count(), 1);
}

#[tokio::test]
async fn validation_failure_from_preview_is_retryable() {
    let mock = Arc::new(MockBackend::new());
    mock.fail_next_preview(ApiError::Validation {
        message: "image too blurry".to_string(),
        retryable: true,
    });
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();

    assert_eq!(workflow.state(), WorkflowState::Failed);
    let error = workflow.error().unwrap();
    assert_eq!(error.message, "image too blurry");
    assert!(error.can_retry);
}

#[tokio::test]
async fn server_retry_override_is_honored() {
    let mock = Arc::new(MockBackend::new());
    mock.fail_next_preview(ApiError::Validation {
        message: "unsupported crop".to_string(),
        retryable: false,
    });
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();
    assert!(!workflow.error().unwrap().can_retry);
}

#[tokio::test]
async fn warming_up_failure_suggests_retrying_shortly() {
    let mock = Arc::new(MockBackend::new());
    mock.fail_next_preview(ApiError::ServiceWarmingUp { retryable: true });
    let mut workflow = DetectionWorkflow::new(mock);

    workflow.select_image(sample_image()).unwrap();
    workflow
        .request_preview("rice", sample_location())
        .await
        .unwrap();

    let error = workflow.error().unwrap();
    assert!(error.message.contains("warming up"));
    assert!(error.can_retry);
}

#[tokio::test]
async fn preview_is_invalid_without_an_image() {
    let mock = Arc::new(MockBackend::new());
    let mut workflow = DetectionWorkflow::new(mock);
    assert!(workflow
        .request_preview("rice", sample_location())
        .await
        .is_err());
}
