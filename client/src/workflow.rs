//! Detection capture/confirm workflow
//!
//! Turns a captured image plus a crop type into a persisted, user-confirmed
//! detection record, without ever saving an unconfirmed guess:
//!
//! ```text
//! idle -> previewing -> analyzing -> awaiting_confirmation -> saving -> confirmed
//!                           |                    |
//!                           v                    v
//!                         failed             idle (reject)
//! ```
//!
//! The persisting call is only reachable from `awaiting_confirmation`, and
//! its payload is only constructible from the preview request plus the
//! inference result the user saw. Network failures are terminal for the
//! attempt and land in the workflow's error slot for display; nothing is
//! retried automatically.

use std::sync::Arc;

use rust_decimal::Decimal;
use thiserror::Error;

use crate::api::{CapturedImage, CreateDetectionRequest, PestCheckApi, PreviewRequest};
use shared::{Detection, InferenceResult};

/// Workflow phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkflowState {
    /// Nothing selected
    Idle,
    /// An image is selected, no inference yet
    Previewing,
    /// Preview call in flight
    Analyzing,
    /// Inference result shown, waiting for the user's decision
    AwaitingConfirmation,
    /// Confirm call in flight
    Saving,
    /// Detection persisted
    Confirmed,
    /// Preview attempt failed
    Failed,
}

/// Error shown to the user, with the retry hint derived from the failure
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowError {
    pub message: String,
    /// Whether the UI should suggest trying again (possibly with a
    /// different image)
    pub can_retry: bool,
}

/// An operation was called in a state where it is not valid
#[derive(Debug, Clone, Error)]
#[error("'{operation}' is not valid in state {state:?}")]
pub struct InvalidTransition {
    pub operation: &'static str,
    pub state: WorkflowState,
}

/// The persisted record merged with the inference payload the user confirmed
///
/// The server echo may omit display-only fields like control methods, so the
/// original inference result is kept alongside it.
#[derive(Debug, Clone)]
pub struct ConfirmedDetection {
    pub record: Detection,
    pub inference: InferenceResult,
}

/// Where the capture happened
#[derive(Debug, Clone)]
pub struct CaptureLocation {
    pub latitude: Decimal,
    pub longitude: Decimal,
    pub address: Option<String>,
}

/// One capture-to-confirm workflow instance
pub struct DetectionWorkflow<A: PestCheckApi + ?Sized> {
    api: Arc<A>,
    state: WorkflowState,
    image: Option<CapturedImage>,
    preview_request: Option<PreviewRequest>,
    pending: Option<InferenceResult>,
    confirmed: Option<ConfirmedDetection>,
    error: Option<WorkflowError>,
}

impl<A: PestCheckApi + ?Sized> DetectionWorkflow<A> {
    pub fn new(api: Arc<A>) -> Self {
        Self {
            api,
            state: WorkflowState::Idle,
            image: None,
            preview_request: None,
            pending: None,
            confirmed: None,
            error: None,
        }
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// The inference result awaiting the user's decision, if any.
    pub fn pending_result(&self) -> Option<&InferenceResult> {
        self.pending.as_ref()
    }

    pub fn confirmed(&self) -> Option<&ConfirmedDetection> {
        self.confirmed.as_ref()
    }

    pub fn error(&self) -> Option<&WorkflowError> {
        self.error.as_ref()
    }

    /// Select a new image, discarding any previous result or error.
    ///
    /// Valid in `idle`, `previewing`, and the terminal states. Not valid
    /// while a call is in flight or while a result awaits confirmation.
    pub fn select_image(&mut self, image: CapturedImage) -> Result<(), InvalidTransition> {
        match self.state {
            WorkflowState::Idle
            | WorkflowState::Previewing
            | WorkflowState::Confirmed
            | WorkflowState::Failed => {
                self.image = Some(image);
                self.preview_request = None;
                self.pending = None;
                self.confirmed = None;
                self.error = None;
                self.transition("select_image", WorkflowState::Previewing);
                Ok(())
            }
            state => Err(InvalidTransition {
                operation: "select_image",
                state,
            }),
        }
    }

    /// Send the selected image for inference. The preview endpoint does not
    /// persist anything server-side.
    pub async fn request_preview(
        &mut self,
        crop_type: &str,
        location: CaptureLocation,
    ) -> Result<(), InvalidTransition> {
        if self.state != WorkflowState::Previewing {
            return Err(InvalidTransition {
                operation: "request_preview",
                state: self.state,
            });
        }
        let Some(image) = self.image.clone() else {
            return Err(InvalidTransition {
                operation: "request_preview",
                state: self.state,
            });
        };

        let request = PreviewRequest {
            image,
            crop_type: crop_type.to_string(),
            latitude: location.latitude,
            longitude: location.longitude,
            address: location.address,
        };

        self.transition("request_preview", WorkflowState::Analyzing);
        match self.api.preview_detection(&request).await {
            Ok(inference) if inference.identified() => {
                tracing::info!(
                    pest = %inference.pest_name,
                    confidence = inference.confidence,
                    "preview identified a pest"
                );
                self.preview_request = Some(request);
                self.pending = Some(inference);
                self.transition("request_preview", WorkflowState::AwaitingConfirmation);
            }
            Ok(_) => {
                self.fail(WorkflowError {
                    message: "No pest detected in the image. Try a clearer, closer photo"
                        .to_string(),
                    can_retry: true,
                });
            }
            Err(err) => {
                self.fail(WorkflowError {
                    message: err.user_message(),
                    can_retry: err.is_retryable(),
                });
            }
        }
        Ok(())
    }

    /// Persist the detection the user accepted.
    ///
    /// On failure the machine stays in `awaiting_confirmation` with an error
    /// banner; the user may retry the confirm action itself.
    pub async fn confirm(&mut self) -> Result<(), InvalidTransition> {
        if self.state != WorkflowState::AwaitingConfirmation {
            return Err(InvalidTransition {
                operation: "confirm",
                state: self.state,
            });
        }
        let (Some(preview), Some(pending)) = (self.preview_request.clone(), self.pending.clone())
        else {
            return Err(InvalidTransition {
                operation: "confirm",
                state: self.state,
            });
        };

        self.error = None;
        self.transition("confirm", WorkflowState::Saving);

        let request = CreateDetectionRequest::from_preview(preview, pending.clone());
        match self.api.create_detection(&request).await {
            Ok(record) => {
                tracing::info!(detection_id = %record.id, "detection saved");
                self.pending = None;
                self.confirmed = Some(ConfirmedDetection {
                    record,
                    inference: pending,
                });
                self.transition("confirm", WorkflowState::Confirmed);
            }
            Err(err) => {
                tracing::warn!(error = %err, "confirm failed");
                self.error = Some(WorkflowError {
                    message: err.user_message(),
                    can_retry: false,
                });
                self.transition("confirm", WorkflowState::AwaitingConfirmation);
            }
        }
        Ok(())
    }

    /// Discard the pending result and the selected image. No network call.
    pub fn reject(&mut self) -> Result<(), InvalidTransition> {
        if self.state != WorkflowState::AwaitingConfirmation {
            return Err(InvalidTransition {
                operation: "reject",
                state: self.state,
            });
        }
        self.clear();
        self.transition("reject", WorkflowState::Idle);
        Ok(())
    }

    /// Return to `idle` from a terminal state.
    pub fn reset(&mut self) -> Result<(), InvalidTransition> {
        match self.state {
            WorkflowState::Confirmed | WorkflowState::Failed => {
                self.clear();
                self.transition("reset", WorkflowState::Idle);
                Ok(())
            }
            state => Err(InvalidTransition {
                operation: "reset",
                state,
            }),
        }
    }

    fn fail(&mut self, error: WorkflowError) {
        tracing::warn!(message = %error.message, can_retry = error.can_retry, "preview failed");
        self.error = Some(error);
        self.pending = None;
        self.transition("fail", WorkflowState::Failed);
    }

    fn clear(&mut self) {
        self.image = None;
        self.preview_request = None;
        self.pending = None;
        self.confirmed = None;
        self.error = None;
    }

    fn transition(&mut self, operation: &'static str, to: WorkflowState) {
        tracing::debug!(from = ?self.state, ?to, operation, "workflow transition");
        self.state = to;
    }
}
