//! Error handling for the PestCheck client
//!
//! Every failure surfaced to a screen falls into one of the categories the
//! product shows to users: connectivity, validation, auth, service warm-up,
//! or generic server error. Nothing is retried automatically except the
//! single token-refresh-and-replay on a 401.

use thiserror::Error;

/// Client error types
#[derive(Error, Debug)]
pub enum ApiError {
    // Authentication errors
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Session expired")]
    SessionExpired,

    #[error("Insufficient permissions")]
    Forbidden,

    // Validation errors (HTTP 400); the server may override retryability
    #[error("Validation error: {message}")]
    Validation { message: String, retryable: bool },

    #[error("Resource not found: {0}")]
    NotFound(String),

    // Transport errors
    #[error("Network error: {0}")]
    Network(String),

    // HTTP 503/504 or a cold-start timeout; the server may override retryability
    #[error("Inference service is warming up")]
    ServiceWarmingUp { retryable: bool },

    #[error("Server error (HTTP {status}): {message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response shape: {0}")]
    Decode(String),

    // Local errors
    #[error("Session store error: {0}")]
    Session(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for client operations
pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    /// Whether the user should be invited to retry the failed action.
    ///
    /// Taken from the server response when it carried an explicit flag,
    /// otherwise defaulted by category: 400/503/504 and connectivity
    /// failures are retryable, everything else is not.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Validation { retryable, .. }
            | ApiError::ServiceWarmingUp { retryable } => *retryable,
            ApiError::Network(_) => true,
            _ => false,
        }
    }

    /// Message shown in the UI for this failure.
    pub fn user_message(&self) -> String {
        match self {
            ApiError::InvalidCredentials => "Invalid username or password".to_string(),
            ApiError::SessionExpired => "Your session has expired. Please log in again".to_string(),
            ApiError::Forbidden => {
                "You do not have permission to perform this action".to_string()
            }
            ApiError::Validation { message, .. } => message.clone(),
            ApiError::NotFound(resource) => format!("{} not found", resource),
            ApiError::Network(_) => {
                "Could not reach the server. Check your connection; the backend may be waking up"
                    .to_string()
            }
            ApiError::ServiceWarmingUp { .. } => {
                "The identification service is warming up. Please retry shortly".to_string()
            }
            ApiError::Server { .. } => "A server error occurred. Please try again later".to_string(),
            ApiError::Decode(_) | ApiError::Internal(_) => {
                "Something went wrong. Please try again".to_string()
            }
            ApiError::Session(_) => "Could not read saved session data".to_string(),
            ApiError::Configuration(msg) => format!("Configuration error: {}", msg),
        }
    }

    /// Classify a non-success HTTP response into an error category.
    ///
    /// The body, when JSON, may carry `detail`/`message` strings, a map of
    /// field errors, and an explicit `can_retry` flag.
    pub fn from_response(status: u16, body: &serde_json::Value) -> Self {
        match status {
            400 => ApiError::Validation {
                message: extract_message(body)
                    .unwrap_or_else(|| "Invalid request".to_string()),
                retryable: body
                    .get("can_retry")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true),
            },
            401 => ApiError::InvalidCredentials,
            403 => ApiError::Forbidden,
            404 => ApiError::NotFound(
                extract_message(body).unwrap_or_else(|| "Resource".to_string()),
            ),
            503 | 504 => ApiError::ServiceWarmingUp {
                retryable: body
                    .get("can_retry")
                    .and_then(|v| v.as_bool())
                    .unwrap_or(true),
            },
            _ => ApiError::Server {
                status,
                message: extract_message(body).unwrap_or_else(|| "Unknown error".to_string()),
            },
        }
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            // The inference backend cold-starts; a timeout is indistinguishable
            // from the service still spinning up.
            ApiError::ServiceWarmingUp { retryable: true }
        } else if err.is_decode() {
            ApiError::Decode(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Pull a human-readable message out of a server error body.
///
/// Django-style bodies use `detail`, some endpoints use `message` or `error`,
/// and validation failures return a map of field name to list of messages;
/// the latter are concatenated into a single display string.
fn extract_message(body: &serde_json::Value) -> Option<String> {
    for key in ["detail", "message", "error"] {
        if let Some(text) = body.get(key).and_then(|v| v.as_str()) {
            return Some(text.to_string());
        }
    }

    let map = body.as_object()?;
    let mut parts = Vec::new();
    for (field, value) in map {
        if field == "can_retry" {
            continue;
        }
        match value {
            serde_json::Value::String(s) => parts.push(format!("{}: {}", field, s)),
            serde_json::Value::Array(items) => {
                let joined: Vec<&str> = items.iter().filter_map(|v| v.as_str()).collect();
                if !joined.is_empty() {
                    parts.push(format!("{}: {}", field, joined.join("; ")));
                }
            }
            _ => {}
        }
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_400_is_retryable_validation_by_default() {
        let err = ApiError::from_response(400, &json!({"detail": "image too large"}));
        assert!(matches!(err, ApiError::Validation { .. }));
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "image too large");
    }

    #[test]
    fn server_can_retry_flag_overrides_default() {
        let err = ApiError::from_response(
            400,
            &json!({"detail": "malformed confirm payload", "can_retry": false}),
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn field_errors_concatenate_to_one_string() {
        let err = ApiError::from_response(
            400,
            &json!({"crop_type": ["This field is required."], "latitude": ["Invalid value."]}),
        );
        let message = err.user_message();
        assert!(message.contains("crop_type: This field is required."));
        assert!(message.contains("latitude: Invalid value."));
    }

    #[test]
    fn warm_up_statuses_are_retryable() {
        for status in [503, 504] {
            let err = ApiError::from_response(status, &serde_json::Value::Null);
            assert!(matches!(err, ApiError::ServiceWarmingUp { .. }));
            assert!(err.is_retryable());
        }
    }

    #[test]
    fn warm_up_honors_an_explicit_can_retry_flag() {
        let err = ApiError::from_response(503, &json!({"can_retry": false}));
        assert!(matches!(err, ApiError::ServiceWarmingUp { .. }));
        assert!(!err.is_retryable());

        let err = ApiError::from_response(504, &json!({"can_retry": true}));
        assert!(err.is_retryable());
    }

    #[test]
    fn other_5xx_is_generic_server_error() {
        let err = ApiError::from_response(500, &serde_json::Value::Null);
        assert!(matches!(err, ApiError::Server { status: 500, .. }));
        assert!(!err.is_retryable());
    }
}
