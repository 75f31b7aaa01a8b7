//! HTTP transport for the REST backend
//!
//! Responsibilities:
//! - attach the bearer token from the session to every request
//! - on a 401, refresh the access token and replay the request exactly once
//! - normalize every list endpoint to one shape, failing loudly on surprises
//! - apply the long cold-start timeout and classify transport failures

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ApiConfig;
use crate::error::{ApiError, ApiResult};
use crate::session::Session;

/// One field of a multipart form.
///
/// Kept as owned data (rather than a built `reqwest` form) so the request
/// can be rebuilt for the single replay after a token refresh.
#[derive(Debug, Clone)]
pub enum FormField {
    Text(String),
    File {
        bytes: Vec<u8>,
        filename: String,
        content_type: String,
    },
}

/// Request payload variants the transport can rebuild on replay
#[derive(Debug, Clone)]
enum Payload {
    Empty,
    Json(Value),
    Multipart(Vec<(String, FormField)>),
}

/// Bearer-authenticated HTTP transport
#[derive(Clone)]
pub struct HttpTransport {
    base_url: String,
    http_client: reqwest::Client,
    session: Session,
}

impl HttpTransport {
    pub fn new(config: &ApiConfig, session: Session) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| ApiError::Configuration(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: config.base_url.trim_end_matches('/').to_string(),
            http_client,
            session,
        })
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    // ------------------------------------------------------------------
    // Request helpers
    // ------------------------------------------------------------------

    pub async fn get(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::GET, path, &Payload::Empty).await
    }

    pub async fn post_json<B: serde::Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.send(Method::POST, path, &Payload::Json(json)).await
    }

    pub async fn put_json<B: serde::Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.send(Method::PUT, path, &Payload::Json(json)).await
    }

    pub async fn patch_json<B: serde::Serialize>(&self, path: &str, body: &B) -> ApiResult<Value> {
        let json = serde_json::to_value(body).map_err(|e| ApiError::Internal(e.to_string()))?;
        self.send(Method::PATCH, path, &Payload::Json(json)).await
    }

    pub async fn delete(&self, path: &str) -> ApiResult<Value> {
        self.send(Method::DELETE, path, &Payload::Empty).await
    }

    pub async fn post_multipart(
        &self,
        path: &str,
        fields: Vec<(String, FormField)>,
    ) -> ApiResult<Value> {
        self.send(Method::POST, path, &Payload::Multipart(fields))
            .await
    }

    // ------------------------------------------------------------------
    // Core send path
    // ------------------------------------------------------------------

    async fn send(&self, method: Method, path: &str, payload: &Payload) -> ApiResult<Value> {
        let response = self.execute(method.clone(), path, payload).await?;

        if response.status() == StatusCode::UNAUTHORIZED && self.session.refresh_token().is_some()
        {
            tracing::debug!(path, "access token rejected, refreshing");
            self.refresh_access_token().await?;
            let replayed = self.execute(method, path, payload).await?;
            return Self::read_body(replayed).await;
        }

        Self::read_body(response).await
    }

    async fn execute(
        &self,
        method: Method,
        path: &str,
        payload: &Payload,
    ) -> ApiResult<reqwest::Response> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let mut request = self.http_client.request(method, &url);

        if let Some(token) = self.session.access_token() {
            request = request.bearer_auth(token);
        }

        request = match payload {
            Payload::Empty => request,
            Payload::Json(body) => request.json(body),
            Payload::Multipart(fields) => request.multipart(build_form(fields)?),
        };

        let response = request.send().await.map_err(ApiError::from)?;
        tracing::debug!(url, status = %response.status(), "request completed");
        Ok(response)
    }

    /// Exchange the stored refresh token for a new access token.
    ///
    /// On failure the credentials are cleared; the caller's next render sees
    /// an unauthenticated session and redirects to login.
    async fn refresh_access_token(&self) -> ApiResult<()> {
        let refresh = self
            .session
            .refresh_token()
            .ok_or(ApiError::SessionExpired)?;

        let url = format!("{}/auth/token/refresh/", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .json(&serde_json::json!({ "refresh": refresh }))
            .send()
            .await
            .map_err(ApiError::from)?;

        if !response.status().is_success() {
            tracing::warn!(status = %response.status(), "token refresh rejected");
            self.session.clear_credentials().await?;
            return Err(ApiError::SessionExpired);
        }

        let body: Value = response.json().await.map_err(ApiError::from)?;
        let access = body
            .get("access")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ApiError::Decode("refresh response missing 'access'".to_string()))?;

        self.session.set_access_token(access.to_string()).await
    }

    async fn read_body(response: reqwest::Response) -> ApiResult<Value> {
        let status = response.status();

        if status == StatusCode::NO_CONTENT {
            return Ok(Value::Null);
        }

        // Some routes (deletes, action sub-routes) return an empty body.
        let body: Value = response.json().await.unwrap_or(Value::Null);

        if status.is_success() {
            Ok(body)
        } else {
            Err(ApiError::from_response(status.as_u16(), &body))
        }
    }
}

fn build_form(fields: &[(String, FormField)]) -> ApiResult<reqwest::multipart::Form> {
    let mut form = reqwest::multipart::Form::new();
    for (name, field) in fields {
        form = match field {
            FormField::Text(value) => form.text(name.clone(), value.clone()),
            FormField::File {
                bytes,
                filename,
                content_type,
            } => {
                let part = reqwest::multipart::Part::bytes(bytes.clone())
                    .file_name(filename.clone())
                    .mime_str(content_type)
                    .map_err(|e| {
                        ApiError::Internal(format!("invalid content type '{}': {}", content_type, e))
                    })?;
                form.part(name.clone(), part)
            }
        };
    }
    Ok(form)
}

// ----------------------------------------------------------------------
// Response decoding
// ----------------------------------------------------------------------

/// Decode a single record from a JSON body.
pub fn decode<T: DeserializeOwned>(value: Value) -> ApiResult<T> {
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}

/// Normalize a list endpoint body to a vector.
///
/// Accepts a bare array, `{"results": [...]}` (paginated), or
/// `{"data": [...]}`. Anything else is an error, never an empty default.
pub fn decode_list<T: DeserializeOwned>(value: Value) -> ApiResult<Vec<T>> {
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("results").or_else(|| map.remove("data")) {
            Some(Value::Array(items)) => items,
            Some(other) => {
                return Err(ApiError::Decode(format!(
                    "list wrapper holds {} instead of an array",
                    type_name(&other)
                )))
            }
            None => {
                return Err(ApiError::Decode(
                    "expected an array or a results/data wrapper".to_string(),
                ))
            }
        },
        other => {
            return Err(ApiError::Decode(format!(
                "expected a list body, got {}",
                type_name(&other)
            )))
        }
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| ApiError::Decode(e.to_string())))
        .collect()
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn bare_array_decodes() {
        let items: Vec<u32> = decode_list(json!([1, 2, 3])).unwrap();
        assert_eq!(items, vec![1, 2, 3]);
    }

    #[test]
    fn paginated_wrapper_decodes() {
        let items: Vec<u32> = decode_list(json!({"results": [4, 5], "count": 2})).unwrap();
        assert_eq!(items, vec![4, 5]);
    }

    #[test]
    fn data_wrapper_decodes() {
        let items: Vec<String> = decode_list(json!({"data": ["a"]})).unwrap();
        assert_eq!(items, vec!["a".to_string()]);
    }

    #[test]
    fn unexpected_shape_fails_loudly_instead_of_defaulting_empty() {
        let result: ApiResult<Vec<u32>> = decode_list(json!({"items": [1]}));
        assert!(matches!(result, Err(ApiError::Decode(_))));

        let result: ApiResult<Vec<u32>> = decode_list(json!("nope"));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }

    #[test]
    fn wrapper_with_non_array_results_fails() {
        let result: ApiResult<Vec<u32>> = decode_list(json!({"results": 7}));
        assert!(matches!(result, Err(ApiError::Decode(_))));
    }
}
