//! Authentication endpoints

use serde::{Deserialize, Serialize};
use validator::Validate;

use super::RestClient;
use crate::error::{ApiError, ApiResult};
use crate::http::decode;
use crate::session::AuthTokens;
use shared::User;

/// Login form payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct LoginInput {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Registration form payload
#[derive(Debug, Clone, Serialize, Validate)]
pub struct RegisterInput {
    #[validate(length(min = 3, max = 30, message = "Username must be 3-30 characters"))]
    pub username: String,
    #[validate(email(message = "Invalid email format"))]
    pub email: String,
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
}

/// Token pair as issued by `/auth/login/` and `/auth/register/`
#[derive(Debug, Clone, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

/// `{ user, tokens }` response shape shared by login and register
#[derive(Debug, Clone, Deserialize)]
pub struct AuthResponse {
    pub user: User,
    pub tokens: TokenPair,
}

impl From<TokenPair> for AuthTokens {
    fn from(pair: TokenPair) -> Self {
        AuthTokens {
            access: pair.access,
            refresh: pair.refresh,
        }
    }
}

impl RestClient {
    pub(super) async fn login_impl(&self, input: &LoginInput) -> ApiResult<AuthResponse> {
        validate(input)?;
        let body = self.transport().post_json("auth/login/", input).await?;
        let response: AuthResponse = decode(body)?;
        self.persist_auth(&response).await?;
        tracing::info!(username = %response.user.username, "logged in");
        Ok(response)
    }

    pub(super) async fn register_impl(&self, input: &RegisterInput) -> ApiResult<AuthResponse> {
        validate(input)?;
        let body = self.transport().post_json("auth/register/", input).await?;
        let response: AuthResponse = decode(body)?;
        self.persist_auth(&response).await?;
        tracing::info!(username = %response.user.username, "registered");
        Ok(response)
    }

    /// Drop the stored credentials. No server call in this contract.
    pub async fn logout(&self) -> ApiResult<()> {
        self.session().clear_credentials().await
    }

    async fn persist_auth(&self, response: &AuthResponse) -> ApiResult<()> {
        self.session()
            .set_login(
                response.user.clone(),
                AuthTokens {
                    access: response.tokens.access.clone(),
                    refresh: response.tokens.refresh.clone(),
                },
            )
            .await
    }
}

/// Run `validator` checks and fold failures into one display string.
pub(super) fn validate<T: Validate>(input: &T) -> ApiResult<()> {
    input.validate().map_err(|errors| {
        let message = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                errs.iter().map(move |e| {
                    e.message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field))
                })
            })
            .collect::<Vec<_>>()
            .join(", ");
        ApiError::Validation {
            message,
            retryable: true,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn register_input_rejects_short_password() {
        let input = RegisterInput {
            username: "somchai".to_string(),
            email: "somchai@example.com".to_string(),
            password: "short".to_string(),
        };
        let err = validate(&input).unwrap_err();
        assert!(err.user_message().contains("at least 8"));
        assert!(err.is_retryable());
    }

    #[test]
    fn login_input_requires_both_fields() {
        let input = LoginInput {
            username: String::new(),
            password: "secret123".to_string(),
        };
        assert!(validate(&input).is_err());
    }
}
