//! Farm lifecycle endpoints
//!
//! Farmers never create farms directly: a farm request goes through admin
//! review and becomes a farm on approval.

use rust_decimal::Decimal;
use serde::Serialize;

use super::RestClient;
use crate::error::{ApiError, ApiResult};
use crate::http::{decode, decode_list};
use shared::{validation, Farm, FarmRequest};

/// Payload for `POST /farm-requests/`
#[derive(Debug, Clone, Serialize)]
pub struct FarmRequestInput {
    pub name: String,
    pub latitude: Decimal,
    pub longitude: Decimal,
    /// Size in hectares
    pub size: Decimal,
    pub crop_type: String,
}

impl FarmRequestInput {
    pub fn validate(&self) -> ApiResult<()> {
        if self.name.trim().is_empty() {
            return Err(ApiError::Validation {
                message: "Farm name is required".to_string(),
                retryable: true,
            });
        }
        validation::validate_coordinates(self.latitude, self.longitude)
            .and_then(|_| validation::validate_farm_size(self.size))
            .and_then(|_| validation::validate_crop_type(&self.crop_type))
            .map_err(|msg| ApiError::Validation {
                message: msg.to_string(),
                retryable: true,
            })
    }
}

impl RestClient {
    pub(super) async fn farms_impl(&self) -> ApiResult<Vec<Farm>> {
        let body = self.transport().get("farms/").await?;
        decode_list(body)
    }

    pub(super) async fn submit_farm_request_impl(
        &self,
        input: &FarmRequestInput,
    ) -> ApiResult<FarmRequest> {
        input.validate()?;
        let body = self.transport().post_json("farm-requests/", input).await?;
        decode(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn farm_request_requires_positive_size() {
        let input = FarmRequestInput {
            name: "Ban Rai".to_string(),
            latitude: Decimal::from(14),
            longitude: Decimal::from(121),
            size: Decimal::ZERO,
            crop_type: "rice".to_string(),
        };
        assert!(input.validate().is_err());
    }
}
