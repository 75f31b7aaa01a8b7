//! Pest library endpoints

use super::RestClient;
use crate::error::ApiResult;
use crate::http::decode_list;
use shared::PestInfo;

impl RestClient {
    /// Fetch the published pest reference content for the library screen.
    pub(super) async fn pest_library_impl(&self) -> ApiResult<Vec<PestInfo>> {
        let body = self.transport().get("pests/").await?;
        let pests: Vec<PestInfo> = decode_list(body)?;
        Ok(pests.into_iter().filter(|p| p.is_published).collect())
    }
}
