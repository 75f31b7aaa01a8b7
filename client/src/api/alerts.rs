//! Broadcast alert endpoints

use super::RestClient;
use crate::error::ApiResult;
use crate::http::decode_list;
use shared::Alert;

impl RestClient {
    /// Fetch the active broadcast alerts for the banner.
    ///
    /// Dismissal filtering happens client-side; the server has no per-user
    /// alert read state.
    pub(super) async fn active_alerts_impl(&self) -> ApiResult<Vec<Alert>> {
        let body = self.transport().get("alerts/?active=true").await?;
        decode_list(body)
    }
}
