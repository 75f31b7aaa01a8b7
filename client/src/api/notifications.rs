//! Per-user notification endpoints
//!
//! Read state lives on the server, unlike alert dismissal which is purely
//! client-side. The two mechanisms are deliberately not interchangeable.

use uuid::Uuid;

use super::RestClient;
use crate::error::ApiResult;
use crate::http::{decode, decode_list};
use shared::{Notification, UnreadCount};

impl RestClient {
    pub(super) async fn notifications_impl(&self) -> ApiResult<Vec<Notification>> {
        let body = self.transport().get("notifications/").await?;
        decode_list(body)
    }

    pub(super) async fn unread_count_impl(&self) -> ApiResult<u64> {
        let body = self.transport().get("notifications/unread_count/").await?;
        let count: UnreadCount = decode(body)?;
        Ok(count.unread_count)
    }

    pub(super) async fn mark_notification_read_impl(&self, id: Uuid) -> ApiResult<()> {
        let path = format!("notifications/{}/mark_read/", id);
        self.transport().post_json(&path, &serde_json::json!({})).await?;
        Ok(())
    }

    pub(super) async fn mark_all_notifications_read_impl(&self) -> ApiResult<()> {
        self.transport()
            .post_json("notifications/mark_all_read/", &serde_json::json!({}))
            .await?;
        Ok(())
    }
}
