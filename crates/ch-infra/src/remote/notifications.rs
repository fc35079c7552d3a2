use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::CONTENT_RANGE;
use reqwest::Method;

use ch_core::ports::NotificationRepositoryPort;
use ch_core::{FetchError, UserId};

use super::client::RestBackendClient;
use super::errors::{fetch_error_from_status, fetch_error_from_transport};

const NOTIFICATIONS_PATH: &str = "/rest/v1/notifications";

/// `notifications` table adapter.
pub struct RemoteNotificationRepository {
    client: Arc<RestBackendClient>,
}

impl RemoteNotificationRepository {
    pub fn new(client: Arc<RestBackendClient>) -> Self {
        Self { client }
    }
}

/// Total from a `Content-Range` value such as `0-24/42` or `*/0`.
fn parse_total(content_range: &str) -> Option<u64> {
    let (_, total) = content_range.rsplit_once('/')?;
    total.trim().parse().ok()
}

#[async_trait]
impl NotificationRepositoryPort for RemoteNotificationRepository {
    async fn unread_count(&self, user_id: &UserId) -> Result<u64, FetchError> {
        let response = self
            .client
            .request(Method::HEAD, NOTIFICATIONS_PATH)
            .await
            .query(&[
                ("user_id", format!("eq.{user_id}")),
                ("read", "eq.false".to_string()),
                ("select", "id".to_string()),
            ])
            .header("Prefer", "count=exact")
            .send()
            .await
            .map_err(|err| fetch_error_from_transport(&err))?;

        let status = response.status();
        if !status.is_success() {
            return Err(fetch_error_from_status(status, ""));
        }
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_total)
            .ok_or_else(|| FetchError::Malformed("missing or invalid Content-Range".into()))
    }
}
