use std::sync::Arc;

use tracing::debug;

use ch_core::ports::NotificationRepositoryPort;

use crate::store::AppStore;
use crate::usecases::SessionError;

/// Count the signed-in user's unread notifications.
pub struct GetUnreadNotificationCount {
    notifications: Arc<dyn NotificationRepositoryPort>,
    store: Arc<AppStore>,
}

impl GetUnreadNotificationCount {
    pub fn new(notifications: Arc<dyn NotificationRepositoryPort>, store: Arc<AppStore>) -> Self {
        Self {
            notifications,
            store,
        }
    }

    pub async fn execute(&self) -> Result<u64, SessionError> {
        let session = self.store.session().ok_or(SessionError::NotSignedIn)?;
        let count = self.notifications.unread_count(&session.user_id).await?;
        debug!(user_id = %session.user_id, count, "unread notifications counted");
        Ok(count)
    }
}
