use async_trait::async_trait;

use crate::ids::UserId;
use crate::ports::errors::FetchError;

#[async_trait]
pub trait NotificationRepositoryPort: Send + Sync {
    /// Number of unread notifications addressed to `user_id`.
    async fn unread_count(&self, user_id: &UserId) -> Result<u64, FetchError>;
}
