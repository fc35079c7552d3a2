use async_trait::async_trait;

use crate::ids::UserId;
use crate::ports::errors::FetchError;
use crate::profile::{ProfileRow, ProfileUpdate};

/// Read/write access to the remote `profiles` table.
#[async_trait]
pub trait ProfileRepositoryPort: Send + Sync {
    /// Fetch the profile row whose id is `id`.
    ///
    /// Error semantics:
    /// - NotFound  : no row with that id
    /// - Malformed : row exists but cannot be decoded
    async fn get_by_id(&self, id: &UserId) -> Result<ProfileRow, FetchError>;

    /// Apply `update` to the row and return the updated row.
    async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<ProfileRow, FetchError>;
}

