use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Method;
use tracing::debug;

use ch_core::ports::ProfileRepositoryPort;
use ch_core::{FetchError, ProfileRow, ProfileUpdate, UserId};

use super::client::{read_json, RestBackendClient};
use super::errors::fetch_error_from_transport;

const PROFILES_PATH: &str = "/rest/v1/profiles";

/// `profiles` table adapter.
pub struct RemoteProfileRepository {
    client: Arc<RestBackendClient>,
}

impl RemoteProfileRepository {
    pub fn new(client: Arc<RestBackendClient>) -> Self {
        Self { client }
    }
}

fn first_row(rows: Vec<ProfileRow>) -> Result<ProfileRow, FetchError> {
    rows.into_iter().next().ok_or(FetchError::NotFound)
}

#[async_trait]
impl ProfileRepositoryPort for RemoteProfileRepository {
    async fn get_by_id(&self, id: &UserId) -> Result<ProfileRow, FetchError> {
        let response = self
            .client
            .request(Method::GET, PROFILES_PATH)
            .await
            .query(&[("id", format!("eq.{id}")), ("select", "*".to_string())])
            .send()
            .await
            .map_err(|err| fetch_error_from_transport(&err))?;
        let row = first_row(read_json(response).await?)?;
        debug!(user_id = %id, completed = ?row.completed, "profile row fetched");
        Ok(row)
    }

    async fn update(&self, id: &UserId, update: &ProfileUpdate) -> Result<ProfileRow, FetchError> {
        let response = self
            .client
            .request(Method::PATCH, PROFILES_PATH)
            .await
            .query(&[("id", format!("eq.{id}"))])
            .header("Prefer", "return=representation")
            .json(update)
            .send()
            .await
            .map_err(|err| fetch_error_from_transport(&err))?;
        first_row(read_json(response).await?)
    }
}
