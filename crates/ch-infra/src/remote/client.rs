use std::sync::Arc;

use anyhow::{Context, Result};
use reqwest::{Method, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tokio::sync::RwLock;
use tracing::{debug, warn};

use ch_core::auth::AuthSession;
use ch_core::ports::KeyValueStorePort;
use ch_core::{FetchError, SessionIdentity};

use super::config::BackendConfig;
use super::errors::{fetch_error_from_status, fetch_error_from_transport};

/// Key the token set is persisted under.
pub const AUTH_TOKEN_KEY: &str = "campus-hub.auth-token";

/// Shared HTTP client and token holder for the backend adapters.
pub struct RestBackendClient {
    http: reqwest::Client,
    config: BackendConfig,
    kv: Arc<dyn KeyValueStorePort>,
    session: RwLock<Option<AuthSession>>,
}

impl RestBackendClient {
    pub fn new(config: BackendConfig, kv: Arc<dyn KeyValueStorePort>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .context("build http client failed")?;
        Ok(Self {
            http,
            config,
            kv,
            session: RwLock::new(None),
        })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    /// Load the token set persisted by a previous run.
    ///
    /// An unreadable entry is removed and reported as signed out.
    pub async fn restore_session(&self) -> Result<Option<SessionIdentity>> {
        let Some(raw) = self
            .kv
            .get(AUTH_TOKEN_KEY)
            .await
            .context("read persisted auth token failed")?
        else {
            return Ok(None);
        };

        match serde_json::from_str::<AuthSession>(&raw) {
            Ok(session) => {
                let identity = session.identity();
                debug!(user_id = %identity.user_id, "auth token restored");
                *self.session.write().await = Some(session);
                Ok(Some(identity))
            }
            Err(err) => {
                warn!(error = %err, "discarding unreadable auth token");
                self.kv
                    .remove(AUTH_TOKEN_KEY)
                    .await
                    .context("remove unreadable auth token failed")?;
                Ok(None)
            }
        }
    }

    pub async fn current_session(&self) -> Option<AuthSession> {
        self.session.read().await.clone()
    }

    pub(crate) async fn set_session(&self, session: AuthSession) {
        match serde_json::to_string(&session) {
            Ok(raw) => {
                if let Err(err) = self.kv.set(AUTH_TOKEN_KEY, &raw).await {
                    warn!(error = %err, "failed to persist auth token");
                }
            }
            Err(err) => warn!(error = %err, "failed to serialize auth token"),
        }
        *self.session.write().await = Some(session);
    }

    pub(crate) async fn clear_session(&self) {
        *self.session.write().await = None;
        if let Err(err) = self.kv.remove(AUTH_TOKEN_KEY).await {
            warn!(error = %err, "failed to remove persisted auth token");
        }
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url, path)
    }

    /// Request with `apikey` and a bearer token: the user's access token when
    /// signed in, the anon key otherwise.
    pub(crate) async fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let bearer = self
            .session
            .read()
            .await
            .as_ref()
            .map(|session| session.access_token.clone())
            .unwrap_or_else(|| self.config.anon_key.clone());
        self.http
            .request(method, self.url(path))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(bearer)
    }
}

/// Decode a successful JSON response, mapping failures onto [`FetchError`].
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, FetchError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|err| fetch_error_from_transport(&err))?;
    if !status.is_success() {
        return Err(fetch_error_from_status(status, &body));
    }
    serde_json::from_str(&body).map_err(|err| FetchError::Malformed(err.to_string()))
}
