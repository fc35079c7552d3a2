use std::time::Duration;

use anyhow::{bail, Result};

use ch_core::AppConfig;

pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings of the hosted backend.
#[derive(Clone, PartialEq, Eq)]
pub struct BackendConfig {
    /// Project URL without trailing slash, e.g. `https://xyz.example.co`.
    pub base_url: String,
    /// Public (anon) API key sent as `apikey` on every request.
    pub anon_key: String,
    pub request_timeout: Duration,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>, anon_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            anon_key: anon_key.into(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }

    pub fn from_app_config(config: &AppConfig) -> Result<Self> {
        if config.backend_url.trim().is_empty() {
            bail!("backend.url is not configured");
        }
        let mut backend = Self::new(config.backend_url.trim(), config.backend_anon_key.clone());
        if config.request_timeout_ms > 0 {
            backend.request_timeout = Duration::from_millis(config.request_timeout_ms);
        }
        Ok(backend)
    }
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("base_url", &self.base_url)
            .field("anon_key", &"<redacted>")
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}
