//! # Pure Data Module - Data Transfer Objects Only
//!
//! ## Responsibilities
//!
//! - Define configuration data structures
//! - Provide TOML → DTO mapping
//!
//! ## Prohibited
//!
//! - No validation logic
//! - No default value calculation
//!
//! Missing keys map to empty values (`""`, `0`). Callers that turn this DTO
//! into runtime settings decide what an empty value means.

use std::path::PathBuf;

/// Application configuration DTO (pure data, no logic)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Base URL of the hosted backend (may be empty)
    pub backend_url: String,

    /// Public (anon) API key sent with every request
    pub backend_anon_key: String,

    /// Per-request timeout in milliseconds, 0 = unset
    pub request_timeout_ms: u64,

    /// Data directory (path info only, no existence check), empty = unset
    pub data_dir: PathBuf,

    /// Key of the persisted app store snapshot, empty = unset
    pub store_key: String,

    /// Persistence debounce window in milliseconds, 0 = unset
    pub persist_debounce_ms: u64,

    /// Bootstrap retries after the first attempt; `None` = unset
    pub bootstrap_max_retries: Option<u32>,

    /// Bootstrap retry base delay in milliseconds, 0 = unset
    pub bootstrap_retry_base_delay_ms: u64,

    /// Bootstrap retry delay cap in milliseconds, 0 = unset
    pub bootstrap_retry_max_delay_ms: u64,
}

impl AppConfig {
    /// Create AppConfig from TOML value
    ///
    /// This method must NOT contain any validation or default value logic.
    pub fn from_toml(toml_value: &toml::Value) -> anyhow::Result<Self> {
        let str_at = |section: &str, key: &str| -> String {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string()
        };
        let int_at = |section: &str, key: &str| -> Option<i64> {
            toml_value
                .get(section)
                .and_then(|s| s.get(key))
                .and_then(|v| v.as_integer())
        };

        Ok(Self {
            backend_url: str_at("backend", "url"),
            backend_anon_key: str_at("backend", "anon_key"),
            request_timeout_ms: int_at("backend", "request_timeout_ms").unwrap_or(0).max(0) as u64,
            data_dir: PathBuf::from(str_at("storage", "data_dir")),
            store_key: str_at("storage", "store_key"),
            persist_debounce_ms: int_at("storage", "persist_debounce_ms").unwrap_or(0).max(0)
                as u64,
            bootstrap_max_retries: int_at("bootstrap", "max_retries").map(|v| v.max(0) as u32),
            bootstrap_retry_base_delay_ms: int_at("bootstrap", "retry_base_delay_ms")
                .unwrap_or(0)
                .max(0) as u64,
            bootstrap_retry_max_delay_ms: int_at("bootstrap", "retry_max_delay_ms")
                .unwrap_or(0)
                .max(0) as u64,
        })
    }

    /// Create empty AppConfig (all empty/default values)
    pub fn empty() -> Self {
        Self {
            backend_url: String::new(),
            backend_anon_key: String::new(),
            request_timeout_ms: 0,
            data_dir: PathBuf::new(),
            store_key: String::new(),
            persist_debounce_ms: 0,
            bootstrap_max_retries: None,
            bootstrap_retry_base_delay_ms: 0,
            bootstrap_retry_max_delay_ms: 0,
        }
    }
}
