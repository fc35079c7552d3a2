//! # Dependency Injection / 依赖注入模块
//!
//! ## Responsibilities / 职责
//!
//! - ✅ Create infra implementations (kv store, REST adapters) / 创建 infra 层具体实现
//! - ✅ Build the store and the profile bootstrap coordinator / 组装 store 与 coordinator
//!
//! ## Prohibited / 禁止事项
//!
//! ❌ **No business logic / 禁止包含任何业务逻辑**
//! - Do not decide what a restored token means for the session
//! - 不判断恢复的令牌对会话意味着什么 (see `runtime.rs`)
//!
//! > **This is the only place allowed to depend on ch-infra + ch-app simultaneously.**
//! > **这是唯一允许同时依赖 ch-infra 和 ch-app 的地方。**

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use ch_app::{AppStore, ProfileBootstrapCoordinator, StoreConfig};
use ch_core::bootstrap::RetryPolicy;
use ch_core::config::AppConfig;
use ch_core::ports::{
    AuthPort, KeyValueStorePort, NotificationRepositoryPort, ProfileRepositoryPort,
};
use ch_infra::{
    BackendConfig, FileKeyValueStore, RemoteAuthService, RemoteNotificationRepository,
    RemoteProfileRepository, RestBackendClient,
};

/// Result type for wiring operations
pub type WiringResult<T> = Result<T, WiringError>;

/// Errors during dependency injection
/// 依赖注入错误（基础设施初始化失败）
#[derive(Debug, thiserror::Error)]
pub enum WiringError {
    #[error("Data directory resolution failed: {0}")]
    DataDir(String),

    #[error("Backend configuration invalid: {0}")]
    BackendConfig(String),

    #[error("HTTP client initialization failed: {0}")]
    HttpClient(String),
}

/// Everything the runtime needs, already connected.
pub struct AppDeps {
    pub kv: Arc<dyn KeyValueStorePort>,
    pub store: Arc<AppStore>,
    pub backend: Arc<RestBackendClient>,
    pub auth: Arc<dyn AuthPort>,
    pub profiles: Arc<dyn ProfileRepositoryPort>,
    pub notifications: Arc<dyn NotificationRepositoryPort>,
    pub coordinator: Arc<ProfileBootstrapCoordinator>,
}

/// `storage.data_dir` when set, the platform data directory otherwise.
pub fn resolve_data_dir(config: &AppConfig) -> anyhow::Result<PathBuf> {
    if config.data_dir.as_os_str().is_empty() {
        ch_infra::fs::app_data_dir()
    } else {
        Ok(config.data_dir.clone())
    }
}

/// Retry envelope for profile fetches; unset values take the defaults.
pub fn retry_policy(config: &AppConfig) -> RetryPolicy {
    let defaults = RetryPolicy::default();
    let base_delay = match config.bootstrap_retry_base_delay_ms {
        0 => defaults.base_delay,
        ms => Duration::from_millis(ms),
    };
    let max_delay = match config.bootstrap_retry_max_delay_ms {
        0 => defaults.max_delay,
        ms => Duration::from_millis(ms),
    };
    RetryPolicy::new(
        config.bootstrap_max_retries.unwrap_or(defaults.max_retries),
        base_delay,
        max_delay.max(base_delay),
    )
}

/// Wire all dependencies together
/// 将所有依赖连接在一起
///
/// # Errors / 错误
///
/// Fails when the data directory cannot be resolved, the backend URL is not
/// configured or the HTTP client cannot be built. Nothing touches the network
/// or the disk here.
pub fn wire_dependencies(config: &AppConfig) -> WiringResult<AppDeps> {
    let data_dir =
        resolve_data_dir(config).map_err(|e| WiringError::DataDir(format!("{e:#}")))?;
    let kv: Arc<dyn KeyValueStorePort> = Arc::new(FileKeyValueStore::new(data_dir));

    let backend_config = BackendConfig::from_app_config(config)
        .map_err(|e| WiringError::BackendConfig(format!("{e:#}")))?;
    let backend = Arc::new(
        RestBackendClient::new(backend_config, kv.clone())
            .map_err(|e| WiringError::HttpClient(format!("{e:#}")))?,
    );

    let store = AppStore::new(kv.clone(), StoreConfig::from_app_config(config));

    let auth: Arc<dyn AuthPort> = Arc::new(RemoteAuthService::new(backend.clone()));
    let profiles: Arc<dyn ProfileRepositoryPort> =
        Arc::new(RemoteProfileRepository::new(backend.clone()));
    let notifications: Arc<dyn NotificationRepositoryPort> =
        Arc::new(RemoteNotificationRepository::new(backend.clone()));

    let coordinator =
        ProfileBootstrapCoordinator::new(profiles.clone(), store.clone(), retry_policy(config));

    Ok(AppDeps {
        kv,
        store,
        backend,
        auth,
        profiles,
        notifications,
        coordinator,
    })
}
