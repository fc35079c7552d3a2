//! # Configuration Loader / 配置加载器
//!
//! Reads the TOML file and maps it onto the [`AppConfig`] DTO. No validation
//! and no defaults happen here; runtime configs (`StoreConfig`,
//! `BackendConfig`, `RetryPolicy`) fill gaps when they are built.
//!
//! 仅纯数据加载。接受文件中的任何内容。

use anyhow::Context;
use std::path::{Path, PathBuf};

use ch_core::config::AppConfig;

/// Environment variable overriding the config file location.
pub const CONFIG_PATH_ENV: &str = "CAMPUS_HUB_CONFIG";
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Where the loaded configuration came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    File(PathBuf),
    /// No file at the given path; empty values were used.
    Defaults(PathBuf),
}

/// Load configuration from a TOML file
/// 从 TOML 文件加载配置
///
/// # Errors / 错误
///
/// Returns error if the file cannot be read or is not valid TOML.
pub fn load_config(config_path: &Path) -> anyhow::Result<AppConfig> {
    let content = std::fs::read_to_string(config_path)
        .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;
    let toml_value: toml::Value =
        toml::from_str(&content).context("Failed to parse config as TOML")?;
    AppConfig::from_toml(&toml_value)
}

/// `$CAMPUS_HUB_CONFIG`, or `config.toml` in the platform config directory.
pub fn resolve_config_path() -> anyhow::Result<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_PATH_ENV) {
        return Ok(PathBuf::from(path));
    }
    Ok(ch_infra::fs::app_config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the shell configuration, falling back to empty values when no file
/// exists. A file that exists but cannot be parsed is an error.
pub fn load_app_config() -> anyhow::Result<(AppConfig, ConfigSource)> {
    let path = resolve_config_path()?;
    load_or_default(path)
}

fn load_or_default(path: PathBuf) -> anyhow::Result<(AppConfig, ConfigSource)> {
    if !path.exists() {
        return Ok((AppConfig::empty(), ConfigSource::Defaults(path)));
    }
    let config = load_config(&path)?;
    Ok((config, ConfigSource::File(path)))
}
