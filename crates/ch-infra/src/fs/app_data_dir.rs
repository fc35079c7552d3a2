use anyhow::{Context, Result};
use std::path::PathBuf;

pub const APP_DIR_NAME: &str = "campus-hub";

/// Campus Hub data root.
///
/// 获取应用数据根目录。
///
/// # Platform-specific Paths / 平台特定路径
/// - macOS: ~/Library/Application Support/campus-hub
/// - Windows: %APPDATA%\campus-hub
/// - Linux: $XDG_DATA_HOME/campus-hub or ~/.local/share/campus-hub
///
/// Directories are not created here; callers create them on first write.
pub fn app_data_dir() -> Result<PathBuf> {
    let base_dir =
        get_platform_data_dir().context("Failed to get platform-specific data directory")?;

    Ok(base_dir.join(APP_DIR_NAME))
}

/// Directory the shell looks for `config.toml` in.
pub fn app_config_dir() -> Result<PathBuf> {
    let base_dir = dirs::config_dir().context("Failed to get platform-specific config directory")?;
    Ok(base_dir.join(APP_DIR_NAME))
}

/// 日志目录
pub fn log_dir() -> Result<PathBuf> {
    Ok(app_data_dir()?.join("logs"))
}

fn get_platform_data_dir() -> Result<PathBuf> {
    #[cfg(target_os = "linux")]
    {
        // 优先使用 XDG_DATA_HOME
        if let Some(xdg_data_home) = std::env::var_os("XDG_DATA_HOME") {
            return Ok(PathBuf::from(xdg_data_home));
        }
    }

    dirs::data_dir().ok_or_else(|| anyhow::anyhow!("Unable to get platform data directory"))
}
