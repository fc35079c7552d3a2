//! File-backed key-value store.
//!
//! One file per key under a base directory. Values are written atomically
//! (temp file + rename) so a crash leaves either the old or the new value.

use anyhow::{Context, Result};
use async_trait::async_trait;
use std::io::Write;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::debug;

use ch_core::ports::KeyValueStorePort;

const VALUE_EXTENSION: &str = "json";

pub struct FileKeyValueStore {
    base_dir: PathBuf,
}

impl FileKeyValueStore {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Path of the file backing `key`.
    ///
    /// Characters outside `[A-Za-z0-9._-]` are replaced so a key can never
    /// escape the base directory.
    pub fn path_for(&self, key: &str) -> PathBuf {
        let mut name: String = key
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if name.is_empty() || name.chars().all(|c| c == '.') {
            name = format!("_{name}");
        }
        self.base_dir.join(format!("{name}.{VALUE_EXTENSION}"))
    }

    async fn ensure_base_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.base_dir)
            .await
            .with_context(|| format!("create store dir failed: {}", self.base_dir.display()))
    }

    async fn atomic_write(&self, path: &Path, content: &str) -> Result<()> {
        self.ensure_base_dir().await?;

        // Each write gets its own temp file, so concurrent writers of one key
        // never share a half-written file; the last rename wins.
        let base_dir = self.base_dir.clone();
        let target = path.to_path_buf();
        let content = content.to_owned();
        tokio::task::spawn_blocking(move || -> Result<()> {
            let mut tmp = tempfile::Builder::new()
                .prefix(".kv-")
                .suffix(".tmp")
                .tempfile_in(&base_dir)
                .with_context(|| format!("create temp value failed in {}", base_dir.display()))?;
            tmp.write_all(content.as_bytes())
                .and_then(|()| tmp.as_file().sync_all())
                .with_context(|| format!("write temp value failed: {}", tmp.path().display()))?;
            tmp.persist(&target).map_err(|err| {
                anyhow::Error::new(err.error).context(format!(
                    "rename temp value to target failed: {}",
                    target.display()
                ))
            })?;
            Ok(())
        })
        .await
        .context("value write task failed")?
    }
}

#[async_trait]
impl KeyValueStorePort for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key);
        match fs::read_to_string(&path).await {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => {
                Err(err).with_context(|| format!("read value failed: {}", path.display()))
            }
        }
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key);
        self.atomic_write(&path, value).await?;
        debug!(key, path = %path.display(), bytes = value.len(), "value written");
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key);
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("remove value failed: {}", path.display()))
            }
        }
    }
}
