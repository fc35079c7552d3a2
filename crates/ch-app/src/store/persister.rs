//! Debounced background persistence of app store snapshots.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{watch, Mutex};
use tracing::{debug, warn};

use ch_core::ports::KeyValueStorePort;

use super::snapshot::{AppSnapshot, PersistedEnvelope};

/// Serialises snapshot writes for one key.
///
/// The snapshot is taken after the write lock is held, so whichever writer
/// goes last also writes the newest state.
pub(super) struct SnapshotWriter {
    kv: Arc<dyn KeyValueStorePort>,
    key: String,
    lock: Mutex<()>,
}

impl SnapshotWriter {
    pub(super) fn new(kv: Arc<dyn KeyValueStorePort>, key: String) -> Self {
        Self {
            kv,
            key,
            lock: Mutex::new(()),
        }
    }

    /// Write the snapshot returned by `latest`. Returns `false` without
    /// writing when the store is not hydrated yet.
    pub(super) async fn write_latest(
        &self,
        latest: impl FnOnce() -> AppSnapshot,
    ) -> anyhow::Result<bool> {
        let _guard = self.lock.lock().await;
        let snapshot = latest();
        if !snapshot.hydrated {
            return Ok(false);
        }
        let raw = PersistedEnvelope::capture(&snapshot).encode()?;
        self.kv.set(&self.key, &raw).await?;
        debug!(key = %self.key, bytes = raw.len(), "app store snapshot persisted");
        Ok(true)
    }
}

/// Spawn the persister task. It ends when the store (the sender) is dropped.
pub(super) fn spawn(
    mut receiver: watch::Receiver<AppSnapshot>,
    writer: Arc<SnapshotWriter>,
    debounce: Duration,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while receiver.changed().await.is_ok() {
            if !debounce.is_zero() {
                tokio::time::sleep(debounce).await;
            }

            // Everything that changed during the debounce window is folded
            // into this single write.
            match writer
                .write_latest(|| receiver.borrow_and_update().clone())
                .await
            {
                Ok(true) => {}
                Ok(false) => debug!("app store not hydrated yet, deferring persistence"),
                Err(err) => {
                    warn!(key = %writer.key, error = %err, "failed to persist app store snapshot")
                }
            }
        }
        debug!("app store persister stopped");
    })
}
