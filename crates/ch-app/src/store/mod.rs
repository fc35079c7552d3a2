//! Persisted app store.
//!
//! Single source of truth for session identity, the cached profile summary
//! and the hydration flag. State lives in a `watch` channel so every reader
//! sees a complete snapshot; a background persister writes debounced copies
//! to the durable key-value store.

mod persister;
mod snapshot;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use ch_core::ports::KeyValueStorePort;
use ch_core::{AppConfig, ProfileSummary, SessionIdentity, UserId};

use persister::SnapshotWriter;
pub use snapshot::{AppSnapshot, PersistedEnvelope, PersistedState, PERSIST_VERSION};

pub const DEFAULT_STORE_KEY: &str = "campus-hub.app-store";
pub const DEFAULT_PERSIST_DEBOUNCE: Duration = Duration::from_millis(50);

/// Runtime settings of the app store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Namespace key the snapshot is stored under.
    pub key: String,
    pub persist_debounce: Duration,
}

impl StoreConfig {
    pub fn from_app_config(config: &AppConfig) -> Self {
        let mut store = Self::default();
        if !config.store_key.is_empty() {
            store.key = config.store_key.clone();
        }
        if config.persist_debounce_ms > 0 {
            store.persist_debounce = Duration::from_millis(config.persist_debounce_ms);
        }
        store
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            key: DEFAULT_STORE_KEY.to_string(),
            persist_debounce: DEFAULT_PERSIST_DEBOUNCE,
        }
    }
}

pub struct AppStore {
    kv: Arc<dyn KeyValueStorePort>,
    writer: Arc<SnapshotWriter>,
    config: StoreConfig,
    state: watch::Sender<AppSnapshot>,
    hydration_started: AtomicBool,
}

impl AppStore {
    /// Create an unhydrated store and start its background persister.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(kv: Arc<dyn KeyValueStorePort>, config: StoreConfig) -> Arc<Self> {
        let (state, receiver) = watch::channel(AppSnapshot::default());
        let writer = Arc::new(SnapshotWriter::new(kv.clone(), config.key.clone()));
        persister::spawn(receiver, writer.clone(), config.persist_debounce);
        Arc::new(Self {
            kv,
            writer,
            config,
            state,
            hydration_started: AtomicBool::new(false),
        })
    }

    pub fn snapshot(&self) -> AppSnapshot {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<AppSnapshot> {
        self.state.subscribe()
    }

    pub fn session(&self) -> Option<SessionIdentity> {
        self.state.borrow().session.clone()
    }

    pub fn is_hydrated(&self) -> bool {
        self.state.borrow().hydrated
    }

    /// Load the persisted snapshot and mark the store hydrated.
    ///
    /// Missing, unreadable or corrupt data counts as "no prior state". The
    /// hydration flag becomes true in every outcome. If a session was set
    /// before hydration finished, the in-memory state is kept. Calls after the
    /// first are no-ops.
    pub async fn hydrate(&self) {
        if self.hydration_started.swap(true, Ordering::SeqCst) {
            debug!("app store hydration already started");
            return;
        }

        let persisted = match self.kv.get(&self.config.key).await {
            Ok(Some(raw)) => match PersistedEnvelope::decode(&raw) {
                Ok(envelope) => Some(envelope.state),
                Err(err) => {
                    warn!(key = %self.config.key, error = %err, "discarding corrupt app store snapshot");
                    None
                }
            },
            Ok(None) => None,
            Err(err) => {
                warn!(key = %self.config.key, error = %err, "failed to read app store snapshot");
                None
            }
        };

        let mut restored = false;
        self.state.send_modify(|snapshot| {
            // A sign-in that raced ahead of hydration wins over the stored copy.
            if snapshot.session.is_none() {
                if let Some(persisted) = persisted {
                    if persisted.session.is_some() {
                        snapshot.session_epoch += 1;
                    }
                    snapshot.session = persisted.session;
                    snapshot.profile = persisted.profile;
                    restored = true;
                }
            }
            snapshot.hydrated = true;
        });
        info!(restored, "app store hydrated");
    }

    /// Record a freshly authenticated session.
    ///
    /// Switching to a different user drops the previous user's profile summary.
    pub fn set_session(&self, session: SessionIdentity) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.session.as_ref() == Some(&session) {
                return false;
            }
            let same_user = snapshot
                .session
                .as_ref()
                .map(|current| current.user_id == session.user_id)
                .unwrap_or(false);
            if !same_user {
                snapshot.profile = ProfileSummary::default();
                snapshot.session_epoch += 1;
            }
            info!(user_id = %session.user_id, "session set");
            snapshot.session = Some(session);
            true
        });
    }

    /// Write `summary` for whoever is signed in right now.
    ///
    /// Signed out, this is a no-op and returns `false`.
    pub fn set_profile_summary(&self, summary: ProfileSummary) -> bool {
        match self.session() {
            Some(session) => self.sync_profile_summary(&session.user_id, summary),
            None => {
                debug!("ignoring profile summary while signed out");
                false
            }
        }
    }

    /// Write `summary` only if `user_id` is still the signed-in user.
    ///
    /// Returns whether the summary was applied.
    pub fn sync_profile_summary(&self, user_id: &UserId, summary: ProfileSummary) -> bool {
        let mut applied = false;
        self.state.send_if_modified(|snapshot| {
            let current = snapshot.session.as_ref().map(|s| &s.user_id);
            if current != Some(user_id) {
                debug!(
                    user_id = %user_id,
                    current = ?current,
                    "ignoring profile sync for inactive user"
                );
                return false;
            }
            applied = true;
            if snapshot.profile == summary {
                return false;
            }
            snapshot.profile = summary;
            true
        });
        applied
    }

    /// Clear session identity and profile summary. Idempotent.
    pub fn reset_auth(&self) {
        self.state.send_if_modified(|snapshot| {
            if snapshot.session.is_none() && snapshot.profile == ProfileSummary::default() {
                return false;
            }
            if snapshot.session.take().is_some() {
                snapshot.session_epoch += 1;
            }
            snapshot.profile = ProfileSummary::default();
            info!("auth state reset");
            true
        });
    }

    /// Persist the current snapshot immediately.
    ///
    /// Does nothing before hydration so a cold start cannot clobber stored
    /// state with defaults.
    pub async fn flush(&self) -> anyhow::Result<()> {
        if !self.writer.write_latest(|| self.snapshot()).await? {
            debug!("skipping flush before hydration");
        }
        Ok(())
    }
}
