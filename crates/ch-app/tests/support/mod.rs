//! Controllable fakes for the integration tests.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use ch_app::{AppStore, BootstrapStatus, NavigationGate, ProfileBootstrapCoordinator, StoreConfig};
use ch_core::bootstrap::RetryPolicy;
use ch_core::ports::{KeyValueStorePort, ProfileRepositoryPort};
use ch_core::{FetchError, ProfileRow, ProfileUpdate, UserId};

pub const STORE_KEY: &str = "test.app-store";
pub const WAIT: Duration = Duration::from_secs(2);

/// A latch that stays open once opened.
#[derive(Clone)]
pub struct Gate(Arc<watch::Sender<bool>>);

impl Gate {
    pub fn closed() -> Self {
        Self(Arc::new(watch::channel(false).0))
    }

    pub fn open(&self) {
        self.0.send_replace(true);
    }

    pub async fn pass(&self) {
        let mut rx = self.0.subscribe();
        let _ = rx.wait_for(|open| *open).await.is_ok();
    }
}

/// Key-value store whose reads wait for a gate.
#[derive(Default)]
pub struct GatedKeyValueStore {
    values: Mutex<HashMap<String, String>>,
    read_gate: Option<Gate>,
}

impl GatedKeyValueStore {
    pub fn open() -> Self {
        Self::default()
    }

    pub fn gated(gate: Gate) -> Self {
        Self {
            values: Mutex::new(HashMap::new()),
            read_gate: Some(gate),
        }
    }

    pub fn with_value(self, key: &str, value: &str) -> Self {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        self
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().unwrap().get(key).cloned()
    }
}

#[async_trait]
impl KeyValueStorePort for GatedKeyValueStore {
    async fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
        if let Some(gate) = &self.read_gate {
            gate.pass().await;
        }
        Ok(self.value(key))
    }

    async fn set(&self, key: &str, value: &str) -> anyhow::Result<()> {
        self.values
            .lock()
            .unwrap()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    async fn remove(&self, key: &str) -> anyhow::Result<()> {
        self.values.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Key-value store whose reads never complete.
pub struct HangingKeyValueStore;

#[async_trait]
impl KeyValueStorePort for HangingKeyValueStore {
    async fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        futures::future::pending().await
    }

    async fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        Ok(())
    }

    async fn remove(&self, _key: &str) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Profile repository answering per user once that user's gate opens.
#[derive(Default)]
pub struct GatedProfiles {
    rows: Mutex<HashMap<UserId, (ProfileRow, Gate)>>,
    calls: AtomicUsize,
}

impl GatedProfiles {
    /// Register `row`; its fetch blocks until [`release`](Self::release).
    pub fn hold(&self, row: ProfileRow) -> Gate {
        let gate = Gate::closed();
        self.rows
            .lock()
            .unwrap()
            .insert(row.id.clone(), (row, gate.clone()));
        gate
    }

    /// Register `row` for immediate answers.
    pub fn serve(&self, row: ProfileRow) {
        self.hold(row).open();
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProfileRepositoryPort for GatedProfiles {
    async fn get_by_id(&self, id: &UserId) -> Result<ProfileRow, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let entry = self.rows.lock().unwrap().get(id).cloned();
        let Some((row, gate)) = entry else {
            return Err(FetchError::NotFound);
        };
        gate.pass().await;
        Ok(row)
    }

    async fn update(&self, _id: &UserId, _update: &ProfileUpdate) -> Result<ProfileRow, FetchError> {
        Err(FetchError::NotFound)
    }
}

pub fn row(id: &str, completed: Option<bool>, full_name: Option<&str>) -> ProfileRow {
    let mut row = ProfileRow::empty(id);
    row.completed = completed;
    row.full_name = full_name.map(str::to_string);
    row
}

pub fn store_config() -> StoreConfig {
    StoreConfig {
        key: STORE_KEY.into(),
        persist_debounce: Duration::from_millis(5),
    }
}

/// Store, coordinator and gate wired the way the shell wires them.
pub struct Harness {
    pub store: Arc<AppStore>,
    pub coordinator: Arc<ProfileBootstrapCoordinator>,
    pub gate: NavigationGate,
    watcher: JoinHandle<()>,
}

impl Harness {
    pub fn new(kv: Arc<dyn KeyValueStorePort>, profiles: Arc<dyn ProfileRepositoryPort>) -> Self {
        let store = AppStore::new(kv, store_config());
        let coordinator = ProfileBootstrapCoordinator::new(
            profiles,
            store.clone(),
            RetryPolicy::new(0, Duration::from_millis(1), Duration::from_millis(1)),
        );
        let watcher = coordinator.spawn_session_watcher();
        let gate = NavigationGate::new(&store, &coordinator);
        Self {
            store,
            coordinator,
            gate,
            watcher,
        }
    }

    pub fn spawn_hydrate(&self) -> JoinHandle<()> {
        let store = self.store.clone();
        tokio::spawn(async move { store.hydrate().await })
    }

    /// Wait until the bootstrap status satisfies `f`.
    pub async fn wait_status(&self, f: impl FnMut(&BootstrapStatus) -> bool) {
        let mut rx = self.coordinator.subscribe();
        tokio::time::timeout(WAIT, rx.wait_for(f))
            .await
            .expect("bootstrap status reached")
            .expect("coordinator alive");
    }

    /// Wait until a fetch for the current session has been issued.
    pub async fn wait_fetch_started(&self) {
        self.wait_status(|s| s.is_loading).await;
    }
}

impl Drop for Harness {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}
