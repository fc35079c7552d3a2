//! Profile bootstrap coordinator.
//!
//! Drives [`BootstrapStateMachine`] and executes its actions: spawning tagged
//! profile fetches, cancelling them, and synchronising successful results
//! into the app store.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use tokio::sync::{watch, Mutex};
use tokio::task::{AbortHandle, JoinHandle};
use tracing::{debug, info, info_span, warn, Instrument};

use ch_core::bootstrap::{FetchTag, RetryPolicy};
use ch_core::ports::ProfileRepositoryPort;
use ch_core::{
    BootstrapAction, BootstrapEvent, BootstrapState, BootstrapStateMachine, Completion,
    ProfileRow, ProfileSummary, SessionIdentity, UserId,
};

use super::BootstrapStatus;
use crate::store::AppStore;

struct CoordinatorState {
    machine: BootstrapState,
    generation: u64,
    /// Successful rows by user id, dropped on sign-out.
    cache: HashMap<UserId, ProfileRow>,
    in_flight: Option<AbortHandle>,
    /// Tag of the last result written to the store.
    last_synced: Option<FetchTag>,
}

impl CoordinatorState {
    fn next_tag(&mut self, user_id: UserId) -> FetchTag {
        self.generation += 1;
        FetchTag {
            user_id,
            generation: self.generation,
        }
    }
}

/// Fetches the signed-in user's profile and keeps the store's summary in step.
pub struct ProfileBootstrapCoordinator {
    profiles: Arc<dyn ProfileRepositoryPort>,
    store: Arc<AppStore>,
    policy: RetryPolicy,
    state: Mutex<CoordinatorState>,
    status: watch::Sender<BootstrapStatus>,
    this: Weak<Self>,
}

impl ProfileBootstrapCoordinator {
    pub fn new(
        profiles: Arc<dyn ProfileRepositoryPort>,
        store: Arc<AppStore>,
        policy: RetryPolicy,
    ) -> Arc<Self> {
        let (status, _) = watch::channel(BootstrapStatus::disabled());
        Arc::new_cyclic(|this| Self {
            profiles,
            store,
            policy,
            state: Mutex::new(CoordinatorState {
                machine: BootstrapState::Disabled,
                generation: 0,
                cache: HashMap::new(),
                in_flight: None,
                last_synced: None,
            }),
            status,
            this: this.clone(),
        })
    }

    pub fn status(&self) -> BootstrapStatus {
        self.status.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<BootstrapStatus> {
        self.status.subscribe()
    }

    /// Reconcile with the given session.
    ///
    /// Safe to call on every render: a call with the user id already being
    /// handled returns the current status without fetching again.
    pub async fn bootstrap(&self, session: Option<&SessionIdentity>) -> BootstrapStatus {
        let mut state = self.state.lock().await;
        self.bootstrap_locked(&mut state, session)
    }

    /// Like [`bootstrap`](Self::bootstrap), but a session for the user already
    /// being handled starts over. Used when the store reports that the
    /// identity changed in between, e.g. sign-out and sign-in as the same user.
    async fn restart(&self, session: Option<&SessionIdentity>) -> BootstrapStatus {
        let mut state = self.state.lock().await;
        if let Some(session) = session {
            if state.machine.user_id() == Some(&session.user_id) {
                debug!(user_id = %session.user_id, "session re-established, restarting bootstrap");
                self.dispatch_locked(&mut state, BootstrapEvent::Deactivate);
            }
        }
        self.bootstrap_locked(&mut state, session)
    }

    fn bootstrap_locked(
        &self,
        state: &mut CoordinatorState,
        session: Option<&SessionIdentity>,
    ) -> BootstrapStatus {
        let event = match session {
            None => BootstrapEvent::Deactivate,
            Some(session) => {
                if state.machine.user_id() == Some(&session.user_id) {
                    self.resync_if_cleared(state);
                    return BootstrapStatus::from_state(&state.machine);
                }
                let cached = state.cache.get(&session.user_id).cloned();
                let tag = state.next_tag(session.user_id.clone());
                BootstrapEvent::Activate { tag, cached }
            }
        };
        self.dispatch_locked(state, event)
    }

    /// A ready profile whose summary was wiped from the store is written back.
    fn resync_if_cleared(&self, state: &CoordinatorState) {
        let (Some(tag), Some(profile)) = (state.machine.tag(), state.machine.profile()) else {
            return;
        };
        if self.store.snapshot().profile.completion != Completion::Unknown {
            return;
        }
        if self
            .store
            .sync_profile_summary(&tag.user_id, ProfileSummary::from(profile))
        {
            debug!(user_id = %tag.user_id, "profile summary re-synced");
        }
    }

    /// Re-fetch the current user's profile under a new tag.
    pub async fn refresh(&self) -> BootstrapStatus {
        let mut state = self.state.lock().await;
        let Some(user_id) = state.machine.user_id().cloned() else {
            debug!("refresh requested without an active session");
            return BootstrapStatus::from_state(&state.machine);
        };
        state.cache.remove(&user_id);
        let tag = state.next_tag(user_id);
        self.dispatch_locked(&mut state, BootstrapEvent::Refresh { tag })
    }

    /// Drop every cached profile row.
    pub async fn invalidate_all(&self) {
        let mut state = self.state.lock().await;
        state.cache.clear();
        debug!("profile cache invalidated");
    }

    /// Follow the store's session and bootstrap whenever the signed-in identity changes.
    pub fn spawn_session_watcher(&self) -> JoinHandle<()> {
        let mut sessions = self.store.subscribe();
        let this = self.this.clone();
        tokio::spawn(async move {
            let mut last_epoch: Option<u64> = None;
            loop {
                let (session, epoch) = {
                    let snapshot = sessions.borrow_and_update();
                    (snapshot.session.clone(), snapshot.session_epoch)
                };
                // The channel folds quick changes together, so the epoch, not
                // the user id, tells whether the identity moved in between.
                if last_epoch != Some(epoch) {
                    let Some(coordinator) = this.upgrade() else {
                        break;
                    };
                    if last_epoch.is_none() {
                        coordinator.bootstrap(session.as_ref()).await;
                    } else {
                        coordinator.restart(session.as_ref()).await;
                    }
                    last_epoch = Some(epoch);
                }
                if sessions.changed().await.is_err() {
                    break;
                }
            }
            debug!("session watcher stopped");
        })
    }

    async fn dispatch(&self, event: BootstrapEvent) -> BootstrapStatus {
        let mut state = self.state.lock().await;
        self.dispatch_locked(&mut state, event)
    }

    fn dispatch_locked(
        &self,
        state: &mut CoordinatorState,
        event: BootstrapEvent,
    ) -> BootstrapStatus {
        let _span = info_span!("usecase.profile_bootstrap.dispatch").entered();
        let event_name = event_name(&event);
        let from = std::mem::replace(&mut state.machine, BootstrapState::Disabled);
        let from_name = state_name(&from);
        let (next, actions) = BootstrapStateMachine::transition(from, event, &self.policy);
        if from_name != state_name(&next) {
            info!(from = from_name, to = state_name(&next), event = event_name, "bootstrap state transition");
        }
        state.machine = next;

        for action in actions {
            self.execute(state, action);
        }

        let status = BootstrapStatus::from_state(&state.machine);
        self.status.send_if_modified(|current| {
            if *current == status {
                return false;
            }
            *current = status.clone();
            true
        });
        status
    }

    fn execute(&self, state: &mut CoordinatorState, action: BootstrapAction) {
        debug!(?action, "bootstrap executing action");
        match action {
            BootstrapAction::Fetch { tag, retry, delay } => {
                let Some(this) = self.this.upgrade() else {
                    warn!("coordinator dropped, fetch not started");
                    return;
                };
                let span = info_span!(
                    "usecase.profile_bootstrap.fetch",
                    user_id = %tag.user_id,
                    generation = tag.generation,
                    retry
                );
                let handle = tokio::spawn(
                    async move {
                        if !delay.is_zero() {
                            tokio::time::sleep(delay).await;
                        }
                        let event = match this.profiles.get_by_id(&tag.user_id).await {
                            Ok(profile) => BootstrapEvent::FetchSucceeded { tag, profile },
                            Err(error) => {
                                warn!(error = %error, "profile fetch failed");
                                BootstrapEvent::FetchFailed { tag, error }
                            }
                        };
                        this.dispatch(event).await;
                    }
                    .instrument(span),
                );
                // Superseded fetches were already aborted by CancelFetch; a retry
                // replaces the handle of the task that scheduled it.
                state.in_flight = Some(handle.abort_handle());
            }
            BootstrapAction::CancelFetch => {
                if let Some(handle) = state.in_flight.take() {
                    handle.abort();
                    debug!("in-flight profile fetch cancelled");
                }
            }
            BootstrapAction::SyncProfile { tag, profile } => {
                if state.last_synced.as_ref() == Some(&tag) {
                    debug!(generation = tag.generation, "profile already synced for tag");
                    return;
                }
                let applied = self
                    .store
                    .sync_profile_summary(&tag.user_id, ProfileSummary::from(&profile));
                if applied {
                    state.cache.insert(tag.user_id.clone(), profile);
                    info!(user_id = %tag.user_id, generation = tag.generation, "profile summary synced");
                } else {
                    debug!(user_id = %tag.user_id, "session changed before profile sync, dropped");
                }
                state.last_synced = Some(tag);
            }
        }
    }
}

fn state_name(state: &BootstrapState) -> &'static str {
    match state {
        BootstrapState::Disabled => "disabled",
        BootstrapState::Fetching { .. } => "fetching",
        BootstrapState::Ready { .. } => "ready",
        BootstrapState::Failed { .. } => "failed",
    }
}

fn event_name(event: &BootstrapEvent) -> &'static str {
    match event {
        BootstrapEvent::Activate { .. } => "activate",
        BootstrapEvent::Deactivate => "deactivate",
        BootstrapEvent::Refresh { .. } => "refresh",
        BootstrapEvent::FetchSucceeded { .. } => "fetch_succeeded",
        BootstrapEvent::FetchFailed { .. } => "fetch_failed",
    }
}
