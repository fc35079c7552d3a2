//! # Use Cases Accessor
//!
//! `AppRuntime` owns the wired [`AppDeps`] and hands out use cases with their
//! ports already attached through [`UseCases`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! # use campus_hub::bootstrap::runtime::AppRuntime;
//! # async fn example(runtime: &AppRuntime) -> Result<(), ch_app::SessionError> {
//! let count = runtime.usecases().get_unread_notification_count().execute().await?;
//! # let _ = count;
//! # Ok(())
//! # }
//! ```
//!
//! ## Adding New Use Cases
//!
//! 1. Ensure the use case has a `new()` constructor taking its required ports
//! 2. Add a method to `UseCases` that calls `new()` with deps

use std::sync::{Arc, Mutex};

use tokio::task::JoinHandle;
use tracing::{info, info_span, warn, Instrument};

use ch_app::usecases::{
    CompleteProfile, DeleteAccount, GetUnreadNotificationCount, RefreshSession, ResendOtp,
    SignIn, SignOut, SignUp, VerifyOtp,
};
use ch_app::{AppStore, NavigationGate, ProfileBootstrapCoordinator};
use ch_core::SessionIdentity;

use super::wiring::AppDeps;

pub struct AppRuntime {
    deps: AppDeps,
    session_watcher: Mutex<Option<JoinHandle<()>>>,
}

impl AppRuntime {
    /// Create a new AppRuntime from dependencies.
    /// 从依赖创建新的 AppRuntime。
    pub fn new(deps: AppDeps) -> Self {
        Self {
            deps,
            session_watcher: Mutex::new(None),
        }
    }

    pub fn store(&self) -> &Arc<AppStore> {
        &self.deps.store
    }

    pub fn coordinator(&self) -> &Arc<ProfileBootstrapCoordinator> {
        &self.deps.coordinator
    }

    pub fn navigation_gate(&self) -> NavigationGate {
        NavigationGate::new(&self.deps.store, &self.deps.coordinator)
    }

    pub fn usecases(&self) -> UseCases<'_> {
        UseCases::new(self)
    }

    /// Restore tokens, hydrate the store and start following the session.
    ///
    /// The persisted token set is authoritative for who is signed in: without
    /// tokens a restored session is dropped, and a token for a different user
    /// replaces it. Calling this twice is a no-op for the watcher.
    pub async fn start(&self) -> anyhow::Result<()> {
        let span = info_span!("runtime.start");
        async {
            let tokens = match self.deps.backend.restore_session().await {
                Ok(identity) => identity,
                Err(err) => {
                    warn!(error = %err, "failed to restore auth token, starting signed out");
                    None
                }
            };

            self.deps.store.hydrate().await;
            self.reconcile_session(tokens);

            let mut watcher = self
                .session_watcher
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner());
            if watcher.is_none() {
                *watcher = Some(self.deps.coordinator.spawn_session_watcher());
            }
            info!(
                signed_in = self.deps.store.session().is_some(),
                "runtime started"
            );
            Ok(())
        }
        .instrument(span)
        .await
    }

    fn reconcile_session(&self, tokens: Option<SessionIdentity>) {
        let stored = self.deps.store.session();
        match (tokens, stored) {
            (None, Some(stored)) => {
                info!(user_id = %stored.user_id, "no auth token for restored session, signing out");
                self.deps.store.reset_auth();
            }
            (Some(tokens), Some(stored)) if tokens.user_id == stored.user_id => {}
            (Some(tokens), _) => self.deps.store.set_session(tokens),
            (None, None) => {}
        }
    }

    /// Stop the session watcher and write pending state to disk.
    pub async fn shutdown(&self) -> anyhow::Result<()> {
        let watcher = self
            .session_watcher
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        if let Some(handle) = watcher {
            handle.abort();
        }
        self.deps.store.flush().await
    }
}

/// Use cases accessor for AppRuntime.
/// AppRuntime 的用例访问器。
pub struct UseCases<'a> {
    runtime: &'a AppRuntime,
}

impl<'a> UseCases<'a> {
    pub fn new(runtime: &'a AppRuntime) -> Self {
        Self { runtime }
    }

    fn deps(&self) -> &AppDeps {
        &self.runtime.deps
    }

    pub fn sign_in(&self) -> SignIn {
        SignIn::new(self.deps().auth.clone(), self.deps().store.clone())
    }

    pub fn sign_up(&self) -> SignUp {
        SignUp::new(self.deps().auth.clone(), self.deps().store.clone())
    }

    pub fn verify_otp(&self) -> VerifyOtp {
        VerifyOtp::new(self.deps().auth.clone(), self.deps().store.clone())
    }

    pub fn resend_otp(&self) -> ResendOtp {
        ResendOtp::new(self.deps().auth.clone())
    }

    pub fn refresh_session(&self) -> RefreshSession {
        RefreshSession::new(self.deps().auth.clone(), self.deps().store.clone())
    }

    pub fn sign_out(&self) -> SignOut {
        SignOut::new(
            self.deps().auth.clone(),
            self.deps().store.clone(),
            self.deps().coordinator.clone(),
        )
    }

    pub fn delete_account(&self) -> DeleteAccount {
        DeleteAccount::new(
            self.deps().auth.clone(),
            self.deps().store.clone(),
            self.deps().coordinator.clone(),
        )
    }

    /// Onboarding submit: writes the profile and re-syncs the summary.
    pub fn complete_profile(&self) -> CompleteProfile {
        CompleteProfile::new(
            self.deps().profiles.clone(),
            self.deps().store.clone(),
            self.deps().coordinator.clone(),
        )
    }

    pub fn get_unread_notification_count(&self) -> GetUnreadNotificationCount {
        GetUnreadNotificationCount::new(
            self.deps().notifications.clone(),
            self.deps().store.clone(),
        )
    }
}
