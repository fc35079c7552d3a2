//! Navigation gate.
//!
//! Combines the store's hydration flag and profile completion with the
//! bootstrap loading flag into a [`GateView`]. The decision itself is the
//! pure table in `ch_core::gate`; this type only observes its inputs.
//!
//! A bootstrap status that does not yet belong to the store's session counts
//! as loading: the coordinator has not caught up with the new user.

use tokio::sync::watch;
use tracing::debug;

use ch_core::{GateInputs, GateView, MountPoint};

use crate::store::{AppSnapshot, AppStore};
use crate::usecases::bootstrap::{BootstrapStatus, ProfileBootstrapCoordinator};

pub struct NavigationGate {
    store: watch::Receiver<AppSnapshot>,
    bootstrap: watch::Receiver<BootstrapStatus>,
    last: GateView,
}

impl NavigationGate {
    pub fn new(store: &AppStore, coordinator: &ProfileBootstrapCoordinator) -> Self {
        Self::from_receivers(store.subscribe(), coordinator.subscribe())
    }

    pub fn from_receivers(
        store: watch::Receiver<AppSnapshot>,
        bootstrap: watch::Receiver<BootstrapStatus>,
    ) -> Self {
        let last = evaluate(&store, &bootstrap);
        Self {
            store,
            bootstrap,
            last,
        }
    }

    /// Gate decision for the inputs as they are right now.
    pub fn current(&self) -> GateView {
        evaluate(&self.store, &self.bootstrap)
    }

    /// Wait until the decision differs from the last one returned.
    ///
    /// Returns `None` once both the store and the coordinator are gone.
    pub async fn changed(&mut self) -> Option<GateView> {
        loop {
            let view = self.current();
            if view != self.last {
                debug!(from = ?self.last, to = ?view, "navigation gate changed");
                self.last = view;
                return Some(view);
            }
            let store_open = self.store.has_changed().is_ok();
            let bootstrap_open = self.bootstrap.has_changed().is_ok();
            if !store_open && !bootstrap_open {
                return None;
            }
            tokio::select! {
                res = self.store.changed(), if store_open => {
                    if res.is_err() && !bootstrap_open {
                        return None;
                    }
                }
                res = self.bootstrap.changed(), if bootstrap_open => {
                    if res.is_err() && !store_open {
                        return None;
                    }
                }
            }
        }
    }

    /// Wait for the first non-loading decision and return its mount point.
    pub async fn settled(&mut self) -> Option<MountPoint> {
        if let Some(mount) = self.current().mount_point() {
            self.last = self.current();
            return Some(mount);
        }
        while let Some(view) = self.changed().await {
            if let Some(mount) = view.mount_point() {
                return Some(mount);
            }
        }
        None
    }
}

fn evaluate(
    store: &watch::Receiver<AppSnapshot>,
    bootstrap: &watch::Receiver<BootstrapStatus>,
) -> GateView {
    let (hydrated, completion, user_id) = {
        let snapshot = store.borrow();
        (
            snapshot.hydrated,
            snapshot.profile.completion,
            snapshot.session.as_ref().map(|s| s.user_id.clone()),
        )
    };
    let bootstrap_loading = {
        let status = bootstrap.borrow();
        status.is_loading || !status.is_for(user_id.as_ref())
    };
    GateView::evaluate(GateInputs {
        hydrated,
        bootstrap_loading,
        completion,
    })
}
