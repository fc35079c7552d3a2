use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use ch_core::ports::AuthPort;

use crate::store::AppStore;
use crate::usecases::bootstrap::ProfileBootstrapCoordinator;
use crate::usecases::SessionError;

/// Sign the user out. Always leaves the client signed out.
pub struct SignOut {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
    coordinator: Arc<ProfileBootstrapCoordinator>,
}

impl SignOut {
    pub fn new(
        auth: Arc<dyn AuthPort>,
        store: Arc<AppStore>,
        coordinator: Arc<ProfileBootstrapCoordinator>,
    ) -> Self {
        Self {
            auth,
            store,
            coordinator,
        }
    }

    pub async fn execute(&self) {
        let span = info_span!("usecase.sign_out.execute");
        async {
            if let Err(err) = self.auth.sign_out().await {
                warn!(error = %err, "remote sign-out failed, clearing local session anyway");
            }
            teardown(&self.store, &self.coordinator).await;
            info!("signed out");
        }
        .instrument(span)
        .await
    }
}

/// Delete the signed-in user's account, then sign out locally.
pub struct DeleteAccount {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
    coordinator: Arc<ProfileBootstrapCoordinator>,
}

impl DeleteAccount {
    pub fn new(
        auth: Arc<dyn AuthPort>,
        store: Arc<AppStore>,
        coordinator: Arc<ProfileBootstrapCoordinator>,
    ) -> Self {
        Self {
            auth,
            store,
            coordinator,
        }
    }

    pub async fn execute(&self) -> Result<(), SessionError> {
        let span = info_span!("usecase.delete_account.execute");
        async {
            let session = self.store.session().ok_or(SessionError::NotSignedIn)?;
            self.auth.delete_account().await?;
            teardown(&self.store, &self.coordinator).await;
            info!(user_id = %session.user_id, "account deleted");
            Ok(())
        }
        .instrument(span)
        .await
    }
}

async fn teardown(store: &AppStore, coordinator: &ProfileBootstrapCoordinator) {
    store.reset_auth();
    coordinator.invalidate_all().await;
}
