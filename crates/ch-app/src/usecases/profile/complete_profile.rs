use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ch_core::ports::ProfileRepositoryPort;
use ch_core::{ProfileRow, ProfileUpdate};

use crate::store::AppStore;
use crate::usecases::bootstrap::ProfileBootstrapCoordinator;
use crate::usecases::SessionError;

/// Save the onboarding form and mark the profile complete.
///
/// The store's summary is not written here. The coordinator re-fetches the
/// row and synchronises it, which moves the gate from onboarding to main.
pub struct CompleteProfile {
    profiles: Arc<dyn ProfileRepositoryPort>,
    store: Arc<AppStore>,
    coordinator: Arc<ProfileBootstrapCoordinator>,
}

impl CompleteProfile {
    pub fn new(
        profiles: Arc<dyn ProfileRepositoryPort>,
        store: Arc<AppStore>,
        coordinator: Arc<ProfileBootstrapCoordinator>,
    ) -> Self {
        Self {
            profiles,
            store,
            coordinator,
        }
    }

    pub async fn execute(&self, update: ProfileUpdate) -> Result<ProfileRow, SessionError> {
        let session = self.store.session().ok_or(SessionError::NotSignedIn)?;
        let span = info_span!("usecase.complete_profile.execute", user_id = %session.user_id);
        async {
            let update = ProfileUpdate {
                completed: Some(true),
                ..update
            };
            let row = self.profiles.update(&session.user_id, &update).await?;
            info!("profile marked complete");
            self.coordinator.refresh().await;
            Ok(row)
        }
        .instrument(span)
        .await
    }
}
