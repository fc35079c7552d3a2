use std::sync::Arc;

use tracing::{info, info_span, warn, Instrument};

use ch_core::ports::AuthPort;
use ch_core::{AuthError, SessionIdentity};

use crate::store::AppStore;
use crate::usecases::SessionError;

/// Exchange the stored refresh token for a fresh token set.
///
/// A revoked or expired refresh token signs the user out locally.
pub struct RefreshSession {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
}

impl RefreshSession {
    pub fn new(auth: Arc<dyn AuthPort>, store: Arc<AppStore>) -> Self {
        Self { auth, store }
    }

    pub async fn execute(&self) -> Result<SessionIdentity, SessionError> {
        let span = info_span!("usecase.refresh_session.execute");
        async {
            match self.auth.refresh_session().await {
                Ok(session) => {
                    let identity = session.identity();
                    self.store.set_session(identity.clone());
                    info!(user_id = %identity.user_id, "session refreshed");
                    Ok(identity)
                }
                Err(AuthError::InvalidRefreshToken) | Err(AuthError::NotSignedIn) => {
                    warn!("refresh token rejected, signing out locally");
                    self.store.reset_auth();
                    Err(SessionError::NotSignedIn)
                }
                Err(err) => Err(err.into()),
            }
        }
        .instrument(span)
        .await
    }
}
