use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ch_core::auth::OtpKind;
use ch_core::ports::AuthPort;
use ch_core::SessionIdentity;

use crate::store::AppStore;
use crate::usecases::SessionError;

/// Confirm an email address with the one-time code sent to it.
pub struct VerifyOtp {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
}

impl VerifyOtp {
    pub fn new(auth: Arc<dyn AuthPort>, store: Arc<AppStore>) -> Self {
        Self { auth, store }
    }

    pub async fn execute(
        &self,
        email: &str,
        token: &str,
        kind: OtpKind,
    ) -> Result<SessionIdentity, SessionError> {
        let span = info_span!("usecase.verify_otp.execute", email = %email, ?kind);
        async {
            let session = self.auth.verify_otp(email, token.trim(), kind).await?;
            let identity = session.identity();
            self.store.set_session(identity.clone());
            info!(user_id = %identity.user_id, "one-time code verified");
            Ok(identity)
        }
        .instrument(span)
        .await
    }
}

/// Ask the backend to send a new one-time code.
pub struct ResendOtp {
    auth: Arc<dyn AuthPort>,
}

impl ResendOtp {
    pub fn new(auth: Arc<dyn AuthPort>) -> Self {
        Self { auth }
    }

    pub async fn execute(&self, email: &str, kind: OtpKind) -> Result<(), SessionError> {
        self.auth.resend_otp(email, kind).await?;
        info!(email = %email, ?kind, "one-time code resent");
        Ok(())
    }
}
