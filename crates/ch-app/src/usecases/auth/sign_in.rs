use std::sync::Arc;

use tracing::{info, info_span, Instrument};

use ch_core::auth::{Credentials, SignUpOutcome};
use ch_core::ports::AuthPort;
use ch_core::SessionIdentity;

use crate::store::AppStore;
use crate::usecases::SessionError;

/// Sign in with email and password.
pub struct SignIn {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
}

impl SignIn {
    pub fn new(auth: Arc<dyn AuthPort>, store: Arc<AppStore>) -> Self {
        Self { auth, store }
    }

    pub async fn execute(&self, credentials: &Credentials) -> Result<SessionIdentity, SessionError> {
        let span = info_span!("usecase.sign_in.execute", email = %credentials.email);
        async {
            let session = self.auth.sign_in(credentials).await?;
            let identity = session.identity();
            self.store.set_session(identity.clone());
            info!(user_id = %identity.user_id, "signed in");
            Ok(identity)
        }
        .instrument(span)
        .await
    }
}

/// Register a new account.
///
/// When the backend requires email confirmation no session is recorded; the
/// caller continues with [`VerifyOtp`](super::VerifyOtp).
pub struct SignUp {
    auth: Arc<dyn AuthPort>,
    store: Arc<AppStore>,
}

impl SignUp {
    pub fn new(auth: Arc<dyn AuthPort>, store: Arc<AppStore>) -> Self {
        Self { auth, store }
    }

    pub async fn execute(&self, credentials: &Credentials) -> Result<SignUpOutcome, SessionError> {
        let span = info_span!("usecase.sign_up.execute", email = %credentials.email);
        async {
            let outcome = self.auth.sign_up(credentials).await?;
            match &outcome {
                SignUpOutcome::SignedIn(session) => {
                    self.store.set_session(session.identity());
                    info!(user_id = %session.user_id, "signed up and signed in");
                }
                SignUpOutcome::ConfirmationRequired { email } => {
                    info!(email = %email, "sign-up awaiting email confirmation");
                }
            }
            Ok(outcome)
        }
        .instrument(span)
        .await
    }
}
