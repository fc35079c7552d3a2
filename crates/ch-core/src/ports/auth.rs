use async_trait::async_trait;

use crate::auth::{AuthSession, Credentials, OtpKind, SignUpOutcome};
use crate::ports::errors::AuthError;

/// Authentication operations of the remote data service.
#[async_trait]
pub trait AuthPort: Send + Sync {
    async fn sign_in(&self, credentials: &Credentials) -> Result<AuthSession, AuthError>;

    async fn sign_up(&self, credentials: &Credentials) -> Result<SignUpOutcome, AuthError>;

    /// Revoke the current session on the backend and forget local tokens.
    async fn sign_out(&self) -> Result<(), AuthError>;

    async fn verify_otp(
        &self,
        email: &str,
        token: &str,
        kind: OtpKind,
    ) -> Result<AuthSession, AuthError>;

    async fn resend_otp(&self, email: &str, kind: OtpKind) -> Result<(), AuthError>;

    /// Exchange the stored refresh token for a new token set.
    async fn refresh_session(&self) -> Result<AuthSession, AuthError>;

    /// Delete the account of the signed-in user.
    async fn delete_account(&self) -> Result<(), AuthError>;
}
