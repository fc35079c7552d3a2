use thiserror::Error;

/// Failure of a remote read or write against a named resource.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("not authorized")]
    Unauthorized,

    #[error("record not found")]
    NotFound,

    #[error("malformed record: {0}")]
    Malformed(String),

    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },
}

impl FetchError {
    /// Whether retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            FetchError::Network(_) | FetchError::Timeout | FetchError::Server { .. }
        )
    }
}

/// Failure of an authentication operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("invalid credentials")]
    InvalidCredentials,

    #[error("email not confirmed")]
    EmailNotConfirmed,

    #[error("invalid or expired one-time password")]
    InvalidOtp,

    #[error("refresh token invalid or revoked")]
    InvalidRefreshToken,

    #[error("not signed in")]
    NotSignedIn,

    #[error("rate limited")]
    RateLimited,

    #[error("network error: {0}")]
    Network(String),

    #[error("backend error {status}: {message}")]
    Backend { status: u16, message: String },
}
