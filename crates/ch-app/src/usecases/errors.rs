use thiserror::Error;

use ch_core::{AuthError, FetchError};

/// Failure of a use case that acts on behalf of the signed-in user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no user is signed in")]
    NotSignedIn,

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error(transparent)]
    Fetch(#[from] FetchError),
}
