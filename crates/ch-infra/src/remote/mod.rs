//! REST adapters for the hosted backend.
//!
//! The backend exposes a GoTrue style auth API under `/auth/v1` and a
//! PostgREST style table API under `/rest/v1`. One [`RestBackendClient`]
//! holds the HTTP client and the token set; the port adapters share it.

mod auth;
mod client;
mod config;
mod errors;
mod notifications;
mod profiles;

pub use auth::RemoteAuthService;
pub use client::{RestBackendClient, AUTH_TOKEN_KEY};
pub use config::{BackendConfig, DEFAULT_REQUEST_TIMEOUT};
pub use notifications::RemoteNotificationRepository;
pub use profiles::RemoteProfileRepository;
