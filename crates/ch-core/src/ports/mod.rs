//! Port interfaces for the application layer
//!
//! Ports define the contract between the application logic (use cases)
//! and infrastructure implementations. The core never talks to the network
//! or the disk directly.

pub mod auth;
pub mod errors;
pub mod key_value;
pub mod notifications;
pub mod profile;

pub use auth::AuthPort;
pub use errors::{AuthError, FetchError};
pub use key_value::KeyValueStorePort;
pub use notifications::NotificationRepositoryPort;
pub use profile::ProfileRepositoryPort;

