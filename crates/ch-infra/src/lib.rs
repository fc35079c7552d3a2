//! Infrastructure adapters for Campus Hub.
//!
//! - [`kv`]: durable and in-memory key-value stores
//! - [`remote`]: REST client for the hosted auth + database backend
//! - [`fs`]: platform directories

pub mod fs;
pub mod kv;
pub mod remote;

pub use kv::{FileKeyValueStore, InMemoryKeyValueStore};
pub use remote::{
    BackendConfig, RemoteAuthService, RemoteNotificationRepository, RemoteProfileRepository,
    RestBackendClient,
};
