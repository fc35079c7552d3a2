//! # ch-core
//!
//! Core domain models and business logic for Campus Hub.
//!
//! This crate contains pure business logic without any infrastructure dependencies.

// Public module exports
pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod gate;
pub mod ids;
pub mod ports;
pub mod profile;
pub mod session;

// Re-export commonly used types at the crate root
pub use bootstrap::{BootstrapAction, BootstrapEvent, BootstrapState, BootstrapStateMachine};
pub use config::AppConfig;
pub use gate::{GateInputs, GateView, MountPoint};
pub use ids::UserId;
pub use ports::errors::{AuthError, FetchError};
pub use profile::{Completion, ProfileRow, ProfileSummary, ProfileUpdate};
pub use session::SessionIdentity;
