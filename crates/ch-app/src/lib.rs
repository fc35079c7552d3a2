//! Campus Hub application orchestration layer.
//!
//! Holds the persisted app store, the profile bootstrap coordinator, the
//! navigation gate and the use cases built on top of the core ports.

pub mod store;
pub mod usecases;

#[cfg(test)]
pub(crate) mod testing;

pub use store::{AppSnapshot, AppStore, StoreConfig};
pub use usecases::bootstrap::{BootstrapStatus, ProfileBootstrapCoordinator};
pub use usecases::navigation_gate::NavigationGate;
pub use usecases::SessionError;
