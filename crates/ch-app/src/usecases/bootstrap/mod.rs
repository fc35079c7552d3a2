mod coordinator;
mod status;

pub use coordinator::ProfileBootstrapCoordinator;
pub use status::BootstrapStatus;
