//! Profile bootstrap domain module.
//!
//! Pure state machine deciding when the authoritative profile is fetched,
//! retried, synchronised into the app store, or discarded as stale.

mod policy;
pub mod state_machine;

pub use policy::RetryPolicy;
pub use state_machine::{
    BootstrapAction, BootstrapEvent, BootstrapState, BootstrapStateMachine, FetchTag,
};
