//! Shell assembly: config → tracing → wiring → runtime.

pub mod config;
pub mod run;
pub mod runtime;
pub mod tracing;
pub mod wiring;
