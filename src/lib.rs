//! Campus Hub headless shell.
//!
//! Loads configuration, initialises tracing and assembles the store, the
//! profile bootstrap coordinator and the navigation gate from the adapters in
//! `ch-infra`.

pub mod bootstrap;
