//! Logging setup.
//!
//! The library only emits `tracing` events; binaries and the Python module
//! decide where they go by calling [`init_tracing`] once at startup.

mod tracing;

pub use self::tracing::{env_filter, init_tracing};
