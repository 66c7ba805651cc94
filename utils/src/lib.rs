//! Shared utilities for the vouch service.

pub mod logging;

pub use logging::init_tracing;
