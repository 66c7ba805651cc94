//! Authoritative guarantor-progress state.
//!
//! One record per credential, each behind its own lock: mutation of a given
//! credential is linearized while distinct credentials update fully in
//! parallel. Expiry is applied lazily when a record is touched; there is no
//! background sweep.

pub mod error;
pub mod tracker;

pub use error::ProgressError;
pub use tracker::{ProgressTracker, TrackerStats};
