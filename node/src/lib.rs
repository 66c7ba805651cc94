//! The vouch node: wires every component into the operation surface the
//! outer request layer consumes.

pub mod config;
pub mod error;
pub mod service;

pub use config::NodeConfig;
pub use error::NodeError;
pub use service::{CredentialListing, GuarantorService, PaginationMeta, ServiceStats};
