//! Domain layer of the Proven client.
//!
//! Holds the identity and session models, the session store and collaborator
//! traits, the owned resource records, and the derived dashboard metrics.
//! Nothing in here performs I/O; implementations live in
//! `proven-infrastructure` and orchestration in `proven-application`.

pub mod auth;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod identity;
pub mod resource;
pub mod session;

mod serde_util;

// Re-export common error type
pub use error::ProvenError;
pub use serde_util::parse_date;
