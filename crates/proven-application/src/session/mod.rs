//! Session lifecycle.
//!
//! - `manager`: per-context state machine, persistence and cross-context sync
//! - `idle`: the inactivity countdown owned by the manager

mod idle;
mod manager;

pub use manager::{IdentityChangeCallback, SessionLifecycleManager};
