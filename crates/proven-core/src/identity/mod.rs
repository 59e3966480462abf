//! Identity domain module.
//!
//! - `model`: the authenticated identity and the per-context session state

mod model;

pub use model::{Identity, SessionState, UserId};
