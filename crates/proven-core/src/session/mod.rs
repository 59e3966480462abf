//! Session domain module.
//!
//! # Module Structure
//!
//! - `store`: the cross-context session store trait and its change feed
//! - `persisted`: encoding of the identity kept in the store
//! - `event`: transitions, activity signals, routes and snapshots

mod event;
mod persisted;
mod store;

pub use event::{ActivitySignal, Route, SessionEvent, SessionSnapshot, SignOutReason};
pub use persisted::PersistedSession;
pub use store::{ContextId, SESSION_KEY, SessionStore, StoreChange, StoreSubscription};
