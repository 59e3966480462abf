//! Session store trait.
//!
//! The store is the only resource shared between execution contexts. Every
//! context reads it, only lifecycle managers write it, and it is treated as
//! eventually consistent rather than as a lock.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::error::Result;

/// The single key under which the serialized identity is kept.
pub const SESSION_KEY: &str = "user";

/// Identifies one execution context (one "tab") attached to a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContextId(Uuid);

impl ContextId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Origin used for changes that were observed on the backing medium
    /// rather than written through a known context.
    pub fn external() -> Self {
        Self(Uuid::nil())
    }
}

impl Default for ContextId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ContextId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Notification that the value under a key changed.
///
/// Like a browser storage event it carries no guarantee about the current
/// value; receivers read the store again.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    pub key: String,
    pub origin: ContextId,
}

/// Change feed of one context.
///
/// Changes written by the subscribing context itself are filtered out, so a
/// context only ever hears about writes made elsewhere.
pub struct StoreSubscription {
    receiver: broadcast::Receiver<StoreChange>,
    context: ContextId,
}

impl StoreSubscription {
    pub fn new(receiver: broadcast::Receiver<StoreChange>, context: ContextId) -> Self {
        Self { receiver, context }
    }

    /// Waits for the next change made by another context.
    ///
    /// Returns `None` once the store is gone. A lagging receiver yields a
    /// synthetic change so the subscriber re-reads instead of missing one.
    pub async fn next(&mut self) -> Option<StoreChange> {
        loop {
            match self.receiver.recv().await {
                Ok(change) if change.origin == self.context => continue,
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("Store subscription lagged by {} changes", skipped);
                    return Some(StoreChange {
                        key: SESSION_KEY.to_string(),
                        origin: ContextId::external(),
                    });
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

/// Durable, cross-context key-value persistence for the current identity.
///
/// Each value is one handle bound to one execution context. Handles of the
/// same backing medium observe each other's writes through `subscribe`.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// The context this handle writes as.
    fn context(&self) -> ContextId;

    /// Reads the raw value under [`SESSION_KEY`].
    async fn read(&self) -> Result<Option<String>>;

    /// Replaces the raw value under [`SESSION_KEY`].
    async fn write(&self, value: &str) -> Result<()>;

    /// Removes the value under [`SESSION_KEY`].
    async fn clear(&self) -> Result<()>;

    /// Subscribes to changes made by other contexts.
    fn subscribe(&self) -> StoreSubscription;
}
