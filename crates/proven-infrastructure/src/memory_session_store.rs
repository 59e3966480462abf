//! In-process session store shared by several contexts.
//!
//! Every handle opened from the same store sees the same value, and each
//! handle is told about writes made through the others, the way tabs of one
//! browser profile share local storage.

use async_trait::async_trait;
use proven_core::error::Result;
use proven_core::session::{ContextId, SESSION_KEY, SessionStore, StoreChange, StoreSubscription};
use std::sync::Arc;
use tokio::sync::{RwLock, broadcast};

const CHANGE_CHANNEL_CAPACITY: usize = 64;

struct SharedSlot {
    value: RwLock<Option<String>>,
    changes: broadcast::Sender<StoreChange>,
}

/// A handle onto a shared in-memory session slot.
#[derive(Clone)]
pub struct MemorySessionStore {
    slot: Arc<SharedSlot>,
    context: ContextId,
}

impl MemorySessionStore {
    /// Creates an empty store and returns its first handle.
    pub fn new() -> Self {
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Self {
            slot: Arc::new(SharedSlot {
                value: RwLock::new(None),
                changes,
            }),
            context: ContextId::new(),
        }
    }

    /// Opens another context onto the same slot.
    pub fn open_context(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
            context: ContextId::new(),
        }
    }

    /// Puts a raw value in place without notifying anyone, as if it had been
    /// left behind by an earlier run.
    pub async fn seed(&self, value: impl Into<String>) {
        *self.slot.value.write().await = Some(value.into());
    }

    async fn replace(&self, value: Option<String>) {
        {
            let mut slot = self.slot.value.write().await;
            if *slot == value {
                return;
            }
            *slot = value;
        }

        // No receivers simply means no other context is listening.
        let _ = self.slot.changes.send(StoreChange {
            key: SESSION_KEY.to_string(),
            origin: self.context,
        });
    }
}

impl Default for MemorySessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionStore for MemorySessionStore {
    fn context(&self) -> ContextId {
        self.context
    }

    async fn read(&self) -> Result<Option<String>> {
        Ok(self.slot.value.read().await.clone())
    }

    async fn write(&self, value: &str) -> Result<()> {
        self.replace(Some(value.to_string())).await;
        Ok(())
    }

    async fn clear(&self) -> Result<()> {
        self.replace(None).await;
        Ok(())
    }

    fn subscribe(&self) -> StoreSubscription {
        StoreSubscription::new(self.slot.changes.subscribe(), self.context)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_contexts_share_value() {
        let first = MemorySessionStore::new();
        let second = first.open_context();

        first.write(r#"{"id":"1"}"#).await.unwrap();
        assert_eq!(second.read().await.unwrap().as_deref(), Some(r#"{"id":"1"}"#));

        second.clear().await.unwrap();
        assert!(first.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_other_context_is_notified() {
        let first = MemorySessionStore::new();
        let second = first.open_context();
        let mut first_changes = first.subscribe();

        second.write("value").await.unwrap();

        let change = first_changes.next().await.unwrap();
        assert_eq!(change.key, SESSION_KEY);
        assert_eq!(change.origin, second.context());
    }

    #[tokio::test]
    async fn test_own_writes_are_not_echoed() {
        let first = MemorySessionStore::new();
        let second = first.open_context();
        let mut first_changes = first.subscribe();

        first.write("mine").await.unwrap();
        second.write("theirs").await.unwrap();

        let change = first_changes.next().await.unwrap();
        assert_eq!(change.origin, second.context());
    }

    #[tokio::test]
    async fn test_seed_is_silent() {
        let store = MemorySessionStore::new();
        let other = store.open_context();
        let mut changes = other.subscribe();

        store.seed("left over").await;
        store.clear().await.unwrap();

        // Only the clear is announced.
        let change = changes.next().await.unwrap();
        assert_eq!(change.origin, store.context());
        assert!(other.read().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_unchanged_write_is_not_announced() {
        let store = MemorySessionStore::new();
        let other = store.open_context();
        let mut changes = other.subscribe();

        store.clear().await.unwrap();
        store.write("v").await.unwrap();

        let change = changes.next().await.unwrap();
        assert_eq!(change.origin, store.context());
        assert_eq!(other.read().await.unwrap().as_deref(), Some("v"));
    }
}
