//! File-backed session store shared between processes.
//!
//! The identity lives in a single JSON file. Each store polls the file and
//! announces content it did not write itself, which is how one process
//! learns that another logged in or out.

use async_trait::async_trait;
use proven_core::error::{ProvenError, Result};
use proven_core::session::{ContextId, SESSION_KEY, SessionStore, StoreChange, StoreSubscription};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;

use crate::storage::AtomicFile;

const CHANGE_CHANNEL_CAPACITY: usize = 16;

/// Session store persisted to a file and watched by polling.
pub struct FileSessionStore {
    file: AtomicFile,
    context: ContextId,
    changes: broadcast::Sender<StoreChange>,
    /// Content as of the last read or write by this store.
    last_seen: Arc<Mutex<Option<String>>>,
    watcher: JoinHandle<()>,
}

impl FileSessionStore {
    /// Opens the store and starts watching the file.
    ///
    /// Must be called from within a tokio runtime.
    pub async fn open(path: PathBuf, poll_interval: Duration) -> Result<Self> {
        let file = AtomicFile::new(path);
        let initial = load_blocking(file.clone()).await?;
        let last_seen = Arc::new(Mutex::new(initial));
        let (changes, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);

        let watcher = tokio::spawn(watch_file(
            file.clone(),
            Arc::clone(&last_seen),
            changes.clone(),
            poll_interval,
        ));

        tracing::debug!(path = %file.path().display(), "Session file store opened");

        Ok(Self {
            file,
            context: ContextId::new(),
            changes,
            last_seen,
            watcher,
        })
    }

    async fn replace(&self, value: Option<String>) -> Result<()> {
        let mut last_seen = self.last_seen.lock().await;
        let file = self.file.clone();
        let content = value.clone();
        tokio::task::spawn_blocking(move || match content {
            Some(content) => file.store(&content),
            None => file.remove(),
        })
        .await
        .map_err(|e| ProvenError::internal(format!("Failed to join task: {}", e)))??;
        *last_seen = value;
        Ok(())
    }
}

impl Drop for FileSessionStore {
    fn drop(&mut self) {
        self.watcher.abort();
    }
}

async fn load_blocking(file: AtomicFile) -> Result<Option<String>> {
    let content = tokio::task::spawn_blocking(move || file.load())
        .await
        .map_err(|e| ProvenError::internal(format!("Failed to join task: {}", e)))??;
    Ok(content)
}

async fn watch_file(
    file: AtomicFile,
    last_seen: Arc<Mutex<Option<String>>>,
    changes: broadcast::Sender<StoreChange>,
    poll_interval: Duration,
) {
    let mut ticker = tokio::time::interval(poll_interval);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        ticker.tick().await;

        // Held across the read so a concurrent write by this store cannot be
        // mistaken for a foreign one.
        let mut seen = last_seen.lock().await;
        let current = match load_blocking(file.clone()).await {
            Ok(current) => current,
            Err(e) => {
                tracing::debug!("Session file poll failed: {}", e);
                continue;
            }
        };

        if *seen != current {
            *seen = current;
            drop(seen);
            tracing::debug!(path = %file.path().display(), "Session file changed externally");
            let _ = changes.send(StoreChange {
                key: SESSION_KEY.to_string(),
                origin: ContextId::external(),
            });
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    fn context(&self) -> ContextId {
        self.context
    }

    async fn read(&self) -> Result<Option<String>> {
        let mut last_seen = self.last_seen.lock().await;
        let current = load_blocking(self.file.clone()).await?;
        *last_seen = current.clone();
        Ok(current)
    }

    async fn write(&self, value: &str) -> Result<()> {
        self.replace(Some(value.to_string())).await
    }

    async fn clear(&self) -> Result<()> {
        self.replace(None).await
    }

    fn subscribe(&self) -> StoreSubscription {
        StoreSubscription::new(self.changes.subscribe(), self.context)
    }
}
