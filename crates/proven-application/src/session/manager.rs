//! Session lifecycle manager.
//!
//! One manager runs per execution context. It owns the context's
//! [`SessionState`], the only writer of the shared session store from that
//! context, and the idle timer. Changes made by other contexts arrive through
//! the store's change feed and are folded in by a background listener.
//!
//! Lock order is `transition` before `idle`. Every state change happens while
//! holding `transition`, so local calls, timer expiry and external changes
//! are applied one at a time.

use proven_core::config::AppConfig;
use proven_core::error::{ProvenError, Result};
use proven_core::identity::{Identity, SessionState};
use proven_core::session::{
    ActivitySignal, PersistedSession, Route, SESSION_KEY, SessionEvent, SessionSnapshot,
    SessionStore, SignOutReason, StoreSubscription,
};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{Mutex, RwLock, broadcast, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::idle::IdleTimer;

/// Called inside every transition that changes the current identity.
///
/// Receives the new identity, or `None` when the session ended. Runs before
/// the new state is published, so dependants can drop per-user data first.
pub type IdentityChangeCallback = Arc<dyn Fn(Option<&Identity>) + Send + Sync>;

const EVENT_CAPACITY: usize = 32;

/// Owns the authentication state of one execution context.
#[derive(Clone)]
pub struct SessionLifecycleManager {
    inner: Arc<ManagerInner>,
}

struct ManagerInner {
    store: Arc<dyn SessionStore>,
    idle_timeout: Duration,
    snapshot: watch::Sender<SessionSnapshot>,
    events: broadcast::Sender<SessionEvent>,
    initialized: AtomicBool,
    transition: Mutex<()>,
    idle: Mutex<Option<IdleTimer>>,
    idle_epoch: AtomicU64,
    identity_callback: RwLock<Option<IdentityChangeCallback>>,
    sync_listener: Mutex<Option<JoinHandle<()>>>,
    shutdown: CancellationToken,
}

impl SessionLifecycleManager {
    /// Creates a manager in the `Initializing` state.
    ///
    /// Nothing is read until [`initialize`](Self::initialize) runs.
    pub fn new(store: Arc<dyn SessionStore>, idle_timeout: Duration) -> Self {
        let (snapshot, _) = watch::channel(SessionSnapshot::default());
        let (events, _) = broadcast::channel(EVENT_CAPACITY);

        Self {
            inner: Arc::new(ManagerInner {
                store,
                idle_timeout,
                snapshot,
                events,
                initialized: AtomicBool::new(false),
                transition: Mutex::new(()),
                idle: Mutex::new(None),
                idle_epoch: AtomicU64::new(0),
                identity_callback: RwLock::new(None),
                sync_listener: Mutex::new(None),
                shutdown: CancellationToken::new(),
            }),
        }
    }

    pub fn from_config(store: Arc<dyn SessionStore>, config: &AppConfig) -> Self {
        Self::new(store, config.idle_timeout())
    }

    /// Installs the identity-change hook, replacing any previous one.
    pub async fn set_identity_change_callback(&self, callback: IdentityChangeCallback) {
        *self.inner.identity_callback.write().await = Some(callback);
    }

    /// Reads the persisted identity once and settles the initial state.
    ///
    /// Later calls return the current state without touching the store.
    /// Storage failures and unusable payloads both resolve to `Anonymous`.
    pub async fn initialize(&self) -> SessionState {
        self.inner.initialize().await
    }

    /// Establishes a session for an identity the credential service issued.
    ///
    /// Only valid while `Anonymous` or `Initializing`. The identity is
    /// persisted before the state changes; a failed write leaves the state
    /// untouched.
    pub async fn login(&self, identity: Identity) -> Result<()> {
        self.inner.login(identity).await
    }

    /// Ends the session. Valid from any state.
    ///
    /// The in-memory transition to `Anonymous` always happens; an error is
    /// returned only if clearing the store failed.
    pub async fn logout(&self) -> Result<()> {
        self.inner.logout().await
    }

    /// Restarts the idle countdown. A no-op when no session is active.
    pub async fn record_activity(&self, signal: ActivitySignal) {
        let idle = self.inner.idle.lock().await;
        if let Some(timer) = idle.as_ref() {
            tracing::trace!("Activity {:?} restarted idle timer", signal);
            timer.touch();
        }
    }

    /// Moves the route indicator of this context.
    pub fn navigate(&self, route: Route) {
        self.inner.snapshot.send_modify(|snapshot| snapshot.route = route);
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.inner.snapshot.borrow().clone()
    }

    pub fn state(&self) -> SessionState {
        self.inner.current_state()
    }

    pub fn identity(&self) -> Option<Identity> {
        self.inner.current_state().identity().cloned()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.snapshot.borrow().loading
    }

    pub fn idle_timeout(&self) -> Duration {
        self.inner.idle_timeout
    }

    /// Receiver that always holds the latest snapshot.
    pub fn subscribe_state(&self) -> watch::Receiver<SessionSnapshot> {
        self.inner.snapshot.subscribe()
    }

    /// Receiver of sign-in and sign-out transitions from now on.
    pub fn subscribe_events(&self) -> broadcast::Receiver<SessionEvent> {
        self.inner.events.subscribe()
    }

    /// Whether an idle countdown is currently running.
    pub async fn idle_timer_armed(&self) -> bool {
        self.inner.idle.lock().await.is_some()
    }

    /// Stops the change listener and the idle timer. State is left as is.
    pub async fn shutdown(&self) {
        self.inner.shutdown.cancel();
        self.inner.idle.lock().await.take();
        if let Some(handle) = self.inner.sync_listener.lock().await.take() {
            handle.abort();
        }
    }
}

impl ManagerInner {
    fn current_state(&self) -> SessionState {
        self.snapshot.borrow().state.clone()
    }

    async fn initialize(self: &Arc<Self>) -> SessionState {
        let _transition = self.transition.lock().await;
        if self.initialized.swap(true, Ordering::SeqCst) {
            return self.current_state();
        }

        // Subscribe before reading so no change between the two is lost.
        self.ensure_sync_listener().await;

        let raw = match self.store.read().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to read persisted session: {}", e);
                None
            }
        };

        match PersistedSession::decode(raw.as_deref()) {
            PersistedSession::Valid(identity) => {
                tracing::info!("Restored session for user {}", identity.id);
                self.enter_authenticated(identity).await;
            }
            PersistedSession::Absent => {
                self.snapshot.send_modify(|snapshot| {
                    snapshot.state = SessionState::Anonymous;
                    snapshot.loading = false;
                });
            }
            PersistedSession::Malformed(reason) => {
                tracing::warn!("Discarding malformed persisted session: {}", reason);
                self.clear_store().await;
                self.snapshot.send_modify(|snapshot| {
                    snapshot.state = SessionState::Anonymous;
                    snapshot.loading = false;
                });
            }
        }

        self.current_state()
    }

    async fn login(self: &Arc<Self>, identity: Identity) -> Result<()> {
        if !identity.is_valid() {
            return Err(ProvenError::validation("Identity has no id"));
        }

        let _transition = self.transition.lock().await;
        let current = self.current_state();
        if current.is_authenticated() {
            return Err(ProvenError::InvalidTransition {
                action: "log in",
                state: current.name(),
            });
        }

        let payload = PersistedSession::encode(&identity)?;
        self.store.write(&payload).await?;

        self.initialized.store(true, Ordering::SeqCst);
        self.ensure_sync_listener().await;

        tracing::info!("User {} logged in", identity.id);
        self.enter_authenticated(identity).await;
        Ok(())
    }

    async fn logout(self: &Arc<Self>) -> Result<()> {
        let _transition = self.transition.lock().await;
        self.initialized.store(true, Ordering::SeqCst);
        self.ensure_sync_listener().await;

        let cleared = self.store.clear().await;
        if let Err(e) = &cleared {
            tracing::warn!("Failed to clear persisted session on logout: {}", e);
        }
        self.end_session(SignOutReason::Voluntary).await;
        cleared
    }

    /// Called by the idle timer of `epoch` when its countdown reaches zero.
    async fn expire(self: &Arc<Self>, epoch: u64) {
        let _transition = self.transition.lock().await;
        let current = self.idle.lock().await.as_ref().map(IdleTimer::epoch);
        if current != Some(epoch) {
            return;
        }

        tracing::info!(
            "Session expired after {}s of inactivity",
            self.idle_timeout.as_secs()
        );
        self.clear_store().await;
        self.end_session(SignOutReason::Expired).await;
    }

    /// Folds a change made by another context into this one.
    async fn apply_external_change(self: &Arc<Self>) {
        let _transition = self.transition.lock().await;
        if !self.initialized.load(Ordering::SeqCst) {
            return;
        }

        let raw = match self.store.read().await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!("Failed to re-read session after external change: {}", e);
                return;
            }
        };

        match PersistedSession::decode(raw.as_deref()) {
            PersistedSession::Valid(identity) => match self.current_state() {
                SessionState::Authenticated(current) if current == identity => {}
                SessionState::Authenticated(current) => {
                    tracing::info!(
                        "Session switched from user {} to {} in another context",
                        current.id,
                        identity.id
                    );
                    self.notify_identity(Some(&identity)).await;
                    self.snapshot.send_modify(|snapshot| {
                        snapshot.state = SessionState::Authenticated(identity.clone());
                    });
                    let _ = self.events.send(SessionEvent::SignedIn { identity });
                }
                _ => {
                    tracing::info!("Adopted session of user {} from another context", identity.id);
                    self.enter_authenticated(identity).await;
                }
            },
            PersistedSession::Absent => {
                self.end_session(SignOutReason::External).await;
            }
            PersistedSession::Malformed(reason) => {
                tracing::warn!("Another context left a malformed session: {}", reason);
                self.clear_store().await;
                self.end_session(SignOutReason::External).await;
            }
        }
    }

    /// Publishes `Authenticated`, arms a fresh idle timer and emits `SignedIn`.
    async fn enter_authenticated(self: &Arc<Self>, identity: Identity) {
        self.notify_identity(Some(&identity)).await;
        self.snapshot.send_modify(|snapshot| {
            snapshot.state = SessionState::Authenticated(identity.clone());
            snapshot.loading = false;
        });
        self.arm_idle_timer().await;
        let _ = self.events.send(SessionEvent::SignedIn { identity });
    }

    /// Publishes `Anonymous` at the entry route and disarms the idle timer.
    ///
    /// `SignedOut` is only emitted when a session was actually active.
    async fn end_session(&self, reason: SignOutReason) {
        self.idle.lock().await.take();

        let was_authenticated = self.current_state().is_authenticated();
        if was_authenticated {
            self.notify_identity(None).await;
        }

        self.snapshot.send_modify(|snapshot| {
            snapshot.state = SessionState::Anonymous;
            snapshot.loading = false;
            snapshot.route = Route::entry();
        });

        if was_authenticated {
            tracing::info!("Session ended ({:?})", reason);
            let _ = self.events.send(SessionEvent::SignedOut { reason });
        }
    }

    async fn arm_idle_timer(self: &Arc<Self>) {
        let epoch = self.idle_epoch.fetch_add(1, Ordering::SeqCst) + 1;
        let weak = Arc::downgrade(self);
        let timer = IdleTimer::arm(epoch, self.idle_timeout, move |epoch| async move {
            if let Some(inner) = weak.upgrade() {
                inner.expire(epoch).await;
            }
        });
        // The previous timer, if any, is cancelled when dropped here.
        *self.idle.lock().await = Some(timer);
    }

    async fn clear_store(&self) {
        if let Err(e) = self.store.clear().await {
            tracing::warn!("Failed to clear persisted session: {}", e);
        }
    }

    async fn notify_identity(&self, identity: Option<&Identity>) {
        let callback = self.identity_callback.read().await.clone();
        if let Some(callback) = callback {
            callback(identity);
        }
    }

    async fn ensure_sync_listener(self: &Arc<Self>) {
        let mut slot = self.sync_listener.lock().await;
        if slot.is_some() || self.shutdown.is_cancelled() {
            return;
        }

        let subscription = self.store.subscribe();
        let handle = tokio::spawn(listen_for_changes(
            Arc::downgrade(self),
            subscription,
            self.shutdown.clone(),
        ));
        *slot = Some(handle);
    }
}

impl Drop for ManagerInner {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

async fn listen_for_changes(
    inner: Weak<ManagerInner>,
    mut subscription: StoreSubscription,
    shutdown: CancellationToken,
) {
    loop {
        let change = tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            change = subscription.next() => change,
        };

        let Some(change) = change else {
            tracing::debug!("Session store change feed closed");
            break;
        };
        if change.key != SESSION_KEY {
            continue;
        }

        let Some(inner) = inner.upgrade() else {
            break;
        };
        tracing::debug!("Session store changed by context {}", change.origin);
        inner.apply_external_change().await;
    }
}
