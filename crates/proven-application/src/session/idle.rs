//! Inactivity timer owned by the lifecycle manager.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// One armed countdown.
///
/// Dropping the timer cancels its task, so replacing or clearing the slot
/// that holds it is all it takes to tear it down.
pub(crate) struct IdleTimer {
    epoch: u64,
    activity: Arc<Notify>,
    cancel: CancellationToken,
}

impl IdleTimer {
    /// Starts a countdown of `timeout`; `on_expire` runs once if it reaches zero.
    pub(crate) fn arm<F, Fut>(epoch: u64, timeout: Duration, on_expire: F) -> Self
    where
        F: FnOnce(u64) -> Fut + Send + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let activity = Arc::new(Notify::new());
        let cancel = CancellationToken::new();

        tokio::spawn(run(
            epoch,
            timeout,
            Arc::clone(&activity),
            cancel.clone(),
            on_expire,
        ));

        Self {
            epoch,
            activity,
            cancel,
        }
    }

    pub(crate) fn epoch(&self) -> u64 {
        self.epoch
    }

    /// Restarts the countdown at the full duration.
    pub(crate) fn touch(&self) {
        self.activity.notify_one();
    }
}

impl Drop for IdleTimer {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn run<F, Fut>(
    epoch: u64,
    timeout: Duration,
    activity: Arc<Notify>,
    cancel: CancellationToken,
    on_expire: F,
) where
    F: FnOnce(u64) -> Fut,
    Fut: Future<Output = ()>,
{
    let mut deadline = Instant::now() + timeout;

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => return,
            _ = activity.notified() => {
                deadline = Instant::now() + timeout;
            }
            _ = tokio::time::sleep_until(deadline) => break,
        }
    }

    if cancel.is_cancelled() {
        return;
    }
    tracing::debug!(epoch, "Idle timer expired");
    on_expire(epoch).await;
}
