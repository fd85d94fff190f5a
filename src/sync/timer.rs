//! Reload scheduling.
//!
//! A locale change is followed by a full reload after a short fixed delay so
//! the cookie write lands before the next request. Timers are not
//! cancellable: two changes in quick succession arm two reloads, and either
//! one produces the same page.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::runtime::{Handle, TryCurrentError};

/// Arms a full page reload after a delay.
pub trait ReloadScheduler {
    /// Schedule one reload to run after `delay`.
    fn schedule_reload(&mut self, delay: Duration);
}

/// Callback that performs the reload.
pub type ReloadHook = Arc<dyn Fn() + Send + Sync>;

/// [`ReloadScheduler`] that waits on the Tokio clock before running a hook.
///
/// The runtime behind the handle must have its time driver enabled.
#[derive(Clone)]
pub struct TokioReloadScheduler {
    handle: Handle,
    hook: ReloadHook,
    pending: Arc<AtomicUsize>,
}

impl fmt::Debug for TokioReloadScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokioReloadScheduler")
            .field("pending", &self.pending_reloads())
            .finish_non_exhaustive()
    }
}

impl TokioReloadScheduler {
    /// Schedule reloads on `handle`.
    #[must_use]
    pub fn new(handle: Handle, hook: ReloadHook) -> Self {
        Self {
            handle,
            hook,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Schedule reloads on the runtime the caller is running in.
    ///
    /// # Errors
    ///
    /// Returns [`TryCurrentError`] when called outside a Tokio runtime.
    pub fn current(hook: ReloadHook) -> Result<Self, TryCurrentError> {
        Ok(Self::new(Handle::try_current()?, hook))
    }

    /// Number of armed reloads that have not fired yet.
    #[must_use]
    pub fn pending_reloads(&self) -> usize {
        self.pending.load(Ordering::SeqCst)
    }
}

impl ReloadScheduler for TokioReloadScheduler {
    fn schedule_reload(&mut self, delay: Duration) {
        let hook = Arc::clone(&self.hook);
        let pending = Arc::clone(&self.pending);
        pending.fetch_add(1, Ordering::SeqCst);
        if pending.load(Ordering::SeqCst) > 1 {
            tracing::debug!("reload already armed; arming another");
        }
        drop(self.handle.spawn(async move {
            tokio::time::sleep(delay).await;
            pending.fetch_sub(1, Ordering::SeqCst);
            hook();
        }));
    }
}
