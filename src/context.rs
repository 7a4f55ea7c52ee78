//! Cancellable lifetime contexts.
//!
//! A [`Context`] represents how long an exchange should be considered live.
//! Children derived with [`Context::child`] are cancelled when their parent
//! is, while cancelling a child leaves the parent untouched. Cancellation is
//! a signal: it wakes observers but never forcibly interrupts in-flight I/O.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};

use tokio::sync::Notify;

#[derive(Debug)]
struct ContextState {
    cancelled: AtomicBool,
    notify: Notify,
    children: Mutex<Vec<Weak<ContextState>>>,
}

impl ContextState {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            cancelled: AtomicBool::new(false),
            notify: Notify::new(),
            children: Mutex::new(Vec::new()),
        })
    }

    fn cancel(&self) {
        // Only the first call fires; later calls are no-ops.
        if self
            .cancelled
            .compare_exchange(false, true, Ordering::Release, Ordering::Relaxed)
            .is_ok()
        {
            self.notify.notify_waiters();

            let children = self
                .children
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner)
                .drain(..)
                .collect::<Vec<_>>();
            for child in children {
                if let Some(child) = child.upgrade() {
                    child.cancel();
                }
            }
        }
    }

    fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
    }
}

/// Observable side of a cancellable lifetime.
#[derive(Debug, Clone)]
pub struct Context {
    state: Arc<ContextState>,
}

impl Context {
    /// Creates a root context that is never cancelled on its own.
    pub fn new() -> Self {
        Self {
            state: ContextState::new(),
        }
    }

    /// Derives a cancellable child context.
    ///
    /// The child is cancelled either through the returned [`CancelHandle`] or
    /// when this context itself is cancelled.
    pub fn child(&self) -> (Context, CancelHandle) {
        let state = ContextState::new();

        // Register before probing the parent so a concurrent parent cancel
        // cannot slip between the check and the registration. Entries whose
        // contexts have been dropped are pruned here, keeping a long-lived
        // parent from accumulating one dead registration per connection.
        {
            let mut guard = self
                .state
                .children
                .lock()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            guard.retain(|child| child.strong_count() > 0);
            guard.push(Arc::downgrade(&state));
        }
        if self.state.is_cancelled() {
            state.cancel();
        }

        (
            Context {
                state: Arc::clone(&state),
            },
            CancelHandle { state },
        )
    }

    pub fn is_cancelled(&self) -> bool {
        self.state.is_cancelled()
    }

    /// Resolves once this context is cancelled; immediately if it already is.
    pub async fn cancelled(&self) {
        let notified = self.state.notify.notified();
        tokio::pin!(notified);

        if self.state.is_cancelled() {
            return;
        }
        // Register the waiter, then re-check so a cancel that fired in
        // between is not missed.
        notified.as_mut().enable();
        if self.state.is_cancelled() {
            return;
        }
        notified.await;
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

/// Cancelling side of a derived context. Safe to invoke from any task;
/// repeated calls after the first are no-ops.
#[derive(Debug, Clone)]
pub struct CancelHandle {
    state: Arc<ContextState>,
}

impl CancelHandle {
    pub fn cancel(&self) {
        self.state.cancel();
    }
}
