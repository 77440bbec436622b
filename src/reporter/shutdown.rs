use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;

type ExitCallback = Box<dyn FnOnce() + Send>;

#[derive(Default)]
struct State {
    pending: usize,
    waiter: Option<ExitCallback>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    /// Woken every time the pending count drops to zero.
    idle: Notify,
}

/// Holds process exit back until every issued report write has finished.
#[derive(Clone, Default)]
pub struct Shutdown {
    inner: Arc<Inner>,
}

impl Shutdown {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a write. It stays pending until the returned guard is dropped.
    pub fn begin_write(&self) -> PendingWrite {
        lock(&self.inner.state).pending += 1;
        PendingWrite {
            inner: Arc::clone(&self.inner),
        }
    }

    pub fn pending(&self) -> usize {
        lock(&self.inner.state).pending
    }

    /// Call `done` once no write is pending: right away if none is, otherwise
    /// when the last one finishes. A later registration replaces an earlier one.
    pub fn on_exit<F>(&self, done: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut state = lock(&self.inner.state);
        if state.pending == 0 {
            drop(state);
            done();
        } else {
            state.waiter = Some(Box::new(done));
        }
    }

    /// Resolves once no write is pending. Independent of the `on_exit` slot.
    pub async fn wait(&self) {
        loop {
            let idle = self.inner.idle.notified();
            tokio::pin!(idle);
            idle.as_mut().enable();
            if self.pending() == 0 {
                return;
            }
            idle.await;
        }
    }
}

/// Guard for one in-flight write.
pub struct PendingWrite {
    inner: Arc<Inner>,
}

impl Drop for PendingWrite {
    fn drop(&mut self) {
        let waiter = {
            let mut state = lock(&self.inner.state);
            state.pending = state.pending.saturating_sub(1);
            if state.pending == 0 {
                self.inner.idle.notify_waiters();
                state.waiter.take()
            } else {
                None
            }
        };
        if let Some(done) = waiter {
            done();
        }
    }
}

fn lock(state: &Mutex<State>) -> MutexGuard<'_, State> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}
