//! A single-slot debounced scheduler.
//!
//! Each trigger cancels the pending timer and arms a new one; only a timer that
//! runs to completion invokes the callback.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

type Callback = Arc<dyn Fn() + Send + Sync>;

pub struct DebouncedScheduler {
    runtime: Handle,
    delay: Duration,
    callback: Callback,
    pending: Mutex<Option<JoinHandle<()>>>,
}

impl DebouncedScheduler {
    /// Timers run on `runtime`, so `trigger` may be called from any thread.
    pub fn new<F>(runtime: Handle, delay: Duration, callback: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self {
            runtime,
            delay,
            callback: Arc::new(callback),
            pending: Mutex::new(None),
        }
    }

    /// Restarts the delay. The callback fires once, `delay` after the last trigger.
    pub fn trigger(&self) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(handle) = pending.take() {
            handle.abort();
        }

        let callback = self.callback.clone();
        let delay = self.delay;
        *pending = Some(self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            callback();
        }));
    }

    /// Drops the pending timer, if any, without firing it.
    pub fn cancel(&self) {
        if let Some(handle) = self
            .pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
        {
            handle.abort();
        }
    }
}

impl Drop for DebouncedScheduler {
    fn drop(&mut self) {
        self.cancel();
    }
}
