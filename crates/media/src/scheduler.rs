//! Keyed single-shot timers.
//!
//! At most one timer is live per key: scheduling replaces (and aborts) the previous one. A timer that
//! already started its job is no longer cancellable, and cancelling it is a no-op.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::oneshot;
use tokio::task::AbortHandle;
use tracing::trace;

pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub trait Scheduler: Send + Sync {
    /// Runs `job` after `delay` unless the key is cancelled or rescheduled first.
    fn schedule(&self, key: &str, delay: Duration, job: Job);

    /// Cancels the pending timer for `key`. Returns whether one was pending.
    fn cancel(&self, key: &str) -> bool;
}

struct Timer {
    generation: u64,
    abort: AbortHandle,
}

/// [`Scheduler`] on the tokio runtime. Must be used from within a runtime.
#[derive(Default)]
pub struct TokioScheduler {
    timers: Arc<DashMap<String, Timer>>,
    next_generation: AtomicU64,
}

impl TokioScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of timers that have not fired yet.
    pub fn pending(&self) -> usize {
        self.timers.len()
    }
}

impl Scheduler for TokioScheduler {
    fn schedule(&self, key: &str, delay: Duration, job: Job) {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        let timers = Arc::clone(&self.timers);
        let owned_key = key.to_string();
        let (armed_tx, armed_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            // Wait until the timer is registered so the generation check below cannot miss it.
            if armed_rx.await.is_err() {
                return;
            }
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            let fired = timers
                .remove_if(&owned_key, |_, timer| timer.generation == generation)
                .is_some();
            if !fired {
                trace!(key = %owned_key, generation, "superseded timer skipped");
                return;
            }
            job.await;
        });

        let previous = self.timers.insert(
            key.to_string(),
            Timer {
                generation,
                abort: task.abort_handle(),
            },
        );
        if let Some(previous) = previous {
            previous.abort.abort();
        }
        let _ = armed_tx.send(());
    }

    fn cancel(&self, key: &str) -> bool {
        match self.timers.remove(key) {
            Some((_, timer)) => {
                timer.abort.abort();
                true
            }
            None => false,
        }
    }
}
