//! Bounded-concurrency request queue.
//!
//! FIFO admission-controlled executor: at most `max_concurrency` tasks run
//! at once, a freed slot is refilled before the drain signal is considered,
//! and task failures are contained at the scheduler boundary. Drain waiters
//! are unblocked by a completion signal, not by polling.

use crate::error::RelinkError;
use futures::future::BoxFuture;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::Notify;
use tracing::{debug, warn};

/// Snapshot of queue accounting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QueueStats {
    pub pending: usize,
    pub running: usize,
    pub succeeded: usize,
    pub failed: usize,
}

struct QueuedTask {
    label: String,
    future: BoxFuture<'static, Result<(), RelinkError>>,
}

struct QueueState {
    pending: VecDeque<QueuedTask>,
    running: usize,
    succeeded: usize,
    failed: usize,
}

struct QueueInner {
    max_concurrency: usize,
    state: Mutex<QueueState>,
    drained: Notify,
}

/// FIFO executor bounding the number of concurrently in-flight tasks.
#[derive(Clone)]
pub struct RequestQueue {
    inner: Arc<QueueInner>,
}

impl RequestQueue {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            inner: Arc::new(QueueInner {
                max_concurrency: max_concurrency.max(1),
                state: Mutex::new(QueueState {
                    pending: VecDeque::new(),
                    running: 0,
                    succeeded: 0,
                    failed: 0,
                }),
                drained: Notify::new(),
            }),
        }
    }

    /// Append a task to the pending list and admit work while slots are
    /// free. FIFO among waiting tasks. Must be called from within a tokio
    /// runtime.
    pub fn enqueue<F>(&self, label: impl Into<String>, task: F)
    where
        F: Future<Output = Result<(), RelinkError>> + Send + 'static,
    {
        let mut state = self.inner.state.lock();
        state.pending.push_back(QueuedTask {
            label: label.into(),
            future: Box::pin(task),
        });
        QueueInner::admit_locked(&self.inner, &mut state);
    }

    pub fn stats(&self) -> QueueStats {
        let state = self.inner.state.lock();
        QueueStats {
            pending: state.pending.len(),
            running: state.running,
            succeeded: state.succeeded,
            failed: state.failed,
        }
    }

    /// Suspend until the pending list is empty and nothing is running.
    ///
    /// Observes a fully drained state even when tasks enqueue further tasks
    /// while the caller is waiting.
    pub async fn wait_until_empty(&self) {
        loop {
            let mut notified = std::pin::pin!(self.inner.drained.notified());
            notified.as_mut().enable();
            if self.inner.is_idle() {
                return;
            }
            notified.await;
        }
    }
}

impl QueueInner {
    fn is_idle(&self) -> bool {
        let state = self.state.lock();
        state.pending.is_empty() && state.running == 0
    }

    /// Admission rule: fill free slots from the head of the pending list.
    fn admit_locked(inner: &Arc<QueueInner>, state: &mut QueueState) {
        while state.running < inner.max_concurrency {
            let Some(task) = state.pending.pop_front() else {
                break;
            };
            state.running += 1;
            let inner = Arc::clone(inner);
            tokio::spawn(async move {
                debug!(task = %task.label, "task started");
                let result = task.future.await;
                if let Err(err) = &result {
                    // contained: one failing task never aborts the batch
                    warn!(task = %task.label, error = %err, "task failed");
                }
                QueueInner::complete(&inner, result.is_ok());
            });
        }
    }

    /// Completion accounting: free the slot, refill it, then signal drain
    /// waiters if the queue went idle.
    fn complete(inner: &Arc<QueueInner>, ok: bool) {
        let idle = {
            let mut state = inner.state.lock();
            state.running -= 1;
            if ok {
                state.succeeded += 1;
            } else {
                state.failed += 1;
            }
            Self::admit_locked(inner, &mut state);
            state.pending.is_empty() && state.running == 0
        };
        if idle {
            inner.drained.notify_waiters();
        }
    }
}
