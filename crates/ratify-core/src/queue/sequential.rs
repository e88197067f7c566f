//! Sequential job queue.
//!
//! One global FIFO backlog; at most one unit runs at a time. A drain task is
//! spawned when a unit is enqueued into an idle queue and exits once the
//! backlog is empty.

use std::collections::VecDeque;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::watch;
use tracing::{debug, error, warn};
use ulid::Ulid;

use super::{Job, job};
use crate::domain::{JobId, Result};
use crate::observability::QueueStatus;

struct Pending {
    id: JobId,
    job: Box<dyn Job>,
}

#[derive(Default)]
struct QueueState {
    backlog: VecDeque<Pending>,
    /// A drain task is alive.
    running: bool,
    current: Option<String>,
    completed: u64,
    failed: u64,
}

impl QueueState {
    fn status(&self) -> QueueStatus {
        QueueStatus {
            pending: self.backlog.len(),
            current: self.current.clone(),
            completed: self.completed,
            failed: self.failed,
        }
    }
}

struct Shared {
    state: Mutex<QueueState>,
    status: watch::Sender<QueueStatus>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, QueueState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &QueueState) {
        self.status.send_replace(state.status());
    }
}

/// Cloneable handle to one queue; all clones share the same backlog.
#[derive(Clone)]
pub struct JobQueue {
    shared: Arc<Shared>,
}

impl JobQueue {
    pub fn new() -> Self {
        let (status, _) = watch::channel(QueueStatus::default());
        Self {
            shared: Arc::new(Shared {
                state: Mutex::new(QueueState::default()),
                status,
            }),
        }
    }

    /// Append `job` to the back of the backlog and start draining if idle.
    ///
    /// Never blocks and never fails. Must be called from within a Tokio runtime.
    pub fn enqueue(&self, job: Box<dyn Job>) -> JobId {
        let id = JobId::from_ulid(Ulid::new());
        let start = {
            let mut state = self.shared.lock();
            debug!(job = %id, label = job.label(), pending = state.backlog.len(), "job enqueued");
            state.backlog.push_back(Pending { id, job });
            let start = !state.running;
            state.running = true;
            self.shared.publish(&state);
            start
        };

        if start {
            tokio::spawn(drain(Arc::clone(&self.shared)));
        }
        id
    }

    /// `enqueue(job(label, f))`.
    pub fn submit<F, Fut>(&self, label: impl Into<String>, f: F) -> JobId
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        self.enqueue(job(label, f))
    }

    pub fn status(&self) -> QueueStatus {
        self.shared.status.borrow().clone()
    }

    /// Backlog length, excluding the unit being executed.
    pub fn pending(&self) -> usize {
        self.shared.lock().backlog.len()
    }

    /// Resolve once the backlog is empty and nothing is executing.
    pub async fn wait_idle(&self) {
        let mut rx = self.shared.status.subscribe();
        // the sender lives as long as `self`, so this cannot fail
        let _ = rx.wait_for(QueueStatus::is_idle).await;
    }
}

impl Default for JobQueue {
    fn default() -> Self {
        Self::new()
    }
}

async fn drain(shared: Arc<Shared>) {
    loop {
        let Pending { id, job } = {
            let mut state = shared.lock();
            match state.backlog.pop_front() {
                Some(next) => {
                    state.current = Some(next.job.label().to_string());
                    shared.publish(&state);
                    next
                }
                None => {
                    state.running = false;
                    state.current = None;
                    shared.publish(&state);
                    return;
                }
            }
        };

        let label = job.label().to_string();
        debug!(job = %id, %label, "job started");

        // run on its own task so a panicking unit cannot take the drain loop down
        let succeeded = match tokio::spawn(job.run()).await {
            Ok(Ok(())) => {
                debug!(job = %id, %label, "job finished");
                true
            }
            Ok(Err(err)) => {
                warn!(job = %id, %label, error = %err, "job failed; the queue continues");
                false
            }
            Err(join_err) => {
                error!(job = %id, %label, error = %join_err, "job panicked; the queue continues");
                false
            }
        };

        let mut state = shared.lock();
        state.current = None;
        if succeeded {
            state.completed += 1;
        } else {
            state.failed += 1;
        }
        shared.publish(&state);
    }
}
