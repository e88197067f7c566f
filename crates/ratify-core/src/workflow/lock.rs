//! Per-task lock set.
//!
//! A task id is "busy" while a `LockGuard` for it is alive. The guard removes the
//! id on drop, so the lock is released on success, failure, panic and when the
//! owning future is dropped mid-flight.

use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError};

use crate::domain::TaskId;

#[derive(Debug, Clone, Default)]
pub struct LockSet {
    held: Arc<Mutex<HashSet<TaskId>>>,
}

impl LockSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check-and-insert in one step; `None` when `id` is already held.
    pub fn try_acquire(&self, id: TaskId) -> Option<LockGuard> {
        let inserted = self
            .held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id);
        inserted.then(|| LockGuard {
            id,
            held: Arc::clone(&self.held),
        })
    }

    pub fn contains(&self, id: TaskId) -> bool {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    pub fn len(&self) -> usize {
        self.held.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[must_use = "the lock is released as soon as the guard is dropped"]
#[derive(Debug)]
pub struct LockGuard {
    id: TaskId,
    held: Arc<Mutex<HashSet<TaskId>>>,
}

impl LockGuard {
    pub fn id(&self) -> TaskId {
        self.id
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        self.held
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}
