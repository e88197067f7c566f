//! Errors - エラー型と分類
//!
//! # 分類
//! - Transient: 一時的なエラー（キューに再投入すればリトライ可能）
//! - Permanent: その試行に対しては恒久的（同じ unit を再実行しても無意味）
//! - Infrastructure: 保存先（blob）の障害。コアは自動リトライしない

use std::sync::Arc;

use thiserror::Error;

use super::{TaskId, WorkflowState};
use crate::ports::BlobError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transient,
    Permanent,
    Infrastructure,
}

/// Failures of a single transition attempt.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorkflowError {
    /// Another attempt on the same task is still in flight.
    #[error("task {0} is locked: a transition is already in flight")]
    Locked(TaskId),

    /// Simulated network fault; the task was left untouched.
    #[error("transition of {task} to {target} failed: simulated network fault")]
    TransitionFailed { task: TaskId, target: WorkflowState },

    /// Only raised by `TransitionGuard::Strict`.
    #[error("illegal transition for {task}: {from} -> {to}")]
    IllegalTransition {
        task: TaskId,
        from: WorkflowState,
        to: WorkflowState,
    },
}

/// Sources are shared so the error can be cloned into both the submitter's
/// ticket and the queue's log.
#[derive(Debug, Clone, Error)]
pub enum StorageError {
    #[error("failed to read blob `{key}`")]
    Read {
        key: String,
        #[source]
        source: Arc<BlobError>,
    },

    #[error("blob `{key}` does not contain a task collection")]
    Corrupt {
        key: String,
        #[source]
        source: Arc<serde_json::Error>,
    },

    #[error("failed to write blob `{key}`")]
    Write {
        key: String,
        #[source]
        source: Arc<BlobError>,
    },

    #[error("failed to encode task collection")]
    Encode(#[source] Arc<serde_json::Error>),
}

/// Crate-wide error returned by queued units and the board.
#[derive(Debug, Clone, Error)]
pub enum Error {
    #[error(transparent)]
    Workflow(#[from] WorkflowError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("task not found: {0}")]
    NotFound(TaskId),

    #[error("invalid task: {0}")]
    Validation(String),

    /// The unit was dropped (e.g. it panicked) before reporting an outcome.
    #[error("job ended without reporting an outcome")]
    Abandoned,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Workflow(WorkflowError::TransitionFailed { .. }) => ErrorKind::Transient,
            Error::Workflow(_) => ErrorKind::Permanent,
            Error::Storage(_) | Error::Abandoned => ErrorKind::Infrastructure,
            Error::NotFound(_) | Error::Validation(_) => ErrorKind::Permanent,
        }
    }

    /// Safe to retry by enqueueing a fresh unit.
    pub fn is_retryable(&self) -> bool {
        self.kind() == ErrorKind::Transient
    }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
