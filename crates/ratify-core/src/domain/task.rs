use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::{Error, TaskId, WorkflowState};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
        })
    }
}

impl FromStr for Priority {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "LOW" => Ok(Priority::Low),
            "MEDIUM" => Ok(Priority::Medium),
            "HIGH" => Ok(Priority::High),
            _ => Err(Error::Validation(format!("unknown priority: {s}"))),
        }
    }
}

/// One record in a task's append-only history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub action: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

impl HistoryEntry {
    /// The record appended when a task enters `target`.
    ///
    /// `timestamp` is truncated to milliseconds, the precision it is persisted at.
    pub fn moved_to(target: WorkflowState, timestamp: DateTime<Utc>) -> Self {
        Self {
            action: format!("MOVED_TO_{target}"),
            timestamp: timestamp.trunc_subsecs(3),
        }
    }
}

/// A task moving through the approval workflow.
///
/// Design:
/// - `id` and `created_at` never change after construction.
/// - `state` and `history` are only mutated by `WorkflowEngine` on a successful
///   transition (see `Task::apply_transition`). Outside this crate they are
///   read through `state()` and `history()`.
/// - Timestamps carry millisecond precision so a stored task equals the
///   in-memory one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub priority: Priority,
    pub(crate) state: WorkflowState,
    pub(crate) history: Vec<HistoryEntry>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

impl Task {
    /// Create a task in `DRAFT` with an empty history.
    pub fn new(
        id: TaskId,
        title: impl Into<String>,
        priority: Priority,
        created_at: DateTime<Utc>,
    ) -> Result<Self, Error> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(Error::Validation("task title must not be empty".to_string()));
        }
        Ok(Self {
            id,
            title,
            priority,
            state: WorkflowState::Draft,
            history: Vec::new(),
            created_at: created_at.trunc_subsecs(3),
        })
    }

    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Oldest entry first.
    pub fn history(&self) -> &[HistoryEntry] {
        &self.history
    }

    pub(crate) fn apply_transition(&mut self, target: WorkflowState, at: DateTime<Utc>) {
        self.state = target;
        self.history.push(HistoryEntry::moved_to(target, at));
    }
}
