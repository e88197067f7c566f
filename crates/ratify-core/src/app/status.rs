//! Status - 進捗表示用のスナップショット

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::domain::{Task, WorkflowState};
pub use crate::observability::QueueStatus;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardStatus {
    pub queue: QueueStatus,
    /// Transition attempts currently holding a task lock.
    pub in_flight: usize,
    pub by_state: BTreeMap<WorkflowState, usize>,
}

impl BoardStatus {
    pub fn new(queue: QueueStatus, in_flight: usize, tasks: &[Task]) -> Self {
        let mut by_state = BTreeMap::new();
        for task in tasks {
            *by_state.entry(task.state).or_insert(0) += 1;
        }
        Self {
            queue,
            in_flight,
            by_state,
        }
    }

    pub fn total(&self) -> usize {
        self.by_state.values().sum()
    }
}

impl fmt::Display for BoardStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} | {} task(s)", self.queue, self.total())?;
        for (state, count) in &self.by_state {
            write!(f, ", {state}: {count}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Priority, TaskId};
    use chrono::Utc;
    use ulid::Ulid;

    #[test]
    fn display_lists_states_in_workflow_order() {
        let mut submitted =
            Task::new(TaskId::from_ulid(Ulid::new()), "b", Priority::Low, Utc::now()).unwrap();
        submitted.apply_transition(WorkflowState::Submitted, Utc::now());
        let draft = Task::new(TaskId::from_ulid(Ulid::new()), "a", Priority::Low, Utc::now()).unwrap();

        let status = BoardStatus::new(QueueStatus::default(), 0, &[submitted, draft]);
        assert_eq!(status.total(), 2);
        assert_eq!(status.to_string(), "idle | 2 task(s), DRAFT: 1, SUBMITTED: 1");
    }
}
