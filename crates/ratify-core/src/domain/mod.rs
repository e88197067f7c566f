//! Domain model (IDs, states, tasks, errors).

pub mod errors;
pub mod ids;
pub mod state;
pub mod task;

pub use errors::{Error, ErrorKind, Result, StorageError, WorkflowError};
pub use ids::{JobId, TaskId};
pub use state::{UnknownState, WorkflowState};
pub use task::{HistoryEntry, Priority, Task};
